//! Copy, move, delete and directory creation.
//!
//! Files and empty folders are processed synchronously (201 or 204). For
//! non-empty folders the server answers 202 and keeps working; the returned
//! link then points at the operation status, which callers poll themselves.

use reqwest::{Method, StatusCode};

use crate::client::{flag, Client, Params};
use crate::error::Result;
use crate::models::{ActionOutcome, Link};

const URL_COPY: &str = "resources/copy";
const URL_MOVE: &str = "resources/move";
const URL_DELETE: &str = "resources";
const URL_CREATE_DIRECTORY: &str = "resources";

impl Client {
    /// Copy a file or folder from `from` to `path`.
    ///
    /// With `overwrite` set, an existing resource at `path` is replaced. The
    /// link is `None` when the server answers 204.
    pub async fn copy(&self, from: &str, path: &str, overwrite: bool) -> Result<ActionOutcome> {
        self.transfer_resource(URL_COPY, from, path, overwrite).await
    }

    /// Move a file or folder from `from` to `path`.
    ///
    /// With `overwrite` set, an existing resource at `path` is replaced.
    pub async fn move_resource(
        &self,
        from: &str,
        path: &str,
        overwrite: bool,
    ) -> Result<ActionOutcome> {
        self.transfer_resource(URL_MOVE, from, path, overwrite).await
    }

    /// Delete a file or folder. Without `permanently` it goes to the Trash.
    ///
    /// The link is `None` when the deletion finished (204) and points at the
    /// running operation otherwise (202).
    pub async fn delete(&self, path: &str, permanently: bool) -> Result<ActionOutcome> {
        let params = [("path", path), ("permanently", flag(permanently))];
        self.action(Method::DELETE, URL_DELETE, &params).await
    }

    /// Create a folder at `path`. Returns a link to its metadata.
    pub async fn create_directory(&self, path: &str) -> Result<Link> {
        let (_, link) = self
            .request_value(Method::PUT, URL_CREATE_DIRECTORY, &[("path", path)])
            .await?;
        Ok(link)
    }

    async fn transfer_resource(
        &self,
        url: &str,
        from: &str,
        path: &str,
        overwrite: bool,
    ) -> Result<ActionOutcome> {
        let params = [("from", from), ("path", path), ("permanently", flag(overwrite))];
        self.action(Method::POST, url, &params).await
    }

    /// Send an action whose link is absent once it finished with 204.
    async fn action(&self, method: Method, url: &str, params: Params<'_>) -> Result<ActionOutcome> {
        let (status, link) = self.request_and_decode(method, url, params).await?;

        let link = if status == StatusCode::NO_CONTENT { None } else { link };
        Ok(ActionOutcome { link, status })
    }
}

#[cfg(test)]
mod tests {
    use reqwest::{Method, StatusCode};

    use crate::client::tests::{stub_client, StubTransport};
    use crate::error::DiskError;
    use crate::models::Link;

    const LINK_JSON: &str = r#"{"href":"some_href","method":"GET","templated":false}"#;
    const EXISTS_JSON: &str = r#"{"message":"Ресурс {path} уже существует","description":"Resource already exists","error":"DiskResourceAlreadyExistsError"}"#;

    fn some_link() -> Link {
        Link {
            href: "some_href".to_string(),
            method: "GET".to_string(),
            templated: false,
        }
    }

    fn assert_exists_error(err: DiskError) {
        let api = err.api_error().cloned().expect("expected API error");
        assert_eq!(api.status_code, 409);
        assert_eq!(api.message, "Ресурс {path} уже существует");
        assert_eq!(api.description, "Resource already exists");
        assert_eq!(api.error_id, "DiskResourceAlreadyExistsError");
    }

    #[tokio::test]
    async fn test_copy_statuses() {
        for status in [201, 202] {
            let transport = StubTransport::new(status, LINK_JSON);
            let outcome = stub_client(&transport)
                .copy("/source/some_file.ext", "/destination/some_file.ext", false)
                .await
                .unwrap();

            assert_eq!(outcome.link, Some(some_link()));
            assert_eq!(outcome.status.as_u16(), status);
            assert_eq!(outcome.is_in_progress(), status == 202);
        }
    }

    #[tokio::test]
    async fn test_copy_and_move_finished_without_body() {
        let transport = StubTransport::new(204, "");
        let client = stub_client(&transport);

        let copied = client.copy("/a.txt", "/b.txt", false).await.unwrap();
        assert!(copied.link.is_none());
        assert_eq!(copied.status, StatusCode::NO_CONTENT);
        assert!(!copied.is_in_progress());

        let moved = client.move_resource("/a.txt", "/b.txt", false).await.unwrap();
        assert!(moved.link.is_none());
        assert_eq!(moved.status, StatusCode::NO_CONTENT);

        let requests = transport.requests.lock().unwrap();
        assert!(requests[0].url().path().ends_with("/resources/copy"));
        assert!(requests[1].url().path().ends_with("/resources/move"));
    }

    #[tokio::test]
    async fn test_copy_query() {
        for (overwrite, expected) in [(false, "false"), (true, "true")] {
            let transport = StubTransport::new(201, LINK_JSON);
            stub_client(&transport)
                .copy("/a b.txt", "/c.txt", overwrite)
                .await
                .unwrap();

            let requests = transport.requests.lock().unwrap();
            assert_eq!(requests[0].method(), Method::POST);
            assert_eq!(
                requests[0].url().as_str(),
                format!(
                    "https://cloud-api.yandex.net/v1/disk/resources/copy?from=%2Fa+b.txt&path=%2Fc.txt&permanently={}",
                    expected
                )
            );
            assert!(requests[0].body().is_none());
        }
    }

    #[tokio::test]
    async fn test_copy_conflict() {
        let transport = StubTransport::new(409, EXISTS_JSON);
        let err = stub_client(&transport)
            .copy("/a.txt", "/b.txt", false)
            .await
            .unwrap_err();
        assert_exists_error(err);
    }

    #[tokio::test]
    async fn test_move() {
        for status in [201, 202] {
            let transport = StubTransport::new(status, LINK_JSON);
            let outcome = stub_client(&transport)
                .move_resource("/from dir/a&b.txt", "/to/a.txt", true)
                .await
                .unwrap();
            assert_eq!(outcome.link, Some(some_link()));

            let requests = transport.requests.lock().unwrap();
            assert_eq!(requests[0].method(), Method::POST);
            assert_eq!(
                requests[0].url().query(),
                Some("from=%2Ffrom+dir%2Fa%26b.txt&path=%2Fto%2Fa.txt&permanently=true")
            );
        }
    }

    #[tokio::test]
    async fn test_move_conflict() {
        let transport = StubTransport::new(409, EXISTS_JSON);
        let err = stub_client(&transport)
            .move_resource("/a.txt", "/b.txt", false)
            .await
            .unwrap_err();
        assert_exists_error(err);
    }

    #[tokio::test]
    async fn test_delete_finished() {
        let transport = StubTransport::new(204, "");
        let outcome = stub_client(&transport).delete("/trash me", false).await.unwrap();

        assert!(outcome.link.is_none());
        assert_eq!(outcome.status, StatusCode::NO_CONTENT);

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests[0].method(), Method::DELETE);
        assert_eq!(
            requests[0].url().query(),
            Some("path=%2Ftrash+me&permanently=false")
        );
    }

    #[tokio::test]
    async fn test_delete_in_progress() {
        let transport = StubTransport::new(202, LINK_JSON);
        let outcome = stub_client(&transport).delete("/dir", true).await.unwrap();

        assert_eq!(outcome.link, Some(some_link()));
        assert!(outcome.is_in_progress());
    }

    #[tokio::test]
    async fn test_delete_not_found() {
        let transport = StubTransport::new(
            404,
            r#"{"message":"m","description":"Resource not found.","error":"DiskNotFoundError"}"#,
        );
        let err = stub_client(&transport).delete("/missing", false).await.unwrap_err();

        let api = err.api_error().cloned().unwrap();
        assert_eq!(api.status_code, 404);
        assert_eq!(api.error_id, "DiskNotFoundError");
    }

    #[tokio::test]
    async fn test_create_directory() {
        for status in [201, 202] {
            let transport = StubTransport::new(status, LINK_JSON);
            let link = stub_client(&transport).create_directory("/new folder").await.unwrap();
            assert_eq!(link, some_link());

            let requests = transport.requests.lock().unwrap();
            assert_eq!(requests[0].method(), Method::PUT);
            assert_eq!(
                requests[0].url().as_str(),
                "https://cloud-api.yandex.net/v1/disk/resources?path=%2Fnew+folder"
            );
        }
    }

    #[tokio::test]
    async fn test_create_directory_conflict() {
        let transport = StubTransport::new(409, EXISTS_JSON);
        let err = stub_client(&transport).create_directory("/dir").await.unwrap_err();
        assert_exists_error(err);
    }
}
