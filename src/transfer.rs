//! Upload and download of file contents.
//!
//! Contents are exchanged in two steps: a control-plane call hands out a
//! [`Link`], then the raw bytes go to that link's origin. The content endpoints
//! document no error bodies, so [`Client::upload`] and [`Client::download`]
//! return any HTTP status as a value and leave the checking to the caller.

use reqwest::{Body, Method, Response, StatusCode};

use crate::client::{flag, Client};
use crate::error::Result;
use crate::models::Link;

const URL_REQUEST_UPLOAD_LINK: &str = "resources/upload";
const URL_REQUEST_DOWNLOAD_LINK: &str = "resources/download";

impl Client {
    /// Request a link to upload a file to `path`.
    ///
    /// With `overwrite` set, an existing file at `path` is replaced. The link
    /// is valid for 30 minutes.
    pub async fn request_upload_link(&self, path: &str, overwrite: bool) -> Result<Link> {
        let params = [("path", path), ("permanently", flag(overwrite))];
        let (_, link) = self
            .request_value(Method::GET, URL_REQUEST_UPLOAD_LINK, &params)
            .await?;
        Ok(link)
    }

    /// Send file contents to a link from [`request_upload_link`](Self::request_upload_link).
    ///
    /// Success is 201 (stored) or 202 (accepted, still processing). Other
    /// statuses, 4xx and 5xx included, are returned as-is rather than as errors.
    pub async fn upload(&self, link: &Link, body: impl Into<Body>) -> Result<StatusCode> {
        let request = self.build_raw_request(&link.method, &link.href, Some(body.into()))?;
        let response = self.send(request).await?;
        Ok(response.status())
    }

    /// Request a link to download the file at `path`.
    pub async fn request_download_link(&self, path: &str) -> Result<Link> {
        let (_, link) = self
            .request_value(Method::GET, URL_REQUEST_DOWNLOAD_LINK, &[("path", path)])
            .await?;
        Ok(link)
    }

    /// Fetch a link from [`request_download_link`](Self::request_download_link).
    ///
    /// The raw response is returned whatever its status; check it before
    /// reading the body.
    pub async fn download(&self, link: &Link) -> Result<Response> {
        let request = self.build_raw_request(&link.method, &link.href, None)?;
        self.send(request).await
    }
}
