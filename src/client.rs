//! Yandex.Disk API client and its request pipeline.

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Body, Method, Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::auth::{OAuthCredentials, RefreshingToken, StaticToken};
use crate::decode::Decoded;
use crate::error::{DiskError, Result};
use crate::transport::{HttpTransport, Transport};

/// Base URL for the Yandex.Disk REST API v1.
pub const DEFAULT_BASE_URL: &str = "https://cloud-api.yandex.net/v1/disk/";

static DEFAULT_BASE: LazyLock<Url> =
    LazyLock::new(|| Url::parse(DEFAULT_BASE_URL).expect("Invalid default base URL"));

/// Query parameters of a control-plane request.
pub(crate) type Params<'a> = &'a [(&'a str, &'a str)];

/// Construction parameters of a [`Client`].
#[derive(Clone)]
pub struct ClientConfig {
    /// Endpoint paths are resolved against this URL, so it should end with `/`.
    pub base_url: Url,
    pub transport: Arc<dyn Transport>,
}

impl ClientConfig {
    /// Config for the public API endpoint.
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            base_url: DEFAULT_BASE.clone(),
            transport: Arc::new(transport),
        }
    }

    /// Point the client at another API root, e.g. a test server.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.base_url = Url::parse(base_url)?;
        Ok(self)
    }
}

/// Client for the Yandex.Disk REST API.
///
/// Holds no per-call state; clone it or share it freely between tasks.
#[derive(Clone)]
pub struct Client {
    base_url: Url,
    transport: Arc<dyn Transport>,
}

impl Client {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            base_url: config.base_url,
            transport: config.transport,
        }
    }

    /// Client authorized with a fixed OAuth token.
    pub fn from_access_token(token: impl Into<String>) -> Self {
        Self::new(ClientConfig::new(HttpTransport::new(StaticToken::new(token))))
    }

    /// Client that refreshes its OAuth token from stored credentials.
    pub fn from_credentials(credentials: OAuthCredentials) -> Self {
        Self::new(ClientConfig::new(HttpTransport::new(
            RefreshingToken::from_credentials(credentials),
        )))
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build a control-plane request.
    ///
    /// `path` is resolved against the base URL, every parameter replaces any
    /// value already present for its key, and `body` is sent as JSON.
    pub(crate) fn build_request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        params: Params<'_>,
        body: Option<&B>,
    ) -> Result<Request> {
        let mut url = self.base_url.join(path)?;

        let mut query: BTreeMap<String, String> = url.query_pairs().into_owned().collect();
        for (key, value) in params {
            query.insert((*key).to_string(), (*value).to_string());
        }
        if query.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(&query);
        }

        let mut request = Request::new(method, url);
        request
            .headers_mut()
            .insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(body) = body {
            let encoded = serde_json::to_vec(body).map_err(DiskError::Encoding)?;
            request
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            *request.body_mut() = Some(Body::from(encoded));
        }

        Ok(request)
    }

    /// Build a request against an absolute URL handed out by the server.
    pub(crate) fn build_raw_request(
        &self,
        method: &str,
        absolute_url: &str,
        body: Option<Body>,
    ) -> Result<Request> {
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|e| DiskError::RequestConstruction(format!("method {:?}: {}", method, e)))?;
        let url = Url::parse(absolute_url)
            .map_err(|e| DiskError::RequestConstruction(format!("URL {:?}: {}", absolute_url, e)))?;

        let mut request = Request::new(method, url);
        *request.body_mut() = body;
        Ok(request)
    }

    /// Send a request through the transport.
    pub(crate) async fn send(&self, request: Request) -> Result<Response> {
        tracing::debug!(method = %request.method(), url = %request.url(), "sending request");

        let response = self.transport.execute(request).await?;

        tracing::debug!(status = response.status().as_u16(), "received response");
        Ok(response)
    }

    /// Send a control-plane request and decode its response.
    ///
    /// Returns the status alongside the value so callers can tell finished
    /// (201/204) from still running (202) operations.
    pub(crate) async fn request_and_decode<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: Params<'_>,
    ) -> Result<(StatusCode, Option<T>)> {
        let request = self.build_request::<()>(method, path, params, None)?;
        let response = self.send(request).await?;
        let status = response.status();

        let value = Decoded::from_response(response).await?.into_result()?;
        Ok((status, value))
    }

    /// Like [`request_and_decode`](Self::request_and_decode) for endpoints that
    /// always answer with a body.
    pub(crate) async fn request_value<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: Params<'_>,
    ) -> Result<(StatusCode, T)> {
        match self.request_and_decode(method, path, params).await? {
            (status, Some(value)) => Ok((status, value)),
            (status, None) => Err(DiskError::Decoding(serde::de::Error::custom(format!(
                "expected a response body, got status {}",
                status
            )))),
        }
    }
}

/// Wire value of the `permanently` flag.
pub(crate) fn flag(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
