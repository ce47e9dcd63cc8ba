//! HTTP transport seam.
//!
//! Every request the [`Client`](crate::Client) sends goes through a
//! [`Transport`]. The production implementation is [`HttpTransport`], which
//! authorizes requests from a [`TokenSource`]; tests can plug in their own.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Request, Response};

use crate::auth::TokenSource;
use crate::error::{DiskError, Result};

/// Performs one HTTP exchange.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: Request) -> Result<Response>;
}

/// Unauthenticated transport, e.g. for pre-signed upload links or a local
/// test server.
#[async_trait]
impl Transport for reqwest::Client {
    async fn execute(&self, request: Request) -> Result<Response> {
        Ok(reqwest::Client::execute(self, request).await?)
    }
}

/// Transport that stamps `Authorization: OAuth <token>` on every request.
#[derive(Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    tokens: Arc<dyn TokenSource>,
}

impl HttpTransport {
    pub fn new(tokens: impl TokenSource + 'static) -> Self {
        Self::with_client(reqwest::Client::new(), tokens)
    }

    /// Use a preconfigured `reqwest::Client` (proxies, timeouts, TLS).
    pub fn with_client(http: reqwest::Client, tokens: impl TokenSource + 'static) -> Self {
        Self {
            http,
            tokens: Arc::new(tokens),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, mut request: Request) -> Result<Response> {
        let token = self.tokens.access_token().await?;
        let value = HeaderValue::from_str(&format!("OAuth {}", token))
            .map_err(|e| DiskError::Authentication(format!("invalid token: {}", e)))?;
        request.headers_mut().insert(AUTHORIZATION, value);

        Ok(self.http.execute(request).await?)
    }
}
