//! OAuth token sources for Yandex.Disk.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use url::Url;

use crate::error::{DiskError, Result};

/// Yandex OAuth authorization endpoint.
pub const AUTHORIZE_URL: &str = "https://oauth.yandex.com/authorize";

/// Yandex OAuth token endpoint.
pub const TOKEN_URL: &str = "https://oauth.yandex.com/token";

/// Refresh this long before the cached token expires.
const EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// Supplies the access token for outgoing requests.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}

/// A fixed access token, e.g. a debug token from the OAuth console.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// OAuth token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Lifetime of `access_token` in seconds.
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// A registered OAuth application.
#[derive(Debug, Clone)]
pub struct OAuthApp {
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
}

impl OAuthApp {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            auth_url: AUTHORIZE_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
        }
    }

    /// Override the token endpoint.
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// URL the user opens to grant access and obtain a confirmation code.
    pub fn authorize_url(&self, state: &str) -> Result<Url> {
        let mut url = Url::parse(&self.auth_url)?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.client_id)
            .append_pair("state", state);
        Ok(url)
    }

    /// Exchange a confirmation code for tokens.
    pub async fn exchange_code(&self, http: &Client, code: &str) -> Result<TokenResponse> {
        self.request_token(http, &[("grant_type", "authorization_code"), ("code", code)])
            .await
    }

    /// Obtain a fresh access token from a refresh token.
    pub async fn refresh(&self, http: &Client, refresh_token: &str) -> Result<TokenResponse> {
        self.request_token(
            http,
            &[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ],
        )
        .await
    }

    async fn request_token(&self, http: &Client, grant: &[(&str, &str)]) -> Result<TokenResponse> {
        let mut params: Vec<(&str, &str)> = grant.to_vec();
        params.push(("client_id", self.client_id.as_str()));
        params.push(("client_secret", self.client_secret.as_str()));

        tracing::debug!(url = %self.token_url, grant_type = grant[0].1, "requesting OAuth token");

        let response = http.post(&self.token_url).form(&params).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DiskError::Authentication(format!(
                "Status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }
}

/// Stored OAuth credentials, as saved after the first code exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default)]
    pub access_token: Option<String>,
    /// Remaining lifetime of `access_token` in seconds when it was saved.
    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl OAuthCredentials {
    /// Load credentials from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(DiskError::CredentialsParse)
    }
}

/// Cached access token with expiration.
#[derive(Clone)]
struct CachedToken {
    access_token: String,
    refresh_token: String,
    expires_at: Option<SystemTime>,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at > SystemTime::now() + EXPIRY_BUFFER,
            None => !self.access_token.is_empty(),
        }
    }
}

/// Token source that refreshes the access token when it is about to expire.
#[derive(Clone)]
pub struct RefreshingToken {
    app: Arc<OAuthApp>,
    http: Client,
    cached: Arc<RwLock<CachedToken>>,
}

impl RefreshingToken {
    pub fn new(app: OAuthApp, credentials: OAuthCredentials) -> Self {
        // An access token without a known lifetime is trusted until the
        // first refresh; a missing one forces a refresh on first use.
        let expires_at = credentials
            .expires_in
            .map(|secs| SystemTime::now() + Duration::from_secs(secs));

        Self {
            app: Arc::new(app),
            http: Client::new(),
            cached: Arc::new(RwLock::new(CachedToken {
                access_token: credentials.access_token.unwrap_or_default(),
                refresh_token: credentials.refresh_token,
                expires_at,
            })),
        }
    }

    /// Build from stored credentials against the default Yandex endpoints.
    pub fn from_credentials(credentials: OAuthCredentials) -> Self {
        let app = OAuthApp::new(&credentials.client_id, &credentials.client_secret);
        Self::new(app, credentials)
    }

    async fn refresh_token(&self) -> Result<String> {
        let mut cached = self.cached.write().await;

        // Another caller may have refreshed while we waited for the lock.
        if cached.is_fresh() {
            return Ok(cached.access_token.clone());
        }

        let response = self.app.refresh(&self.http, &cached.refresh_token).await?;

        cached.access_token = response.access_token;
        cached.expires_at = Some(SystemTime::now() + Duration::from_secs(response.expires_in));
        if let Some(rotated) = response.refresh_token {
            cached.refresh_token = rotated;
        }

        tracing::debug!(expires_in = response.expires_in, "refreshed access token");

        Ok(cached.access_token.clone())
    }
}

#[async_trait]
impl TokenSource for RefreshingToken {
    async fn access_token(&self) -> Result<String> {
        {
            let cached = self.cached.read().await;
            if cached.is_fresh() {
                return Ok(cached.access_token.clone());
            }
        }

        self.refresh_token().await
    }
}
