//! yadisk - A client for the Yandex.Disk REST API.
//!
//! This library provides typed access to:
//! - Disk quota and owner information
//! - Copying, moving and deleting files and folders, creating folders
//! - Uploading and downloading file contents through server-issued links
//!
//! # Example
//!
//! ```no_run
//! use yadisk::Client;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = Client::from_access_token("oauth-token");
//!
//!     let disk = client.get_disk().await?;
//!     println!("{}", disk);
//!
//!     let link = client.request_upload_link("/hello.txt", true).await?;
//!     let status = client.upload(&link, "Hello, Disk!").await?;
//!     println!("upload finished with {}", status);
//!
//!     Ok(())
//! }
//! ```

mod actions;
pub mod auth;
pub mod client;
pub mod decode;
mod disk;
pub mod error;
pub mod models;
mod transfer;
pub mod transport;

// Re-exports for convenience
pub use auth::{OAuthApp, OAuthCredentials, RefreshingToken, StaticToken, TokenSource};
pub use client::{Client, ClientConfig, DEFAULT_BASE_URL};
pub use error::{ApiError, DiskError, Result};
pub use models::{ActionOutcome, Disk, Link, Resource};
pub use transport::{HttpTransport, Transport};
