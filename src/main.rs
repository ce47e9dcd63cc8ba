//! yadisk CLI - Interact with Yandex.Disk.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use futures::StreamExt;
use reqwest::Body;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing_subscriber::EnvFilter;

use yadisk::models::format_size;
use yadisk::{
    Client, ClientConfig, HttpTransport, OAuthApp, OAuthCredentials, RefreshingToken,
    StaticToken, DEFAULT_BASE_URL,
};

/// CLI tool for interacting with Yandex.Disk.
#[derive(Parser)]
#[command(name = "yadisk")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// OAuth access token.
    #[arg(long, env = "YADISK_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Path to stored OAuth credentials JSON (used when no token is given).
    #[arg(long, env = "YADISK_CREDENTIALS")]
    credentials: Option<PathBuf>,

    /// API root URL.
    #[arg(long, env = "YADISK_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Obtain OAuth credentials for an application and save them.
    Login {
        #[arg(long, env = "YADISK_CLIENT_ID")]
        client_id: String,

        #[arg(long, env = "YADISK_CLIENT_SECRET", hide_env_values = true)]
        client_secret: String,

        /// Where to write the credentials JSON.
        #[arg(long, short = 'o', default_value = "yadisk-credentials.json")]
        output: PathBuf,
    },

    /// Show disk usage and owner.
    Info,

    /// Copy a file or folder.
    Copy {
        from: String,
        to: String,

        /// Replace an existing resource at the destination.
        #[arg(long)]
        overwrite: bool,
    },

    /// Move a file or folder.
    Move {
        from: String,
        to: String,

        /// Replace an existing resource at the destination.
        #[arg(long)]
        overwrite: bool,
    },

    /// Delete a file or folder.
    Delete {
        path: String,

        /// Delete without moving to the Trash.
        #[arg(long)]
        permanently: bool,
    },

    /// Create a folder.
    Mkdir { path: String },

    /// Upload a local file.
    Upload {
        /// Local file to upload.
        file: PathBuf,

        /// Destination path on the disk.
        path: String,

        /// Replace an existing file.
        #[arg(long)]
        overwrite: bool,
    },

    /// Download a file to the local filesystem.
    Download {
        /// File path on the disk.
        path: String,

        /// Local destination path (file or directory).
        #[arg(long, short = 't', default_value = ".")]
        to: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Login {
        client_id,
        client_secret,
        output,
    } = &cli.command
    {
        return login(client_id, client_secret, output).await;
    }

    let client = build_client(&cli)?;

    match cli.command {
        Commands::Login { .. } => unreachable!("handled above"),

        Commands::Info => {
            let disk = client.get_disk().await.context("Failed to get disk info")?;

            if let Some(user) = &disk.user {
                println!(
                    "User:      {} ({})",
                    user.display_name.as_deref().unwrap_or(&user.login),
                    user.login
                );
            }
            println!("Total:     {}", format_size(disk.total_space));
            println!("Used:      {}", format_size(disk.used_space));
            println!("Free:      {}", format_size(disk.free_space()));
            println!("Trash:     {}", format_size(disk.trash_size));
            if let Some(max) = disk.max_file_size {
                println!("Max file:  {}", format_size(max));
            }
            println!("Paid:      {}", if disk.is_paid { "yes" } else { "no" });
        }

        Commands::Copy {
            from,
            to,
            overwrite,
        } => {
            let outcome = client
                .copy(&from, &to, overwrite)
                .await
                .with_context(|| format!("Failed to copy {} to {}", from, to))?;
            report(
                outcome.is_in_progress(),
                outcome.link.as_ref().map(|l| l.href.as_str()),
            );
        }

        Commands::Move {
            from,
            to,
            overwrite,
        } => {
            let outcome = client
                .move_resource(&from, &to, overwrite)
                .await
                .with_context(|| format!("Failed to move {} to {}", from, to))?;
            report(
                outcome.is_in_progress(),
                outcome.link.as_ref().map(|l| l.href.as_str()),
            );
        }

        Commands::Delete { path, permanently } => {
            let outcome = client
                .delete(&path, permanently)
                .await
                .with_context(|| format!("Failed to delete {}", path))?;
            report(
                outcome.is_in_progress(),
                outcome.link.as_ref().map(|l| l.href.as_str()),
            );
        }

        Commands::Mkdir { path } => {
            client
                .create_directory(&path)
                .await
                .with_context(|| format!("Failed to create directory {}", path))?;
            println!("OK");
        }

        Commands::Upload {
            file,
            path,
            overwrite,
        } => {
            let local = File::open(&file)
                .await
                .with_context(|| format!("Failed to open {:?}", file))?;
            let size = local.metadata().await?.len();

            let link = client
                .request_upload_link(&path, overwrite)
                .await
                .with_context(|| format!("Failed to get upload link for {}", path))?;

            print!("Uploading {} ({})... ", file.display(), format_size(size));
            io::stdout().flush()?;

            let body = Body::wrap_stream(ReaderStream::new(local));
            let status = client
                .upload(&link, body)
                .await
                .with_context(|| format!("Failed to upload {:?}", file))?;

            if !status.is_success() {
                println!("FAILED");
                bail!("Upload rejected with status {}", status);
            }
            println!("OK ({})", status);
        }

        Commands::Download { path, to } => {
            let final_path = destination_path(&path, &to)?;

            let link = client
                .request_download_link(&path)
                .await
                .with_context(|| format!("Failed to get download link for {}", path))?;

            print!("Downloading {}... ", path);
            io::stdout().flush()?;

            let response = client
                .download(&link)
                .await
                .with_context(|| format!("Failed to download {}", path))?;

            let status = response.status();
            if !status.is_success() {
                println!("FAILED");
                bail!("Download rejected with status {}", status);
            }

            // Stream to file
            let mut file = File::create(&final_path)
                .await
                .with_context(|| format!("Failed to create {:?}", final_path))?;
            let mut stream = response.bytes_stream();

            while let Some(chunk) = stream.next().await {
                file.write_all(&chunk?).await?;
            }
            file.flush().await?;

            println!("OK");
            println!("Saved to: {:?}", final_path);
        }
    }

    Ok(())
}

/// Build the API client from the token or the stored credentials.
fn build_client(cli: &Cli) -> Result<Client> {
    let transport = match (&cli.token, &cli.credentials) {
        (Some(token), _) => HttpTransport::new(StaticToken::new(token.clone())),
        (None, Some(path)) => {
            let credentials = OAuthCredentials::from_file(path)
                .with_context(|| format!("Failed to load credentials from {:?}", path))?;
            HttpTransport::new(RefreshingToken::from_credentials(credentials))
        }
        (None, None) => bail!("Either --token or --credentials is required"),
    };

    let config = ClientConfig::new(transport)
        .with_base_url(&cli.base_url)
        .with_context(|| format!("Invalid base URL: {}", cli.base_url))?;

    Ok(Client::new(config))
}

/// Interactive authorization code flow.
async fn login(client_id: &str, client_secret: &str, output: &Path) -> Result<()> {
    let app = OAuthApp::new(client_id, client_secret);
    let url = app.authorize_url("yadisk-cli")?;

    println!("Open this URL in a browser and grant access:");
    println!("  {}", url);
    print!("Confirmation code: ");
    io::stdout().flush()?;

    let mut code = String::new();
    io::stdin().lock().read_line(&mut code)?;
    let code = code.trim();
    if code.is_empty() {
        bail!("No confirmation code entered");
    }

    let token = app
        .exchange_code(&reqwest::Client::new(), code)
        .await
        .context("Failed to exchange confirmation code")?;

    let refresh_token = token
        .refresh_token
        .context("Token response carried no refresh token")?;

    let credentials = OAuthCredentials {
        client_id: client_id.to_string(),
        client_secret: client_secret.to_string(),
        refresh_token,
        access_token: Some(token.access_token),
        expires_in: Some(token.expires_in),
    };

    std::fs::write(output, serde_json::to_vec_pretty(&credentials)?)
        .with_context(|| format!("Failed to write {:?}", output))?;
    println!("Credentials saved to {:?}", output);

    Ok(())
}

/// Print the outcome of an action that may still be running on the server.
fn report(in_progress: bool, link: Option<&str>) {
    match (in_progress, link) {
        (true, Some(href)) => println!("Accepted, still running. Status: {}", href),
        (true, None) => println!("Accepted, still running."),
        (false, _) => println!("OK"),
    }
}

/// Resolve the local file for a download, creating parent directories.
fn destination_path(remote: &str, to: &Path) -> Result<PathBuf> {
    let name = remote_file_name(remote)
        .with_context(|| format!("Cannot derive a file name from {}", remote))?;

    if to.is_dir() || to.to_string_lossy().ends_with('/') {
        std::fs::create_dir_all(to)
            .with_context(|| format!("Failed to create directory: {:?}", to))?;
        return Ok(to.join(name));
    }

    if let Some(parent) = to.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
    }

    Ok(to.to_path_buf())
}

/// Last path segment of a disk path such as `disk:/dir/file.txt`.
fn remote_file_name(remote: &str) -> Option<&str> {
    let path = remote.strip_prefix("disk:").unwrap_or(remote);
    path.rsplit('/').find(|segment| !segment.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_file_name() {
        assert_eq!(remote_file_name("/dir/file.txt"), Some("file.txt"));
        assert_eq!(remote_file_name("disk:/dir/file.txt"), Some("file.txt"));
        assert_eq!(remote_file_name("file.txt"), Some("file.txt"));
        assert_eq!(remote_file_name("/dir/"), Some("dir"));
        assert_eq!(remote_file_name("/"), None);
    }

    #[test]
    fn test_destination_path_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = destination_path("/photos/cat.jpg", dir.path()).unwrap();
        assert_eq!(path, dir.path().join("cat.jpg"));
    }

    #[test]
    fn test_destination_path_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("renamed.jpg");

        let path = destination_path("/photos/cat.jpg", &target).unwrap();
        assert_eq!(path, target);
        assert!(dir.path().join("nested").is_dir());
    }

    #[test]
    fn test_cli_requires_subcommand_args() {
        let cli = Cli::try_parse_from(["yadisk", "--token", "t", "copy", "/a", "/b", "--overwrite"])
            .unwrap();
        match cli.command {
            Commands::Copy {
                from,
                to,
                overwrite,
            } => {
                assert_eq!(from, "/a");
                assert_eq!(to, "/b");
                assert!(overwrite);
            }
            _ => panic!("expected copy"),
        }
        assert_eq!(cli.base_url, DEFAULT_BASE_URL);
    }
}
