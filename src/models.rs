//! Data models for Yandex.Disk API payloads.
//!
//! Field names follow the remote API verbatim. Most fields are only present in
//! some responses (e.g. `_embedded` only when folder metadata is requested), so
//! they are optional or defaulted.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Descriptor of a follow-up request issued by the server.
///
/// Returned for upload/download targets, created resources and running
/// asynchronous operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// URL. May be a URL template, see `templated`.
    pub href: String,

    /// HTTP method to use for `href`.
    pub method: String,

    /// Whether `href` is an RFC 6570 URL template.
    #[serde(default)]
    pub templated: bool,
}

/// Kind of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Dir,
    File,
}

/// Metadata of a file or folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Key of a published resource.
    #[serde(default)]
    pub public_key: Option<String>,

    /// Link to a published resource.
    #[serde(default)]
    pub public_url: Option<String>,

    /// Folder contents; present only when folder metadata is requested.
    #[serde(rename = "_embedded", default)]
    pub embedded: Option<ResourceList>,

    /// Link to a small preview image, for graphic formats only.
    #[serde(default)]
    pub preview: Option<String>,

    pub name: String,

    /// User-defined `name: value` attributes.
    #[serde(default)]
    pub custom_properties: HashMap<String, String>,

    #[serde(default)]
    pub created: Option<DateTime<FixedOffset>>,

    #[serde(default)]
    pub modified: Option<DateTime<FixedOffset>>,

    /// Full path, e.g. `disk:/foo/bar.txt` or `trash:/foo_1408546879`.
    pub path: String,

    /// Path before the resource was moved to the Trash.
    #[serde(default)]
    pub origin_path: Option<String>,

    #[serde(default)]
    pub md5: Option<String>,

    #[serde(rename = "type")]
    pub resource_type: ResourceType,

    #[serde(default)]
    pub mime_type: Option<String>,

    #[serde(default)]
    pub size: Option<u64>,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.resource_type {
            ResourceType::Dir => "dir",
            ResourceType::File => "file",
        };
        let size_str = self
            .size
            .map(format_size)
            .unwrap_or_else(|| "-".to_string());
        write!(f, "{}\t{}\t{}", kind, size_str, self.path)
    }
}

/// Listing of a folder. Subfolders come first, then files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceList {
    /// Field the list is sorted by.
    #[serde(default)]
    pub sort: Option<String>,

    #[serde(default)]
    pub public_key: Option<String>,

    #[serde(default)]
    pub items: Vec<Resource>,

    #[serde(default)]
    pub limit: Option<u64>,

    #[serde(default)]
    pub offset: Option<u64>,

    /// Path of the listed folder.
    pub path: String,

    /// Total number of resources in the folder.
    #[serde(default)]
    pub total: Option<u64>,
}

/// Flat alphabetical list of all files on the disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilesResourceList {
    #[serde(default)]
    pub items: Vec<Resource>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
}

/// Recently uploaded files, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastUploadedResourceList {
    #[serde(default)]
    pub items: Vec<Resource>,
    #[serde(default)]
    pub limit: Option<u64>,
}

/// Resources published by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicResourcesList {
    #[serde(default)]
    pub items: Vec<Resource>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(rename = "type", default)]
    pub resource_type: Option<ResourceType>,
    #[serde(default)]
    pub offset: Option<u64>,
}

/// Owner of the disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub country: Option<String>,
    pub login: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub uid: String,
}

/// Free and used space on the disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disk {
    /// Cumulative size of the files in the Trash, in bytes.
    pub trash_size: u64,

    /// Total space available to the user, in bytes.
    pub total_space: u64,

    /// Space already used, in bytes.
    pub used_space: u64,

    /// Absolute paths of system folders (`applications`, `downloads`, ...).
    /// Names depend on the interface language at disk creation.
    #[serde(default)]
    pub system_folders: HashMap<String, String>,

    #[serde(default)]
    pub max_file_size: Option<u64>,

    #[serde(default)]
    pub unlimited_autoupload_enabled: bool,

    #[serde(default)]
    pub is_paid: bool,

    #[serde(default)]
    pub user: Option<User>,

    #[serde(default)]
    pub revision: Option<u64>,
}

impl Disk {
    /// Space left, in bytes.
    pub fn free_space(&self) -> u64 {
        self.total_space.saturating_sub(self.used_space)
    }
}

impl std::fmt::Display for Disk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} used of {} ({} free, {} in trash)",
            format_size(self.used_space),
            format_size(self.total_space),
            format_size(self.free_space()),
            format_size(self.trash_size)
        )
    }
}

/// Status of an asynchronous operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationStatus {
    Success,
    /// Repeat the original copy, move or delete request.
    Failure,
    InProgress,
}

/// Status of a copy, move or delete running on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub status: OperationStatus,
}

/// Result of copy, move and delete requests.
///
/// `link` points at the created resource when the operation finished
/// synchronously (201), at the operation status when it is still running
/// (202), and is `None` when the server answered 204 without a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub link: Option<Link>,
    pub status: StatusCode,
}

impl ActionOutcome {
    /// True when the server accepted the request but has not finished it (202).
    /// Tracking completion is up to the caller.
    pub fn is_in_progress(&self) -> bool {
        self.status == StatusCode::ACCEPTED
    }
}

/// Format bytes into human-readable size.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
