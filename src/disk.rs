//! Disk metadata.

use reqwest::Method;

use crate::client::Client;
use crate::error::Result;
use crate::models::Disk;

const URL_GET_DISK: &str = "";

impl Client {
    /// Quota and owner of the user's disk.
    pub async fn get_disk(&self) -> Result<Disk> {
        let (_, disk) = self.request_value(Method::GET, URL_GET_DISK, &[]).await?;
        Ok(disk)
    }
}
