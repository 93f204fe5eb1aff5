use crate::error::{FontSwapError, Result};
use std::fs;
use std::path::Path;

/// Fetches a remote file onto the local disk.
pub trait Downloader {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()>;
}

/// A blocking HTTPS downloader.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: reqwest::blocking::Client,
}

impl HttpDownloader {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("fontswap/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FontSwapError::Environment {
                msg: format!("Could not set up HTTP client: {}", e),
            })?;
        Ok(HttpDownloader { client })
    }
}

impl Downloader for HttpDownloader {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        let download_error = |e: reqwest::Error| FontSwapError::Download {
            url: url.to_string(),
            msg: e.to_string(),
        };
        log::info!("Downloading {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(download_error)?;
        let body = response.bytes().map_err(download_error)?;
        fs::write(dest, &body).map_err(FontSwapError::io(dest))?;
        log::debug!("Wrote {} bytes to {}", body.len(), dest.display());
        Ok(())
    }
}
