//! Acquiring source byte streams.

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use crate::error::IngestError;

/// Upstream timeout; hitting it fails the source.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Opens the byte stream behind a source URL.
///
/// The returned reader owns the underlying connection or file; dropping it
/// releases them.
pub trait Fetch {
    fn fetch(&self, url: &str) -> Result<Box<dyn Read>, IngestError>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, IngestError> {
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| IngestError::transport("<client>", e))?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Box<dyn Read>, IngestError> {
        debug!(url, "fetching");
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| IngestError::transport(url, e))?;

        if !resp.status().is_success() {
            return Err(IngestError::transport(
                url,
                format!("request failed with status {}", resp.status()),
            ));
        }

        Ok(Box::new(resp))
    }
}

/// Serves mirrored files from a directory, keyed by the URL's last path segment.
pub struct DirFetcher {
    dir: PathBuf,
}

impl DirFetcher {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, url: &str) -> PathBuf {
        let name = url.rsplit('/').next().unwrap_or(url);
        self.dir.join(name)
    }
}

impl Fetch for DirFetcher {
    fn fetch(&self, url: &str) -> Result<Box<dyn Read>, IngestError> {
        let path = self.path_for(url);
        debug!(path = %path.display(), "opening mirrored file");
        let file = File::open(&path).map_err(|e| IngestError::transport(path.display().to_string(), e))?;
        Ok(Box::new(file))
    }
}
