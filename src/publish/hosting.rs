//! Making a local video reachable by URL.
//!
//! The Graph API only ingests media it can fetch itself, so the reel workflow
//! first hands the file to a [`VideoHost`].

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::HostingConfig;
use crate::error::{Error, Result};

#[async_trait]
pub trait VideoHost: Send + Sync {
    /// Make `path` fetchable and return its public URL.
    async fn host(&self, path: &Path) -> Result<String>;
}

/// Build the host described by the configuration.
pub fn from_config(config: &HostingConfig, http: reqwest::Client) -> Box<dyn VideoHost> {
    match config {
        HostingConfig::FileIo { url } => Box::new(FileIoHost::new(http, url.clone())),
        HostingConfig::Static { base_url } => Box::new(StaticUrlHost::new(base_url.clone())),
    }
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_owned)
        .ok_or_else(|| Error::HostingFailed(format!("{}: no file name", path.display())))
}

/// Temporary hosting on a file.io compatible service.
pub struct FileIoHost {
    http: reqwest::Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct FileIoResponse {
    #[serde(default)]
    success: Option<bool>,
    link: Option<String>,
}

impl FileIoHost {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }
}

#[async_trait]
impl VideoHost for FileIoHost {
    async fn host(&self, path: &Path) -> Result<String> {
        let name = file_name(path)?;
        let bytes = tokio::fs::read(path).await?;
        debug!(file = %name, size = bytes.len(), url = %self.url, "uploading to file host");

        let part = Part::bytes(bytes)
            .file_name(name)
            .mime_str("video/mp4")
            .map_err(|e| Error::HostingFailed(e.to_string()))?;
        let response = self
            .http
            .post(&self.url)
            .multipart(Form::new().part("file", part))
            .send()
            .await
            .map_err(|e| Error::HostingFailed(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(Error::HostingFailed(format!("{status}: {body}")));
        }

        let parsed: FileIoResponse =
            serde_json::from_str(&body).map_err(|_| Error::HostingFailed(body.clone()))?;
        match parsed {
            FileIoResponse {
                success: Some(false),
                ..
            }
            | FileIoResponse { link: None, .. } => Err(Error::HostingFailed(body)),
            FileIoResponse {
                link: Some(link), ..
            } => {
                info!(%link, "video hosted");
                Ok(link)
            }
        }
    }
}

/// Files already published under a public base URL.
pub struct StaticUrlHost {
    base_url: String,
}

impl StaticUrlHost {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl VideoHost for StaticUrlHost {
    async fn host(&self, path: &Path) -> Result<String> {
        Ok(format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            file_name(path)?
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_host_joins_file_name() {
        let host = StaticUrlHost::new("https://cdn.example.com/videos/");
        let url = host
            .host(Path::new("/tmp/data/videos/converted_916_clip.mp4"))
            .await
            .unwrap();
        assert_eq!(url, "https://cdn.example.com/videos/converted_916_clip.mp4");
    }

    #[tokio::test]
    async fn static_host_needs_a_file_name() {
        let host = StaticUrlHost::new("https://cdn.example.com");
        assert!(matches!(
            host.host(Path::new("/")).await,
            Err(Error::HostingFailed(_))
        ));
    }
}
