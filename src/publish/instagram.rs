//! Instagram Reels upload through the Graph API.
//!
//! Publishing is create-then-publish: a media container is created from a
//! public video URL, checked until the platform has finished ingesting it,
//! and then published.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info, warn};

use super::hosting::VideoHost;
use super::UploadResult;
use crate::config::InstagramConfig;
use crate::error::{Error, Result};

/// Access token and business account the reel is published to.
#[derive(Debug, Clone, Default)]
pub struct InstagramAccount {
    pub access_token: Option<String>,
    pub account_id: Option<String>,
}

impl InstagramAccount {
    pub fn from_config(config: &InstagramConfig) -> Self {
        Self {
            access_token: config.access_token.clone(),
            account_id: config.account_id.clone(),
        }
    }

    fn require(&self) -> Result<(&str, &str)> {
        let token = self
            .access_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::CredentialMissing("Instagram access token".into()))?;
        let account = self
            .account_id
            .as_deref()
            .filter(|a| !a.is_empty())
            .ok_or_else(|| Error::CredentialMissing("Instagram account id".into()))?;
        Ok((token, account))
    }
}

/// How long to wait for a container to finish processing.
#[derive(Debug, Clone, Copy)]
pub struct ContainerPoll {
    /// Status checks before giving up; 0 skips checking entirely
    pub attempts: u32,
    pub interval: Duration,
}

impl ContainerPoll {
    pub fn from_config(config: &InstagramConfig) -> Self {
        Self {
            attempts: config.poll_attempts,
            interval: Duration::from_secs(config.poll_interval_secs),
        }
    }
}

/// `caption`, a blank line, then `#tag` for each tag separated by spaces.
pub fn compose_caption(caption: &str, tags: &[String]) -> String {
    let hashtags = tags
        .iter()
        .map(|tag| format!("#{tag}"))
        .collect::<Vec<_>>()
        .join(" ");
    format!("{caption}\n\n{hashtags}")
}

pub fn reel_url(id: &str) -> String {
    format!("https://www.instagram.com/reel/{id}")
}

#[derive(Debug, Deserialize)]
struct Created {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ContainerStatus {
    #[serde(default)]
    status_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AccountInfo {
    #[serde(default)]
    username: Option<String>,
}

pub struct InstagramUploader {
    http: reqwest::Client,
    base_url: String,
    poll: ContainerPoll,
    host: Box<dyn VideoHost>,
}

impl InstagramUploader {
    pub fn new(http: reqwest::Client, config: &InstagramConfig, host: Box<dyn VideoHost>) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            poll: ContainerPoll::from_config(config),
            host,
        }
    }

    pub fn with_poll(mut self, poll: ContainerPoll) -> Self {
        self.poll = poll;
        self
    }

    /// Publish `video_path` as a reel.
    ///
    /// Fails with `CredentialMissing` before any network traffic when the
    /// account is incomplete.
    pub async fn upload_reel(
        &self,
        account: &InstagramAccount,
        video_path: &Path,
        caption: &str,
        tags: &[String],
    ) -> Result<UploadResult> {
        let (token, account_id) = account.require()?;
        let full_caption = compose_caption(caption, tags);

        let video_url = self.host.host(video_path).await?;
        info!(path = %video_path.display(), %video_url, "creating reel container");

        let container_id = self
            .create_container(token, account_id, &video_url, &full_caption)
            .await?;
        debug!(%container_id, "container created");

        self.wait_until_ready(token, &container_id).await?;

        let media_id = self.publish(token, account_id, &container_id).await?;
        let url = reel_url(&media_id);
        info!(id = %media_id, %url, "reel published");
        Ok(UploadResult {
            id: media_id,
            url,
            title: caption.to_owned(),
        })
    }

    async fn create_container(
        &self,
        token: &str,
        account_id: &str,
        video_url: &str,
        caption: &str,
    ) -> Result<String> {
        let response = self
            .http
            .post(format!("{}/{account_id}/media", self.base_url))
            .form(&[
                ("media_type", "REELS"),
                ("video_url", video_url),
                ("caption", caption),
                ("share_to_feed", "true"),
                ("access_token", token),
            ])
            .send()
            .await
            .map_err(|e| Error::ContainerCreationFailed(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(Error::ContainerCreationFailed(body));
        }
        let created: Created =
            serde_json::from_str(&body).map_err(|_| Error::ContainerCreationFailed(body.clone()))?;
        Ok(created.id)
    }

    /// Poll the container status until it can be published.
    async fn wait_until_ready(&self, token: &str, container_id: &str) -> Result<()> {
        if self.poll.attempts == 0 {
            return Ok(());
        }

        for attempt in 1..=self.poll.attempts {
            let response = self
                .http
                .get(format!("{}/{container_id}", self.base_url))
                .query(&[("fields", "status_code"), ("access_token", token)])
                .send()
                .await
                .map_err(|e| Error::ContainerCreationFailed(e.to_string()))?;

            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            if !status.is_success() {
                return Err(Error::ContainerCreationFailed(body));
            }
            let container: ContainerStatus = serde_json::from_str(&body)
                .map_err(|_| Error::ContainerCreationFailed(body.clone()))?;

            match container.status_code.as_deref() {
                Some("FINISHED") | Some("PUBLISHED") => return Ok(()),
                Some("ERROR") | Some("EXPIRED") => return Err(Error::ContainerCreationFailed(body)),
                code => {
                    debug!(%container_id, attempt, status = code.unwrap_or("-"), "container not ready");
                    if attempt < self.poll.attempts {
                        tokio::time::sleep(self.poll.interval).await;
                    }
                }
            }
        }

        warn!(%container_id, attempts = self.poll.attempts, "container still processing");
        Err(Error::ContainerNotReady(container_id.to_owned()))
    }

    async fn publish(&self, token: &str, account_id: &str, container_id: &str) -> Result<String> {
        let response = self
            .http
            .post(format!("{}/{account_id}/media_publish", self.base_url))
            .form(&[("creation_id", container_id), ("access_token", token)])
            .send()
            .await
            .map_err(|e| Error::PublishFailed(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(Error::PublishFailed(body));
        }
        let published: Created =
            serde_json::from_str(&body).map_err(|_| Error::PublishFailed(body.clone()))?;
        Ok(published.id)
    }

    /// Username of the configured account, for connection checks.
    pub async fn account_username(&self, account: &InstagramAccount) -> Result<Option<String>> {
        let (token, account_id) = account.require()?;
        let response = self
            .http
            .get(format!("{}/{account_id}", self.base_url))
            .query(&[("fields", "username"), ("access_token", token)])
            .send()
            .await
            .map_err(|e| Error::UploadFailed(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(Error::UploadFailed(format!("{status}: {body}")));
        }
        let info: AccountInfo = serde_json::from_str(&body)?;
        Ok(info.username)
    }
}
