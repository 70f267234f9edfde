//! YouTube Shorts upload over the Data API v3 resumable protocol.

use reqwest::header::{CONTENT_TYPE, LOCATION};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::credential::CredentialStore;
use super::schedule::format_publish_at;
use super::{truncate_chars, PublishRequest, UploadResult};
use super::{MAX_DESCRIPTION_CHARS, MAX_TAGS, MAX_TITLE_CHARS};
use crate::config::YouTubeConfig;
use crate::error::{Error, Result};

/// Tag every upload carries
pub const SHORTS_TAG: &str = "shorts";

const VIDEO_MIME: &str = "video/mp4";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoMetadata {
    pub snippet: Snippet,
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub privacy_status: String,
    pub self_declared_made_for_kids: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_at: Option<String>,
}

/// Build the insert body. Over-long fields are truncated, never rejected;
/// the tag list keeps room for [`SHORTS_TAG`].
pub fn build_metadata(request: &PublishRequest, category_id: &str) -> VideoMetadata {
    let mut tags: Vec<String> = request.tags.iter().take(MAX_TAGS - 1).cloned().collect();
    tags.push(SHORTS_TAG.to_owned());

    VideoMetadata {
        snippet: Snippet {
            title: truncate_chars(&request.title, MAX_TITLE_CHARS),
            description: truncate_chars(&request.description, MAX_DESCRIPTION_CHARS),
            tags,
            category_id: category_id.to_owned(),
        },
        status: Status {
            // scheduled videos must stay private until publishAt
            privacy_status: "private".to_owned(),
            self_declared_made_for_kids: false,
            publish_at: request.publish_at.as_ref().map(format_publish_at),
        },
    }
}

pub fn shorts_url(id: &str) -> String {
    format!("https://youtube.com/shorts/{id}")
}

#[derive(Debug, Deserialize)]
struct InsertedVideo {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ChannelList {
    #[serde(default)]
    items: Vec<Channel>,
}

#[derive(Debug, Deserialize)]
struct Channel {
    snippet: ChannelSnippet,
}

#[derive(Debug, Deserialize)]
struct ChannelSnippet {
    title: String,
}

fn upload_failed(e: reqwest::Error) -> Error {
    Error::UploadFailed(e.to_string())
}

pub struct YouTubeUploader {
    http: reqwest::Client,
    config: YouTubeConfig,
}

impl YouTubeUploader {
    pub fn new(http: reqwest::Client, config: &YouTubeConfig) -> Self {
        Self {
            http,
            config: config.clone(),
        }
    }

    /// Upload `request.video_path` as a Short.
    ///
    /// The credential is loaded (and refreshed when expired) before any
    /// request touches the upload API.
    pub async fn upload_video(
        &self,
        store: &CredentialStore,
        request: &PublishRequest,
    ) -> Result<UploadResult> {
        let credential = store.load_fresh(&self.http, &self.config.token_url).await?;
        let metadata = build_metadata(request, &self.config.category_id);
        let bytes = tokio::fs::read(&request.video_path).await?;

        info!(
            path = %request.video_path.display(),
            size = bytes.len(),
            title = %metadata.snippet.title,
            publish_at = metadata.status.publish_at.as_deref().unwrap_or("-"),
            "uploading to YouTube"
        );

        let initiate = self
            .http
            .post(&self.config.upload_url)
            .query(&[("uploadType", "resumable"), ("part", "snippet,status")])
            .bearer_auth(&credential.token)
            .header("X-Upload-Content-Type", VIDEO_MIME)
            .header("X-Upload-Content-Length", bytes.len().to_string())
            .json(&metadata)
            .send()
            .await
            .map_err(upload_failed)?;

        let status = initiate.status();
        if !status.is_success() {
            let body = initiate.text().await.unwrap_or_default();
            return Err(Error::UploadFailed(format!("{status}: {body}")));
        }
        let session = initiate
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .ok_or_else(|| Error::UploadFailed("no resumable session location".into()))?;
        debug!(%session, "resumable session opened");

        let upload = self
            .http
            .put(&session)
            .bearer_auth(&credential.token)
            .header(CONTENT_TYPE, VIDEO_MIME)
            .body(bytes)
            .send()
            .await
            .map_err(upload_failed)?;

        let status = upload.status();
        let body = upload.text().await.map_err(upload_failed)?;
        if !status.is_success() {
            return Err(Error::UploadFailed(format!("{status}: {body}")));
        }
        let video: InsertedVideo = serde_json::from_str(&body)
            .map_err(|_| Error::UploadFailed(format!("unexpected response: {body}")))?;

        let url = shorts_url(&video.id);
        info!(id = %video.id, %url, "YouTube upload complete");
        Ok(UploadResult {
            id: video.id,
            url,
            title: request.title.clone(),
        })
    }

    /// Title of the channel the credential belongs to, if any.
    pub async fn channel_title(&self, store: &CredentialStore) -> Result<Option<String>> {
        let credential = store.load_fresh(&self.http, &self.config.token_url).await?;
        let response = self
            .http
            .get(format!("{}/channels", self.config.api_url.trim_end_matches('/')))
            .query(&[("part", "snippet"), ("mine", "true")])
            .bearer_auth(&credential.token)
            .send()
            .await
            .map_err(upload_failed)?;

        let status = response.status();
        let body = response.text().await.map_err(upload_failed)?;
        if !status.is_success() {
            return Err(Error::UploadFailed(format!("{status}: {body}")));
        }
        let channels: ChannelList = serde_json::from_str(&body)?;
        Ok(channels.items.into_iter().next().map(|c| c.snippet.title))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn metadata_defaults() {
        let request = PublishRequest::new("v.mp4", "AI tutor")
            .with_description("summary")
            .with_tags(["GenITeacher"]);
        let metadata = build_metadata(&request, "22");

        assert_eq!(metadata.snippet.tags, vec!["GenITeacher", "shorts"]);
        assert_eq!(metadata.snippet.category_id, "22");
        assert_eq!(metadata.status.privacy_status, "private");
        assert!(!metadata.status.self_declared_made_for_kids);
        assert!(metadata.status.publish_at.is_none());
    }

    #[test]
    fn oversized_fields_are_truncated() {
        let request = PublishRequest::new("v.mp4", "t".repeat(150))
            .with_description("d".repeat(6000))
            .with_tags((0..800).map(|i| format!("tag{i}")));
        let metadata = build_metadata(&request, "22");

        assert_eq!(metadata.snippet.title.chars().count(), 100);
        assert_eq!(metadata.snippet.description.chars().count(), 5000);
        assert_eq!(metadata.snippet.tags.len(), 500);
        assert_eq!(metadata.snippet.tags[498], "tag498");
        assert_eq!(metadata.snippet.tags.last().unwrap(), "shorts");
    }

    #[test]
    fn scheduled_upload_carries_publish_at() {
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 3, 0, 0).unwrap();
        let request = PublishRequest::new("v.mp4", "later").with_publish_at(Some(at));
        let json = serde_json::to_value(build_metadata(&request, "22")).unwrap();

        assert_eq!(json["status"]["publishAt"], "2025-01-01T03:00:00.000Z");
        assert_eq!(json["status"]["privacyStatus"], "private");
        assert_eq!(json["status"]["selfDeclaredMadeForKids"], false);
        assert_eq!(json["snippet"]["categoryId"], "22");
    }

    #[test]
    fn unscheduled_body_omits_publish_at() {
        let request = PublishRequest::new("v.mp4", "now");
        let json = serde_json::to_value(build_metadata(&request, "22")).unwrap();
        assert!(json["status"].get("publishAt").is_none());
    }

    #[test]
    fn shorts_url_format() {
        assert_eq!(shorts_url("abc123"), "https://youtube.com/shorts/abc123");
    }
}
