//! Publish workflow.
//!
//! Two independent uploaders: [`youtube::YouTubeUploader`] for Shorts and
//! [`instagram::InstagramUploader`] for Reels. They share no state and each
//! performs one blocking round-trip at a time.

pub mod credential;
pub mod hosting;
pub mod instagram;
pub mod schedule;
pub mod youtube;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub use credential::{Credential, CredentialStore};
pub use instagram::{InstagramAccount, InstagramUploader};
pub use youtube::YouTubeUploader;

pub const MAX_TITLE_CHARS: usize = 100;
pub const MAX_DESCRIPTION_CHARS: usize = 5000;
pub const MAX_TAGS: usize = 500;

/// Everything needed to publish one video. Immutable once built.
#[derive(Debug, Clone)]
pub struct PublishRequest {
    pub video_path: PathBuf,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub publish_at: Option<DateTime<Utc>>,
}

impl PublishRequest {
    pub fn new(video_path: impl Into<PathBuf>, title: impl Into<String>) -> Self {
        Self {
            video_path: video_path.into(),
            title: title.into(),
            description: String::new(),
            tags: Vec::new(),
            publish_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_publish_at(mut self, publish_at: Option<DateTime<Utc>>) -> Self {
        self.publish_at = publish_at;
        self
    }
}

/// Where a published video ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadResult {
    pub id: String,
    pub url: String,
    /// Echoed title, or the caller's caption for reels
    pub title: String,
}

/// First `max` characters of `s`.
pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
