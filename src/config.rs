//! Configuration for shortform
//!
//! Built once at startup and handed to each component by reference. Secrets
//! come from the environment (optionally via a `.env` file) and are only read
//! here.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Config file looked up when none is given explicitly
pub const DEFAULT_CONFIG_FILE: &str = "shortform.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub logging: LoggingConfig,
    pub openai: OpenAiConfig,
    pub youtube: YouTubeConfig,
    pub instagram: InstagramConfig,
    pub schedule: ScheduleConfig,
}

/// Local file layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root for generated scripts and videos
    pub data_dir: PathBuf,
    /// Persisted YouTube OAuth credential
    pub youtube_token: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            youtube_token: PathBuf::from("token.json"),
        }
    }
}

impl PathsConfig {
    pub fn scripts_dir(&self) -> PathBuf {
        self.data_dir.join("scripts")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Override for the API base, e.g. a local proxy
    pub api_base: Option<String>,
    pub model: String,
    pub summary_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Brand the generated prompts advertise
    pub brand: String,
    /// Language the caption summary is written in
    pub summary_language: String,
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: None,
            model: "gpt-4o".to_owned(),
            summary_model: "gpt-4o".to_owned(),
            temperature: 0.8,
            max_tokens: 2500,
            brand: "GenITeacher".to_owned(),
            summary_language: "Korean".to_owned(),
            timeout_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YouTubeConfig {
    /// Resumable upload endpoint
    pub upload_url: String,
    /// Data API root, used for connection checks
    pub api_url: String,
    /// Token endpoint used when the credential does not name one
    pub token_url: String,
    pub category_id: String,
    /// Tags applied when the caller gives none
    pub default_tags: Vec<String>,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            upload_url: "https://www.googleapis.com/upload/youtube/v3/videos".to_owned(),
            api_url: "https://www.googleapis.com/youtube/v3".to_owned(),
            token_url: "https://oauth2.googleapis.com/token".to_owned(),
            category_id: "22".to_owned(),
            default_tags: vec![
                "GenITeacher".to_owned(),
                "지니티처".to_owned(),
                "AI교육".to_owned(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstagramConfig {
    pub base_url: String,
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
    pub account_id: Option<String>,
    /// Status checks before publishing; 0 publishes immediately
    pub poll_attempts: u32,
    pub poll_interval_secs: u64,
    pub default_tags: Vec<String>,
    pub hosting: HostingConfig,
}

impl Default for InstagramConfig {
    fn default() -> Self {
        Self {
            base_url: "https://graph.facebook.com/v18.0".to_owned(),
            access_token: None,
            account_id: None,
            poll_attempts: 30,
            poll_interval_secs: 5,
            default_tags: vec![
                "지니티처".to_owned(),
                "GenITeacher".to_owned(),
                "AI교육".to_owned(),
                "에듀테크".to_owned(),
                "reels".to_owned(),
            ],
            hosting: HostingConfig::default(),
        }
    }
}

/// Where local videos are made fetchable for the Graph API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HostingConfig {
    /// Multipart upload to a file.io compatible service
    FileIo { url: String },
    /// Files are already served from this public base URL
    Static { base_url: String },
}

impl Default for HostingConfig {
    fn default() -> Self {
        HostingConfig::FileIo {
            url: "https://file.io".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Fixed offset of the zone schedule strings are written in (KST)
    pub utc_offset_hours: i32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: 9,
        }
    }
}

impl AppConfig {
    /// Load configuration.
    ///
    /// An explicit `path` must exist; otherwise `shortform.toml` in the working
    /// directory is used when present. Secrets are then overlaid from the
    /// environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        // a missing .env is fine; variables may be set externally
        if let Ok(env_path) = dotenv::dotenv() {
            debug!(path = %env_path.display(), "loaded .env");
        }
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Overlay secrets; values already set in the file win only when the
    /// variable is absent or empty.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("OPENAI_API_KEY") {
            self.openai.api_key = Some(key);
        }
        if let Some(token) = non_empty("INSTAGRAM_ACCESS_TOKEN") {
            self.instagram.access_token = Some(token);
        }
        if let Some(account) = non_empty("INSTAGRAM_ACCOUNT_ID") {
            self.instagram.account_id = Some(account);
        }
    }
}
