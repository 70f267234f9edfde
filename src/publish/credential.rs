//! Persisted OAuth credential for the video platform.
//!
//! Stored as an authorized-user JSON document. The store reads it once per
//! workflow, refreshes it through the token endpoint when expired, and writes
//! the renewed token back to the same file.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    /// Bearer access token
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl Credential {
    /// A credential without an expiry never expires
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry.is_some_and(|expiry| expiry <= now)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// File-backed credential storage.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Credential> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::CredentialMissing(self.path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&bytes)
            .map_err(|e| Error::CredentialInvalid(format!("{}: {e}", self.path.display())))
    }

    /// Replace the stored credential via a temp file and rename.
    pub fn save(&self, credential: &Credential) -> Result<()> {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let json = serde_json::to_vec_pretty(credential)?;
        {
            let mut file = std::fs::File::create(&tmp)?;
            file.write_all(&json)?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "credential saved");
        Ok(())
    }

    /// Load the credential, refreshing and persisting it first if expired.
    pub async fn load_fresh(
        &self,
        http: &reqwest::Client,
        default_token_url: &str,
    ) -> Result<Credential> {
        let credential = self.load()?;
        if !credential.is_expired() {
            return Ok(credential);
        }

        info!(path = %self.path.display(), "credential expired, refreshing");
        let renewed = refresh(http, &credential, default_token_url).await?;
        self.save(&renewed)?;
        Ok(renewed)
    }
}

/// Exchange the refresh token for a new access token.
pub async fn refresh(
    http: &reqwest::Client,
    credential: &Credential,
    default_token_url: &str,
) -> Result<Credential> {
    let refresh_token = credential
        .refresh_token
        .as_deref()
        .ok_or_else(|| Error::CredentialInvalid("expired and no refresh token".into()))?;
    let (client_id, client_secret) = credential
        .client_id
        .as_deref()
        .zip(credential.client_secret.as_deref())
        .ok_or_else(|| Error::CredentialInvalid("expired and no client id/secret".into()))?;
    let token_url = credential.token_uri.as_deref().unwrap_or(default_token_url);

    let response = http
        .post(token_url)
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ])
        .send()
        .await
        .map_err(|e| Error::CredentialInvalid(format!("token endpoint: {e}")))?;

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if !status.is_success() {
        return Err(Error::CredentialInvalid(format!("{status}: {body}")));
    }
    let token: TokenResponse = serde_json::from_str(&body)
        .map_err(|e| Error::CredentialInvalid(format!("token response: {e}")))?;

    Ok(Credential {
        token: token.access_token,
        refresh_token: token
            .refresh_token
            .or_else(|| credential.refresh_token.clone()),
        expiry: token
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(secs)),
        ..credential.clone()
    })
}
