//! Error types for shortform

use thiserror::Error;

/// Result type alias for shortform operations
pub type Result<T> = std::result::Result<T, Error>;

/// shortform error type
#[derive(Error, Debug)]
pub enum Error {
    // Reshaper errors
    #[error("Source video unreadable: {0}")]
    SourceUnreadable(String),

    #[error("Encoding failed: {0}")]
    EncodeFailed(String),

    // Credential errors
    #[error("Credential missing: {0}")]
    CredentialMissing(String),

    #[error("Credential invalid: {0}")]
    CredentialInvalid(String),

    // Platform errors, carrying the raw platform payload
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Container creation failed: {0}")]
    ContainerCreationFailed(String),

    #[error("Container {0} still processing")]
    ContainerNotReady(String),

    #[error("Publish failed: {0}")]
    PublishFailed(String),

    #[error("Video hosting failed: {0}")]
    HostingFailed(String),

    #[error("Invalid schedule '{0}' (expected YYYY-MM-DD HH:MM)")]
    ScheduleFormatInvalid(String),

    // Generation errors
    #[error("Generation failed: {0}")]
    Generation(String),

    // General errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Check if the caller may reasonably retry the same operation
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::UploadFailed(_) | Error::ContainerNotReady(_) | Error::HostingFailed(_)
        )
    }

    /// Check if this is a credential problem rather than a platform rejection
    pub fn is_credential_issue(&self) -> bool {
        matches!(
            self,
            Error::CredentialMissing(_) | Error::CredentialInvalid(_)
        )
    }
}

impl From<async_openai::error::OpenAIError> for Error {
    fn from(e: async_openai::error::OpenAIError) -> Self {
        Error::Generation(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(Error::UploadFailed("timeout".into()).is_retryable());
        assert!(Error::ContainerNotReady("17".into()).is_retryable());
        assert!(!Error::PublishFailed("{}".into()).is_retryable());
        assert!(!Error::ScheduleFormatInvalid("x".into()).is_retryable());
    }

    #[test]
    fn credential_classification() {
        assert!(Error::CredentialMissing("token.json".into()).is_credential_issue());
        assert!(Error::CredentialInvalid("revoked".into()).is_credential_issue());
        assert!(!Error::UploadFailed("403".into()).is_credential_issue());
    }
}
