use thiserror::Error;

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Errors that can occur while synchronizing zone state to the presence channel
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Presence channel transport error
    #[error("presence channel error: {0}")]
    PresenceChannel(String),

    /// Presence channel rejected the login attempt
    #[error("login failed: {0}")]
    LoginFailed(String),

    /// Media source call failed
    #[error("media source error: {0}")]
    MediaSource(String),

    /// Artwork bytes could not be fetched from the media source
    #[error("image fetch failed: {0}")]
    ImageFetch(String),

    /// Upload to the image host failed
    #[error("image upload failed: {0}")]
    Upload(String),

    /// Metadata search call failed
    #[error("search failed: {0}")]
    Search(String),

    /// The held search credential has expired
    #[error("search credential expired")]
    CredentialExpired,

    /// No external link could be resolved for a track
    #[error("no track link found for {0}")]
    LinkNotFound(String),

    /// Invalid or unexpected response from a collaborator
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
