//! Contracts for the external collaborators the core drives.
//!
//! The bridge never talks to a wire itself; the media-control protocol, the
//! presence IPC channel, the image host, and the metadata-search service are
//! all reached through these traits, injected once at construction.

use crate::config::MediaConnectMode;
use crate::error::Result;
use crate::types::Activity;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

/// Scale hint for artwork fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageFit {
    pub width: u32,
    pub height: u32,
}

/// Fixed fetch size used for presence artwork
pub const ARTWORK_FIT: ImageFit = ImageFit {
    width: 200,
    height: 200,
};

/// Media-control client: connection bootstrap and artwork bytes
///
/// Zone change events are delivered separately, as a [`ZoneChange`] channel
/// fed by the collaborator (see [`ZoneTracker::run`]).
///
/// [`ZoneChange`]: crate::tracker::ZoneChange
/// [`ZoneTracker::run`]: crate::tracker::ZoneTracker::run
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Establish the media-source connection, via discovery or a direct address
    async fn connect(&self, mode: &MediaConnectMode) -> Result<()>;

    /// Fetch raw artwork bytes for an image key, scaled to fit the hint
    async fn fetch_image(&self, image_key: &str, fit: ImageFit) -> Result<Vec<u8>>;
}

/// Factory for presence-channel connections
///
/// The supervisor constructs a fresh connection per attempt; a connection is
/// never reused across reconnect cycles.
#[async_trait]
pub trait PresenceConnector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn PresenceClient>>;
}

/// One presence-channel connection
#[async_trait]
pub trait PresenceClient: Send + Sync {
    /// Authenticate; resolves once the channel signals ready
    async fn login(&self, client_id: &str) -> Result<()>;

    /// Replace the displayed presence
    async fn set_activity(&self, activity: &Activity) -> Result<()>;

    /// Clear the displayed presence entirely
    async fn clear_activity(&self) -> Result<()>;

    /// Whether the underlying transport still appears live
    fn is_live(&self) -> bool;

    /// Resolves when the transport closes
    async fn closed(&self);

    /// Tear the connection down
    async fn destroy(&self);
}

/// A hosted image, as returned by an upload
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedImage {
    pub url: String,
    /// Handle for deleting the upload later
    pub delete_handle: String,
}

/// Image-host client: anonymous upload and deletion
#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(&self, path: &Path) -> Result<UploadedImage>;
    async fn delete(&self, delete_handle: &str) -> Result<()>;
}

/// One search candidate
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackCandidate {
    /// Externally shareable link for the track, when the service exposes one
    #[serde(default)]
    pub external_url: Option<String>,
}

/// A refreshed service credential
#[derive(Debug, Clone, Deserialize)]
pub struct Credential {
    pub token: String,
    pub expires_in_secs: u64,
}

/// Metadata-search client
#[async_trait]
pub trait MetadataSearch: Send + Sync {
    /// Run a track search; the query string is pre-built by the resolver
    async fn search_tracks(&self, query: &str) -> Result<Vec<TrackCandidate>>;

    /// Obtain a fresh credential; the client applies the token itself
    async fn refresh_credential(&self) -> Result<Credential>;
}
