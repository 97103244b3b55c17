use serde::{Deserialize, Serialize};

/// Zone identifier (opaque, minted by the media source)
pub type ZoneId = String;

/// Artwork identifier (opaque, minted by the media source)
pub type ImageKey = String;

/// Playback state of a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Stopped,
    Paused,
    Loading,
    Playing,
}

/// Two display lines describing the current track
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TwoLine {
    /// Primary line (track title)
    #[serde(default)]
    pub line1: String,

    /// Secondary line (artist)
    #[serde(default)]
    pub line2: String,
}

/// Now-playing metadata for a zone in the playing or paused state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NowPlaying {
    #[serde(default)]
    pub two_line: TwoLine,

    /// Total track duration in seconds
    #[serde(default)]
    pub length: u64,

    /// Elapsed position in seconds
    #[serde(default)]
    pub seek_position: u64,

    /// Artwork key for the track cover
    #[serde(default)]
    pub image_key: ImageKey,

    /// Artwork keys for the performing artists, in display order
    #[serde(default)]
    pub artist_image_keys: Vec<ImageKey>,
}

/// One media-playback zone at an instant
///
/// Produced by the media-control collaborator and superseded wholesale on
/// each change event; the core never mutates a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneSnapshot {
    pub zone_id: ZoneId,
    pub display_name: String,
    pub state: PlaybackState,
    #[serde(default)]
    pub now_playing: Option<NowPlaying>,
}

impl ZoneSnapshot {
    /// Whether the zone is actively playing
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }
}

/// Composite key identifying a track-link lookup
///
/// Kept as explicit fields rather than a pre-concatenated string so the key
/// derivation and the search relaxations stay independently testable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackKey {
    pub title: String,
    pub artist: String,
    pub album: String,
}

impl TrackKey {
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        album: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            album: album.into(),
        }
    }

    /// Cache key for this lookup: the concatenation of all three fields
    ///
    /// An empty result means there is nothing to resolve; callers must not
    /// query the cache with it.
    pub fn cache_key(&self) -> String {
        format!("{}{}{}", self.title, self.artist, self.album)
    }
}

/// Presence payload emitted to the display channel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub details: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_timestamp: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_timestamp: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub large_image_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub large_image_text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub small_image_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub small_image_text: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<ActivityButton>,
}

/// Clickable link element attached to a presence payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityButton {
    pub label: String,
    pub url: String,
}
