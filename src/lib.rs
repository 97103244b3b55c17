//! Rust library for publishing media-zone now-playing state to a presence
//! display channel
//!
//! This library implements the coordination core of a now-playing bridge: it
//! follows the single active playback zone of a media-control source and
//! mirrors it onto a presence channel, resolving artwork and track links
//! through bounded caches along the way. It supports:
//!
//! - Active-zone selection with operator pinning and follow-the-mover policy
//! - Rate-limited, text-normalized presence payloads with clickable track links
//! - Artwork resolution via fetch → host upload, memoized with bounded
//!   eviction that deletes the displaced remote upload
//! - Fallback-chained track-link search with credential refresh
//! - Presence-channel reconnection at a fixed interval, with a one-time
//!   media-source bootstrap on first login
//!
//! The wire clients themselves (media-control protocol, presence IPC, image
//! host, metadata search) are injected behind the traits in [`clients`]; the
//! library contains no transport code.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use tokio::sync::mpsc;
//! use zone_presence_bridge::{BridgeConfig, Collaborators, PresenceBridge};
//! # use zone_presence_bridge::clients::{MediaSource, PresenceConnector, ImageHost, MetadataSearch};
//! # fn wire_clients() -> (Arc<dyn MediaSource>, Arc<dyn PresenceConnector>, Arc<dyn ImageHost>, Arc<dyn MetadataSearch>) { unimplemented!() }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BridgeConfig::load("config.json")?;
//!     let (media, presence, image_host, search) = wire_clients();
//!
//!     let bridge = PresenceBridge::new(
//!         &config,
//!         Collaborators { media, presence, image_host, search },
//!     );
//!
//!     // The media-control client pushes zone change events into this channel.
//!     let (_zone_tx, zone_rx) = mpsc::channel(64);
//!     bridge.run(zone_rx).await;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! The library is organized into several layers:
//!
//! - **Bridge**: composition root wiring everything from one configuration
//! - **Tracker**: active-zone selection over the ordered change-event stream
//! - **Publisher**: payload construction, rate limiting, concurrent resolution
//! - **Resolvers**: artwork and track-link resolution over bounded caches
//! - **Supervisor**: presence-channel lifecycle and reconnection
//! - **Clients**: contracts for the injected external collaborators

mod artwork;
mod bridge;
mod cache;
pub mod clients;
mod config;
mod error;
mod links;
mod publisher;
mod supervisor;
mod tracker;
mod types;

// Public exports
pub use artwork::ArtworkResolver;
pub use bridge::{Collaborators, PresenceBridge};
pub use cache::{CachedResult, ResultCache};
pub use config::{
    AppConfig, BridgeConfig, ImageHostConfig, MediaConnectMode, PresenceConfig, SearchConfig,
};
pub use error::{BridgeError, Result};
pub use links::{relaxation_ladder, LinkResolver, SearchQuery};
pub use publisher::{PresencePublisher, DEFAULT_LARGE_IMAGE, DEFAULT_SMALL_IMAGE};
pub use supervisor::{ConnectionState, ConnectionSupervisor, PresenceHandle};
pub use tracker::{ZoneChange, ZoneEvent, ZoneTracker};
pub use types::{
    Activity, ActivityButton, ImageKey, NowPlaying, PlaybackState, TrackKey, TwoLine, ZoneId,
    ZoneSnapshot,
};
