use crate::artwork::ArtworkResolver;
use crate::clients::PresenceClient;
use crate::error::Result;
use crate::links::LinkResolver;
use crate::supervisor::PresenceHandle;
use crate::types::{Activity, ActivityButton, PlaybackState, TrackKey, ZoneSnapshot};
use futures_util::future;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::Instant;

/// Shown when a display line is empty
const PLACEHOLDER: &str = "--";

/// Character cap for the details and artist fields
const TEXT_LIMIT: usize = 128;

/// Character cap for a button label, prefix included
const BUTTON_LABEL_LIMIT: usize = 32;

const BUTTON_LABEL_PREFIX: &str = "Listen: ";

/// Fallback asset identifiers registered with the presence application
pub const DEFAULT_LARGE_IMAGE: &str = "bridge-main";
pub const DEFAULT_SMALL_IMAGE: &str = "bridge-small";

/// Builds and emits presence payloads for zone snapshots
///
/// Applies the outbound rate limit, normalizes display text, resolves artwork
/// and track links concurrently, and falls back to default artwork when
/// resolution fails. Emission is a silent no-op while the presence channel is
/// down.
pub struct PresencePublisher {
    handle: Arc<PresenceHandle>,
    artwork: ArtworkResolver,
    links: LinkResolver,
    min_interval: Duration,
    last_sent: Option<Instant>,
}

impl PresencePublisher {
    pub fn new(
        handle: Arc<PresenceHandle>,
        artwork: ArtworkResolver,
        links: LinkResolver,
        min_interval: Duration,
    ) -> Self {
        Self {
            handle,
            artwork,
            links,
            min_interval,
            last_sent: None,
        }
    }

    /// Emit the presence for a zone snapshot
    ///
    /// Stopped and paused clear the display; loading shows a fixed banner
    /// bypassing the rate limit; playing runs the full pipeline.
    pub async fn publish(&mut self, zone: &ZoneSnapshot) -> Result<()> {
        let Some(client) = self.handle.client() else {
            tracing::trace!("presence channel not connected, skipping publish");
            return Ok(());
        };

        match zone.state {
            PlaybackState::Stopped | PlaybackState::Paused => client.clear_activity().await,
            PlaybackState::Loading => {
                client
                    .set_activity(&loading_activity(&zone.display_name))
                    .await
            }
            PlaybackState::Playing => self.publish_playing(client, zone).await,
        }
    }

    /// Clear the displayed presence, if connected
    pub async fn clear(&mut self) -> Result<()> {
        match self.handle.client() {
            Some(client) => client.clear_activity().await,
            None => Ok(()),
        }
    }

    async fn publish_playing(
        &mut self,
        client: Arc<dyn PresenceClient>,
        zone: &ZoneSnapshot,
    ) -> Result<()> {
        let Some(np) = zone.now_playing.as_ref() else {
            tracing::warn!(zone = %zone.display_name, "playing zone without now-playing metadata");
            return Ok(());
        };

        if let Some(last) = self.last_sent {
            if last.elapsed() < self.min_interval {
                tracing::trace!("inside rate-limit window, dropping update");
                return Ok(());
            }
        }
        self.last_sent = Some(Instant::now());

        let start = unix_now().saturating_sub(np.seek_position);
        let end = start.saturating_add(np.length);

        let mut artist = truncate_chars(&np.two_line.line2, TEXT_LIMIT);
        if artist.is_empty() {
            artist = PLACEHOLDER.to_string();
        }
        let mut details = truncate_chars(&np.two_line.line1, TEXT_LIMIT);
        let mut details_short = truncate_chars(
            &np.two_line.line1,
            BUTTON_LABEL_LIMIT - BUTTON_LABEL_PREFIX.chars().count(),
        );
        if details.is_empty() {
            details = PLACEHOLDER.to_string();
            details_short = PLACEHOLDER.to_string();
        }

        let artist_key = np
            .artist_image_keys
            .first()
            .map(String::as_str)
            .unwrap_or("");
        let track = TrackKey::new(details.clone(), artist.clone(), "");

        let (large, small, link) = future::join3(
            self.artwork.resolve(&np.image_key),
            self.artwork.resolve(artist_key),
            self.links.resolve(&track),
        )
        .await;

        let zone_caption = format!("Zone: {}", zone.display_name);
        let activity = match (large, small, link) {
            (Ok(large), Ok(small), Ok(link)) => {
                let mut activity = Activity {
                    details,
                    state: Some(artist.clone()),
                    start_timestamp: Some(start),
                    end_timestamp: Some(end),
                    large_image_key: non_empty(large),
                    large_image_text: Some(zone_caption),
                    small_image_key: non_empty(small),
                    small_image_text: Some(artist),
                    buttons: Vec::new(),
                };
                if !link.is_empty() {
                    activity.buttons.push(ActivityButton {
                        label: format!("{BUTTON_LABEL_PREFIX}{details_short}"),
                        url: link,
                    });
                }
                activity
            }
            (large, small, link) => {
                let cause = large.err().or(small.err()).or(link.err());
                tracing::warn!(
                    "presence resolution failed, falling back to default artwork: {}",
                    cause.map(|e| e.to_string()).unwrap_or_default()
                );
                Activity {
                    details,
                    state: Some(artist.clone()),
                    start_timestamp: Some(start),
                    end_timestamp: Some(end),
                    large_image_key: Some(DEFAULT_LARGE_IMAGE.to_string()),
                    large_image_text: Some(zone_caption),
                    small_image_key: Some(DEFAULT_LARGE_IMAGE.to_string()),
                    small_image_text: Some(artist),
                    buttons: Vec::new(),
                }
            }
        };

        client.set_activity(&activity).await
    }
}

fn loading_activity(zone_name: &str) -> Activity {
    Activity {
        details: "Loading...".to_string(),
        large_image_key: Some(DEFAULT_LARGE_IMAGE.to_string()),
        large_image_text: Some(format!("Zone: {zone_name}")),
        small_image_key: Some(DEFAULT_SMALL_IMAGE.to_string()),
        ..Activity::default()
    }
}

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
