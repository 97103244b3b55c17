use crate::publisher::PresencePublisher;
use crate::types::{ZoneId, ZoneSnapshot};
use std::collections::BTreeMap;
use tokio::sync::mpsc;

/// One change notification from the media source
///
/// Carries the event together with the full zone map at the instant of the
/// change, so the tracker always selects against current state.
#[derive(Debug, Clone)]
pub struct ZoneChange {
    pub event: ZoneEvent,
    pub zones: BTreeMap<ZoneId, ZoneSnapshot>,
}

/// What changed
#[derive(Debug, Clone)]
pub enum ZoneEvent {
    /// Zones disappeared from the source
    ZonesRemoved(Vec<ZoneId>),
    /// Zone state transitions, e.g. another zone started playing
    ZonesChanged(Vec<ZoneSnapshot>),
    /// Something about the active zone moved (seek position, metadata)
    Updated,
}

/// Follows the single active zone across change events
///
/// At most one zone is tracked at a time. An operator-pinned zone wins
/// permanently; otherwise the tracker prefers a just-changed zone over the
/// previous one, and only follows a zone while it keeps playing.
pub struct ZoneTracker {
    publisher: PresencePublisher,
    pinned: Option<ZoneId>,
    active: Option<ZoneId>,
    next_candidate: Option<ZoneId>,
}

impl ZoneTracker {
    pub fn new(publisher: PresencePublisher, pinned: Option<ZoneId>) -> Self {
        Self {
            publisher,
            pinned,
            active: None,
            next_candidate: None,
        }
    }

    /// The currently tracked zone, if any
    pub fn active_zone(&self) -> Option<&ZoneId> {
        self.active.as_ref()
    }

    /// Consume change events until the channel closes
    ///
    /// One event is fully handled, including its resolver calls, before the
    /// next is taken; publish failures are logged and do not stop the loop.
    pub async fn run(mut self, mut changes: mpsc::Receiver<ZoneChange>) {
        while let Some(change) = changes.recv().await {
            if let Err(e) = self.handle_change(&change).await {
                tracing::warn!("zone change handling failed: {e}");
            }
        }
        tracing::debug!("zone change channel closed");
    }

    /// Apply one change notification
    pub async fn handle_change(&mut self, change: &ZoneChange) -> crate::error::Result<()> {
        if let Some(pinned) = &self.pinned {
            self.active = Some(pinned.clone());
        }

        // prefer the recorded candidate, if it is actually playing now
        if self.active.is_none() {
            let promoted = self
                .next_candidate
                .as_ref()
                .filter(|id| change.zones.get(*id).is_some_and(ZoneSnapshot::is_playing))
                .cloned();
            if let Some(candidate) = promoted {
                tracing::info!(zone = %candidate, "promoting candidate zone");
                self.active = Some(candidate);
                self.next_candidate = None;
            }
        }

        // otherwise take the first playing zone in enumeration order
        if self.active.is_none() {
            match change.zones.values().find(|z| z.is_playing()) {
                Some(zone) => {
                    tracing::info!(zone = %zone.zone_id, name = %zone.display_name, "active zone changed");
                    self.active = Some(zone.zone_id.clone());
                }
                None => {
                    tracing::warn!("failed to find an active zone");
                    return Ok(());
                }
            }
        }

        match &change.event {
            ZoneEvent::ZonesRemoved(_) => {
                tracing::info!("zones removed, clearing presence");
                self.active = None;
                self.publisher.clear().await?;
            }
            ZoneEvent::ZonesChanged(snapshots) => {
                // not locked to a zone: follow the change even if the current
                // zone is still going; the last mover in the batch wins
                if self.pinned.is_none() {
                    for snapshot in snapshots {
                        if self.active.as_ref() != Some(&snapshot.zone_id) {
                            self.next_candidate = Some(snapshot.zone_id.clone());
                            self.active = Some(snapshot.zone_id.clone());
                        }
                    }
                }
            }
            ZoneEvent::Updated => {
                if let Some(snapshot) = self.active.as_ref().and_then(|id| change.zones.get(id)) {
                    self.publisher.publish(snapshot).await?;
                }
            }
        }

        // only follow a zone while it is actively playing
        if let Some(snapshot) = self.active.as_ref().and_then(|id| change.zones.get(id)) {
            if !snapshot.is_playing() {
                tracing::info!(zone = %snapshot.zone_id, "active zone stopped, resetting");
                self.active = None;
                self.publisher.clear().await?;
            }
        }

        Ok(())
    }
}
