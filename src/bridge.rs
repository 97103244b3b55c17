use crate::artwork::ArtworkResolver;
use crate::clients::{ImageHost, MediaSource, MetadataSearch, PresenceConnector};
use crate::config::BridgeConfig;
use crate::links::LinkResolver;
use crate::publisher::PresencePublisher;
use crate::supervisor::{ConnectionSupervisor, PresenceHandle};
use crate::tracker::{ZoneChange, ZoneTracker};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;

/// The four external clients the bridge drives
#[derive(Clone)]
pub struct Collaborators {
    pub media: Arc<dyn MediaSource>,
    pub presence: Arc<dyn PresenceConnector>,
    pub image_host: Arc<dyn ImageHost>,
    pub search: Arc<dyn MetadataSearch>,
}

/// Composition root: wires the caches, resolvers, publisher, tracker and
/// connection supervisor from one configuration
///
/// Constructed once at process start; all shared state lives in the
/// components built here, none of it in statics.
pub struct PresenceBridge {
    tracker: ZoneTracker,
    supervisor: ConnectionSupervisor,
    handle: Arc<PresenceHandle>,
    auto_shutdown: Option<Duration>,
}

impl PresenceBridge {
    pub fn new(config: &BridgeConfig, collaborators: Collaborators) -> Self {
        let handle = PresenceHandle::new();

        let artwork = ArtworkResolver::new(
            collaborators.media.clone(),
            collaborators.image_host.clone(),
            config.app.image_cache_limit,
        );
        let links = LinkResolver::new(collaborators.search.clone(), config.app.link_cache_limit);
        let publisher = PresencePublisher::new(
            handle.clone(),
            artwork,
            links,
            config.min_publish_interval(),
        );
        let tracker = ZoneTracker::new(publisher, config.zone_id.clone());
        let supervisor = ConnectionSupervisor::new(
            collaborators.presence,
            collaborators.media,
            config.presence.client_id.clone(),
            config.media_connect_mode(),
            handle.clone(),
        );

        Self {
            tracker,
            supervisor,
            handle,
            auto_shutdown: config.auto_shutdown(),
        }
    }

    /// Shared view of the presence connection, for observing readiness
    pub fn presence_handle(&self) -> Arc<PresenceHandle> {
        self.handle.clone()
    }

    /// Run the bridge until the zone channel closes or auto-shutdown elapses
    ///
    /// The media-control collaborator feeds `zone_events`; the supervisor
    /// keeps the presence channel alive in the background.
    pub async fn run(self, zone_events: mpsc::Receiver<ZoneChange>) {
        let Self {
            tracker,
            supervisor,
            handle: _,
            auto_shutdown,
        } = self;

        let supervisor = tokio::spawn(supervisor.run());

        match auto_shutdown {
            Some(limit) => {
                tokio::select! {
                    _ = tracker.run(zone_events) => {}
                    _ = sleep(limit) => {
                        tracing::info!("auto-shutdown timer elapsed, exiting");
                    }
                }
            }
            None => tracker.run(zone_events).await,
        }

        supervisor.abort();
    }
}
