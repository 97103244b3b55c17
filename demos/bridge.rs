//! Runs the bridge against stub collaborators and a scripted pair of zones.
//!
//! Real deployments replace the stubs with clients for their media-control
//! source, presence channel, image host and search service.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use zone_presence_bridge::clients::{
    Credential, ImageFit, ImageHost, MediaSource, MetadataSearch, PresenceClient,
    PresenceConnector, TrackCandidate, UploadedImage,
};
use zone_presence_bridge::{
    Activity, AppConfig, BridgeConfig, Collaborators, ImageHostConfig, MediaConnectMode,
    NowPlaying, PlaybackState, PresenceBridge, PresenceConfig, Result, SearchConfig, TwoLine,
    ZoneChange, ZoneEvent, ZoneSnapshot,
};

struct StubMedia;

#[async_trait]
impl MediaSource for StubMedia {
    async fn connect(&self, mode: &MediaConnectMode) -> Result<()> {
        tracing::info!(?mode, "stub media source connected");
        Ok(())
    }

    async fn fetch_image(&self, image_key: &str, _fit: ImageFit) -> Result<Vec<u8>> {
        Ok(format!("fake image bytes for {image_key}").into_bytes())
    }
}

struct StubHost;

#[async_trait]
impl ImageHost for StubHost {
    async fn upload(&self, _path: &Path) -> Result<UploadedImage> {
        Ok(UploadedImage {
            url: "https://img.example/demo".into(),
            delete_handle: "demo-delete".into(),
        })
    }

    async fn delete(&self, delete_handle: &str) -> Result<()> {
        tracing::info!(delete_handle, "stub host deleted upload");
        Ok(())
    }
}

struct StubSearch;

#[async_trait]
impl MetadataSearch for StubSearch {
    async fn search_tracks(&self, query: &str) -> Result<Vec<TrackCandidate>> {
        tracing::info!(query, "stub search");
        Ok(vec![TrackCandidate {
            external_url: Some("https://tracks.example/demo".into()),
        }])
    }

    async fn refresh_credential(&self) -> Result<Credential> {
        Ok(Credential {
            token: "demo-token".into(),
            expires_in_secs: 3600,
        })
    }
}

struct StubPresence;

#[async_trait]
impl PresenceClient for StubPresence {
    async fn login(&self, client_id: &str) -> Result<()> {
        tracing::info!(client_id, "stub presence channel ready");
        Ok(())
    }

    async fn set_activity(&self, activity: &Activity) -> Result<()> {
        tracing::info!(details = %activity.details, "presence updated");
        Ok(())
    }

    async fn clear_activity(&self) -> Result<()> {
        tracing::info!("presence cleared");
        Ok(())
    }

    fn is_live(&self) -> bool {
        true
    }

    async fn closed(&self) {
        std::future::pending().await
    }

    async fn destroy(&self) {}
}

struct StubConnector;

#[async_trait]
impl PresenceConnector for StubConnector {
    async fn connect(&self) -> Result<Arc<dyn PresenceClient>> {
        Ok(Arc::new(StubPresence))
    }
}

fn snapshot(id: &str, name: &str, state: PlaybackState, title: &str) -> ZoneSnapshot {
    ZoneSnapshot {
        zone_id: id.into(),
        display_name: name.into(),
        state,
        now_playing: Some(NowPlaying {
            two_line: TwoLine {
                line1: title.into(),
                line2: "Demo Artist".into(),
            },
            length: 240,
            seek_position: 12,
            image_key: format!("{id}-art"),
            artist_image_keys: vec![],
        }),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = BridgeConfig {
        zone_id: None,
        app: AppConfig {
            auto_shutdown_secs: Some(10),
            ..AppConfig::default()
        },
        presence: PresenceConfig {
            client_id: "demo-client".into(),
        },
        image_host: ImageHostConfig {
            client_id: "demo-host".into(),
        },
        search: SearchConfig {
            client_id: "demo-search".into(),
            client_secret: "demo-secret".into(),
        },
    };

    let bridge = PresenceBridge::new(
        &config,
        Collaborators {
            media: Arc::new(StubMedia),
            presence: Arc::new(StubConnector),
            image_host: Arc::new(StubHost),
            search: Arc::new(StubSearch),
        },
    );

    let (tx, rx) = mpsc::channel(16);

    // script a zone starting to play, then another taking over
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;

        let study = snapshot("z1", "Study", PlaybackState::Playing, "First Track");
        let kitchen = snapshot("z2", "Kitchen", PlaybackState::Playing, "Second Track");
        let zones: BTreeMap<_, _> = [
            ("z1".to_string(), study),
            ("z2".to_string(), kitchen.clone()),
        ]
        .into();

        let _ = tx
            .send(ZoneChange {
                event: ZoneEvent::Updated,
                zones: zones.clone(),
            })
            .await;

        tokio::time::sleep(Duration::from_secs(2)).await;
        let _ = tx
            .send(ZoneChange {
                event: ZoneEvent::ZonesChanged(vec![kitchen]),
                zones,
            })
            .await;
    });

    bridge.run(rx).await;
    tracing::info!("demo finished");
}
