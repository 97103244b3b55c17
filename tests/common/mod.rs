//! Hand-rolled mock collaborators with call recording.
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use zone_presence_bridge::clients::{
    Credential, ImageFit, ImageHost, MediaSource, MetadataSearch, PresenceClient,
    PresenceConnector, TrackCandidate, UploadedImage,
};
use zone_presence_bridge::{
    Activity, BridgeError, MediaConnectMode, NowPlaying, PlaybackState, PresenceHandle, Result,
    TwoLine, ZoneSnapshot,
};

/// Media source backed by an in-memory key→bytes map
#[derive(Default)]
pub struct MockMedia {
    pub images: Mutex<HashMap<String, Vec<u8>>>,
    pub fetch_calls: AtomicUsize,
    pub connect_calls: AtomicUsize,
}

impl MockMedia {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_image(self: &Arc<Self>, key: &str, bytes: &[u8]) -> Arc<Self> {
        self.images
            .lock()
            .unwrap()
            .insert(key.to_string(), bytes.to_vec());
        self.clone()
    }
}

#[async_trait]
impl MediaSource for MockMedia {
    async fn connect(&self, _mode: &MediaConnectMode) -> Result<()> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn fetch_image(&self, image_key: &str, _fit: ImageFit) -> Result<Vec<u8>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.images
            .lock()
            .unwrap()
            .get(image_key)
            .cloned()
            .ok_or_else(|| BridgeError::ImageFetch(image_key.to_string()))
    }
}

/// Image host assigning sequential URLs and deletion handles
#[derive(Default)]
pub struct MockHost {
    pub uploads: AtomicUsize,
    pub deleted: Mutex<Vec<String>>,
    pub fail_uploads: AtomicBool,
}

impl MockHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl ImageHost for MockHost {
    async fn upload(&self, _path: &Path) -> Result<UploadedImage> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(BridgeError::Upload("mock upload failure".into()));
        }
        let n = self.uploads.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(UploadedImage {
            url: format!("https://img.example/{n}"),
            delete_handle: format!("del-{n}"),
        })
    }

    async fn delete(&self, delete_handle: &str) -> Result<()> {
        self.deleted.lock().unwrap().push(delete_handle.to_string());
        Ok(())
    }
}

/// Search service answering from a query→candidates table
#[derive(Default)]
pub struct MockSearch {
    pub queries: Mutex<Vec<String>>,
    pub results: Mutex<HashMap<String, Vec<TrackCandidate>>>,
    pub expire_all: AtomicBool,
    pub refreshes: AtomicUsize,
}

impl MockSearch {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_result(self: &Arc<Self>, query: &str, url: &str) -> Arc<Self> {
        self.results.lock().unwrap().insert(
            query.to_string(),
            vec![TrackCandidate {
                external_url: Some(url.to_string()),
            }],
        );
        self.clone()
    }

    pub fn recorded_queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetadataSearch for MockSearch {
    async fn search_tracks(&self, query: &str) -> Result<Vec<TrackCandidate>> {
        self.queries.lock().unwrap().push(query.to_string());
        if self.expire_all.load(Ordering::SeqCst) {
            return Err(BridgeError::CredentialExpired);
        }
        Ok(self
            .results
            .lock()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_default())
    }

    async fn refresh_credential(&self) -> Result<Credential> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        Ok(Credential {
            token: "fresh-token".into(),
            expires_in_secs: 3600,
        })
    }
}

/// Presence client recording every emitted payload
#[derive(Default)]
pub struct MockPresenceClient {
    pub activities: Mutex<Vec<Activity>>,
    pub clears: AtomicUsize,
    pub live: AtomicBool,
    pub closed_notify: Notify,
    pub reject_login: AtomicBool,
}

impl MockPresenceClient {
    pub fn new() -> Arc<Self> {
        let client = Self::default();
        client.live.store(true, Ordering::SeqCst);
        Arc::new(client)
    }

    pub fn emitted(&self) -> Vec<Activity> {
        self.activities.lock().unwrap().clone()
    }
}

#[async_trait]
impl PresenceClient for MockPresenceClient {
    async fn login(&self, _client_id: &str) -> Result<()> {
        if self.reject_login.load(Ordering::SeqCst) {
            return Err(BridgeError::LoginFailed("mock login rejection".into()));
        }
        Ok(())
    }

    async fn set_activity(&self, activity: &Activity) -> Result<()> {
        self.activities.lock().unwrap().push(activity.clone());
        Ok(())
    }

    async fn clear_activity(&self) -> Result<()> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    async fn closed(&self) {
        self.closed_notify.notified().await;
    }

    async fn destroy(&self) {
        self.live.store(false, Ordering::SeqCst);
        self.closed_notify.notify_waiters();
    }
}

/// Connector handing out a fixed client
pub struct MockConnector {
    pub client: Arc<MockPresenceClient>,
    pub connects: AtomicUsize,
}

impl MockConnector {
    pub fn new(client: Arc<MockPresenceClient>) -> Arc<Self> {
        Arc::new(Self {
            client,
            connects: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl PresenceConnector for MockConnector {
    async fn connect(&self) -> Result<Arc<dyn PresenceClient>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(self.client.clone())
    }
}

/// A handle already holding a connected client
pub fn connected_handle(client: Arc<MockPresenceClient>) -> Arc<PresenceHandle> {
    let handle = PresenceHandle::new();
    handle.install(client);
    handle
}

pub fn zone(id: &str, name: &str, state: PlaybackState, now_playing: Option<NowPlaying>) -> ZoneSnapshot {
    ZoneSnapshot {
        zone_id: id.to_string(),
        display_name: name.to_string(),
        state,
        now_playing,
    }
}

pub fn now_playing(line1: &str, line2: &str, image_key: &str, artist_keys: &[&str]) -> NowPlaying {
    NowPlaying {
        two_line: TwoLine {
            line1: line1.to_string(),
            line2: line2.to_string(),
        },
        length: 240,
        seek_position: 30,
        image_key: image_key.to_string(),
        artist_image_keys: artist_keys.iter().map(|k| k.to_string()).collect(),
    }
}
