mod common;

use common::{now_playing, zone, MockConnector, MockHost, MockMedia, MockPresenceClient, MockSearch};
use std::collections::BTreeMap;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;
use zone_presence_bridge::{
    AppConfig, BridgeConfig, Collaborators, ConnectionState, ImageHostConfig, PlaybackState,
    PresenceBridge, PresenceConfig, SearchConfig, ZoneChange, ZoneEvent,
};

fn config(auto_shutdown_secs: Option<u64>) -> BridgeConfig {
    BridgeConfig {
        zone_id: None,
        app: AppConfig {
            auto_shutdown_secs,
            ..AppConfig::default()
        },
        presence: PresenceConfig {
            client_id: "client-id".into(),
        },
        image_host: ImageHostConfig {
            client_id: "host-id".into(),
        },
        search: SearchConfig {
            client_id: "search-id".into(),
            client_secret: "secret".into(),
        },
    }
}

#[tokio::test(start_paused = true)]
async fn bridge_connects_bootstraps_and_publishes() {
    let media = MockMedia::new();
    let client = MockPresenceClient::new();
    let collaborators = Collaborators {
        media: media.clone(),
        presence: MockConnector::new(client.clone()),
        image_host: MockHost::new(),
        search: MockSearch::new(),
    };

    let bridge = PresenceBridge::new(&config(None), collaborators);
    let handle = bridge.presence_handle();
    let (tx, rx) = mpsc::channel(8);
    let task = tokio::spawn(bridge.run(rx));

    sleep(Duration::from_millis(10)).await;
    assert_eq!(handle.state(), ConnectionState::Connected);
    assert_eq!(media.connect_calls.load(Ordering::SeqCst), 1);

    let snapshot = zone(
        "z1",
        "Study",
        PlaybackState::Playing,
        Some(now_playing("Song", "Artist", "", &[])),
    );
    let zones: BTreeMap<_, _> = [("z1".to_string(), snapshot)].into();
    tx.send(ZoneChange {
        event: ZoneEvent::Updated,
        zones,
    })
    .await
    .unwrap();

    sleep(Duration::from_millis(10)).await;
    assert_eq!(client.emitted().len(), 1);

    // closing the zone channel shuts the bridge down
    drop(tx);
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn auto_shutdown_timer_ends_the_run() {
    let client = MockPresenceClient::new();
    let collaborators = Collaborators {
        media: MockMedia::new(),
        presence: MockConnector::new(client.clone()),
        image_host: MockHost::new(),
        search: MockSearch::new(),
    };

    let bridge = PresenceBridge::new(&config(Some(1)), collaborators);
    let (_tx, rx) = mpsc::channel::<ZoneChange>(8);
    let task = tokio::spawn(bridge.run(rx));

    sleep(Duration::from_secs(2)).await;
    assert!(task.is_finished());
}
