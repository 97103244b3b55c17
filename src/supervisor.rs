use crate::clients::{MediaSource, PresenceClient, PresenceConnector};
use crate::config::MediaConnectMode;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Fixed delay between reconnection attempts; no backoff, retries forever
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Presence-channel connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Shared view of the presence connection
///
/// The supervisor installs and clears the live client here; the publisher
/// reads it before every emission. State transitions are also published on a
/// watch channel for anything that wants to await readiness.
pub struct PresenceHandle {
    client: RwLock<Option<Arc<dyn PresenceClient>>>,
    state_tx: watch::Sender<ConnectionState>,
}

impl PresenceHandle {
    pub fn new() -> Arc<Self> {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Arc::new(Self {
            client: RwLock::new(None),
            state_tx,
        })
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    /// Watch connection state transitions
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// The live client, present only while connected
    pub fn client(&self) -> Option<Arc<dyn PresenceClient>> {
        if self.state() != ConnectionState::Connected {
            return None;
        }
        self.client.read().unwrap().clone()
    }

    /// Install a freshly authenticated client and mark the channel connected
    pub fn install(&self, client: Arc<dyn PresenceClient>) {
        *self.client.write().unwrap() = Some(client);
        self.state_tx.send_replace(ConnectionState::Connected);
    }

    /// Drop the current client, if any, and enter the given state
    pub fn take_client(&self, state: ConnectionState) -> Option<Arc<dyn PresenceClient>> {
        let client = self.client.write().unwrap().take();
        self.state_tx.send_replace(state);
        client
    }

    fn set_state(&self, state: ConnectionState) {
        self.state_tx.send_replace(state);
    }
}

#[derive(Debug)]
enum SupervisorEvent {
    /// A reconnection timer elapsed
    Reconnect,
    /// A connection's transport closed; the payload is its generation
    TransportClosed(u64),
}

/// Owns the presence-channel connection lifecycle
///
/// Connects, authenticates, schedules fixed-delay reconnection on any
/// failure, and bootstraps the media-source connection exactly once per
/// process lifetime, on the first successful login.
pub struct ConnectionSupervisor {
    connector: Arc<dyn PresenceConnector>,
    media: Arc<dyn MediaSource>,
    client_id: String,
    connect_mode: MediaConnectMode,
    handle: Arc<PresenceHandle>,
    reconnect_delay: Duration,
    media_bootstrapped: bool,
    /// Incremented per connection attempt; gates stale transport-close events
    generation: u64,
    pending_reconnect: Option<JoinHandle<()>>,
    events_tx: mpsc::UnboundedSender<SupervisorEvent>,
    events_rx: mpsc::UnboundedReceiver<SupervisorEvent>,
}

impl ConnectionSupervisor {
    pub fn new(
        connector: Arc<dyn PresenceConnector>,
        media: Arc<dyn MediaSource>,
        client_id: impl Into<String>,
        connect_mode: MediaConnectMode,
        handle: Arc<PresenceHandle>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            connector,
            media,
            client_id: client_id.into(),
            connect_mode,
            handle,
            reconnect_delay: RECONNECT_DELAY,
            media_bootstrapped: false,
            generation: 0,
            pending_reconnect: None,
            events_tx,
            events_rx,
        }
    }

    /// Drive the connection lifecycle until the event channel closes
    pub async fn run(mut self) {
        self.try_connect().await;
        while let Some(event) = self.events_rx.recv().await {
            match event {
                SupervisorEvent::Reconnect => self.try_connect().await,
                SupervisorEvent::TransportClosed(generation) => {
                    self.on_transport_closed(generation)
                }
            }
        }
    }

    async fn try_connect(&mut self) {
        tracing::info!("connecting to presence channel");

        if let Some(old) = self.handle.take_client(ConnectionState::Connecting) {
            if old.is_live() {
                old.destroy().await;
            }
        }
        self.generation += 1;

        let client = match self.connector.connect().await {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!("presence channel connect failed: {e}");
                self.handle.set_state(ConnectionState::Disconnected);
                self.schedule_reconnect();
                return;
            }
        };

        match client.login(&self.client_id).await {
            Ok(()) => self.on_ready(client).await,
            Err(e) => {
                tracing::warn!("presence channel login failed: {e}");
                self.handle.set_state(ConnectionState::Disconnected);
                self.schedule_reconnect();
            }
        }
    }

    async fn on_ready(&mut self, client: Arc<dyn PresenceClient>) {
        tracing::info!("presence channel ready");
        if let Some(pending) = self.pending_reconnect.take() {
            pending.abort();
        }
        self.handle.install(client.clone());

        let generation = self.generation;
        let events_tx = self.events_tx.clone();
        tokio::spawn(async move {
            client.closed().await;
            let _ = events_tx.send(SupervisorEvent::TransportClosed(generation));
        });

        if !self.media_bootstrapped {
            tracing::info!(mode = ?self.connect_mode, "bootstrapping media-source connection");
            if let Err(e) = self.media.connect(&self.connect_mode).await {
                tracing::warn!("media-source connect failed: {e}");
            }
            self.media_bootstrapped = true;
        }
    }

    fn on_transport_closed(&mut self, generation: u64) {
        if generation != self.generation {
            tracing::debug!("ignoring close from a torn-down connection");
            return;
        }
        tracing::info!("presence channel disconnected");
        self.handle.take_client(ConnectionState::Disconnected);
        self.schedule_reconnect();
    }

    /// Arm the reconnection timer, replacing any pending one
    fn schedule_reconnect(&mut self) {
        if let Some(pending) = self.pending_reconnect.take() {
            pending.abort();
        }
        let delay = self.reconnect_delay;
        let events_tx = self.events_tx.clone();
        self.pending_reconnect = Some(tokio::spawn(async move {
            sleep(delay).await;
            let _ = events_tx.send(SupervisorEvent::Reconnect);
        }));
    }
}
