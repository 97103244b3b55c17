use crate::error::Result;
use crate::types::ZoneId;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// How the media-source connection is established
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaConnectMode {
    /// Locate the media core via network discovery
    Discovery,
    /// Connect directly to a known core address
    Direct { host: String, port: u16 },
}

/// Bridge configuration, loaded from a JSON file
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    /// Operator-pinned zone id; disables automatic zone selection permanently
    #[serde(default)]
    pub zone_id: Option<ZoneId>,

    #[serde(default)]
    pub app: AppConfig,

    pub presence: PresenceConfig,
    pub image_host: ImageHostConfig,
    pub search: SearchConfig,
}

/// Process-level tunables
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Locate the media core via discovery instead of a direct address
    #[serde(default = "default_true")]
    pub use_discovery: bool,

    /// Core address for direct connection mode
    #[serde(default)]
    pub core_host: Option<String>,

    #[serde(default = "default_core_port")]
    pub core_port: u16,

    /// Exit the process after this many seconds, unconditionally
    #[serde(default)]
    pub auto_shutdown_secs: Option<u64>,

    /// Minimum seconds between two emitted presence updates
    #[serde(default = "default_publish_interval")]
    pub min_publish_interval_secs: u64,

    #[serde(default = "default_cache_limit")]
    pub link_cache_limit: usize,

    #[serde(default = "default_cache_limit")]
    pub image_cache_limit: usize,
}

/// Presence-channel application credentials
#[derive(Debug, Clone, Deserialize)]
pub struct PresenceConfig {
    pub client_id: String,
}

/// Image-host application credentials
#[derive(Debug, Clone, Deserialize)]
pub struct ImageHostConfig {
    pub client_id: String,
}

/// Metadata-search service credentials
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub client_id: String,
    pub client_secret: String,
}

fn default_true() -> bool {
    true
}

fn default_core_port() -> u16 {
    9100
}

fn default_publish_interval() -> u64 {
    10
}

fn default_cache_limit() -> usize {
    8
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            use_discovery: true,
            core_host: None,
            core_port: default_core_port(),
            auto_shutdown_secs: None,
            min_publish_interval_secs: default_publish_interval(),
            link_cache_limit: default_cache_limit(),
            image_cache_limit: default_cache_limit(),
        }
    }
}

impl BridgeConfig {
    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Media-source connection mode derived from the app section
    ///
    /// Falls back to discovery when direct mode is requested without a host.
    pub fn media_connect_mode(&self) -> MediaConnectMode {
        if !self.app.use_discovery {
            if let Some(host) = &self.app.core_host {
                return MediaConnectMode::Direct {
                    host: host.clone(),
                    port: self.app.core_port,
                };
            }
        }
        MediaConnectMode::Discovery
    }

    /// Minimum interval between two emitted presence updates
    pub fn min_publish_interval(&self) -> Duration {
        Duration::from_secs(self.app.min_publish_interval_secs)
    }

    /// Auto-shutdown duration, if configured
    pub fn auto_shutdown(&self) -> Option<Duration> {
        self.app.auto_shutdown_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_gets_defaults() {
        let cfg: BridgeConfig = serde_json::from_str(
            r#"{
                "presence":   { "client_id": "p" },
                "image_host": { "client_id": "i" },
                "search":     { "client_id": "s", "client_secret": "x" }
            }"#,
        )
        .unwrap();

        assert_eq!(cfg.zone_id, None);
        assert!(cfg.app.use_discovery);
        assert_eq!(cfg.app.min_publish_interval_secs, 10);
        assert_eq!(cfg.app.link_cache_limit, 8);
        assert_eq!(cfg.media_connect_mode(), MediaConnectMode::Discovery);
    }

    #[test]
    fn direct_mode_needs_a_host() {
        let cfg: BridgeConfig = serde_json::from_str(
            r#"{
                "app": { "use_discovery": false, "core_host": "192.168.1.50" },
                "presence":   { "client_id": "p" },
                "image_host": { "client_id": "i" },
                "search":     { "client_id": "s", "client_secret": "x" }
            }"#,
        )
        .unwrap();

        assert_eq!(
            cfg.media_connect_mode(),
            MediaConnectMode::Direct {
                host: "192.168.1.50".into(),
                port: 9100
            }
        );
    }
}
