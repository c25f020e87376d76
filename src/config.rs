//! Persistent driver configuration
//!
//! Stored as TOML at `~/.config/portal/config.toml`. Missing fields take
//! their defaults; a missing file is the default config.

use std::path::{Path, PathBuf};
use std::time::Duration;

use portal_transport::protocol::{device, timing};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::handshake::HandshakePolicy;
use crate::session::SessionConfig;

/// Errors loading or saving the config file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// HID-level settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConfig {
    #[serde(default = "default_vendor_id")]
    pub vendor_id: u16,
    #[serde(default = "default_product_id")]
    pub product_id: u16,
    /// Per-read timeout; a read that times out counts as "no ack"
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: i32,
}

fn default_vendor_id() -> u16 {
    device::VENDOR_ID
}

fn default_product_id() -> u16 {
    device::PRODUCT_ID
}

fn default_read_timeout_ms() -> i32 {
    timing::DEFAULT_READ_TIMEOUT_MS
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            vendor_id: default_vendor_id(),
            product_id: default_product_id(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

/// Handshake retry bounds (0 = no limit)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakeConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,
}

fn default_max_attempts() -> u32 {
    HandshakePolicy::DEFAULT_MAX_ATTEMPTS
}

fn default_deadline_ms() -> u64 {
    HandshakePolicy::DEFAULT_DEADLINE.as_millis() as u64
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            deadline_ms: default_deadline_ms(),
        }
    }
}

impl HandshakeConfig {
    pub fn policy(&self) -> HandshakePolicy {
        HandshakePolicy {
            max_attempts: (self.max_attempts > 0).then_some(self.max_attempts),
            deadline: (self.deadline_ms > 0).then(|| Duration::from_millis(self.deadline_ms)),
        }
    }
}

/// Complete driver configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalConfig {
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub handshake: HandshakeConfig,
}

impl PortalConfig {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("portal")
            .join("config.toml")
    }

    /// Load config from a file, or return default if not found
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Save config to a file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source: std::io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(io_err)
    }

    pub fn handshake_policy(&self) -> HandshakePolicy {
        self.handshake.policy()
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            vendor_id: self.transport.vendor_id,
            product_id: self.transport.product_id,
            handshake: self.handshake_policy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("portal-config-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_defaults() {
        let config = PortalConfig::default();
        assert_eq!(config.transport.vendor_id, 0x1430);
        assert_eq!(config.transport.product_id, 0x0150);
        assert_eq!(config.transport.read_timeout_ms, 500);
        assert_eq!(config.handshake_policy(), HandshakePolicy::default());
        assert_eq!(config.session_config(), SessionConfig::default());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = PortalConfig::load(&temp_path("does-not-exist.toml")).unwrap();
        assert_eq!(config, PortalConfig::default());
    }

    #[test]
    fn test_partial_file() {
        let config: PortalConfig = toml::from_str(
            r#"
            [handshake]
            max_attempts = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.handshake.max_attempts, 10);
        assert_eq!(config.handshake.deadline_ms, 5000);
        assert_eq!(config.transport, TransportConfig::default());
    }

    #[test]
    fn test_zero_means_unbounded() {
        let handshake = HandshakeConfig {
            max_attempts: 0,
            deadline_ms: 0,
        };
        assert!(handshake.policy().is_unbounded());

        let handshake = HandshakeConfig {
            max_attempts: 0,
            deadline_ms: 250,
        };
        assert_eq!(
            handshake.policy(),
            HandshakePolicy::deadline(Duration::from_millis(250))
        );
    }

    #[test]
    fn test_invalid_toml() {
        let err = toml::from_str::<PortalConfig>("[transport]\nvendor_id = \"x\"").unwrap_err();
        assert!(ConfigError::from(err).to_string().starts_with("Invalid config"));
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("roundtrip/config.toml");
        let mut config = PortalConfig::default();
        config.transport.read_timeout_ms = 100;
        config.handshake.max_attempts = 0;

        config.save(&path).unwrap();
        let loaded = PortalConfig::load(&path).unwrap();
        assert_eq!(loaded, config);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
