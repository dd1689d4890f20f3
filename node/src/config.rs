//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use agt_store_lmdb::environment::DEFAULT_MAP_SIZE;
use agt_types::ArenaParams;

use crate::{LogFormat, NodeError};

/// Where the node keeps its state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// LMDB environment under `data_dir`.
    Lmdb,
    /// Process memory; everything is lost on exit. For demos and tests.
    Memory,
}

impl FromStr for StorageBackend {
    type Err = NodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lmdb" => Ok(Self::Lmdb),
            "memory" | "mem" => Ok(Self::Memory),
            other => Err(NodeError::Config(format!("unknown storage backend: {other}"))),
        }
    }
}

/// Configuration for an arena node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Data directory for LMDB storage.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_storage")]
    pub storage: StorageBackend,

    /// LMDB map size in bytes.
    #[serde(default = "default_lmdb_map_size")]
    pub lmdb_map_size: usize,

    /// Port for the HTTP API.
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// Hex-encoded HMAC key for session credentials. A random key is
    /// generated when absent, so sessions do not survive a restart.
    #[serde(default)]
    pub session_secret: Option<String>,

    /// Wallet addresses granted super admin at start-up.
    #[serde(default)]
    pub super_admins: Vec<String>,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Whether to serve Prometheus metrics at `/metrics`.
    #[serde(default)]
    pub enable_metrics: bool,

    /// Timing and scoring constants.
    #[serde(default)]
    pub params: ArenaParams,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./agt_data")
}

fn default_storage() -> StorageBackend {
    StorageBackend::Lmdb
}

fn default_lmdb_map_size() -> usize {
    DEFAULT_MAP_SIZE
}

fn default_rpc_port() -> u16 {
    7080
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(format!("{path}: {e}")))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    pub fn log_format(&self) -> Result<LogFormat, NodeError> {
        self.log_format.parse()
    }

    /// The decoded session secret, if one is configured.
    pub fn session_secret_bytes(&self) -> Result<Option<Vec<u8>>, NodeError> {
        let Some(raw) = self.session_secret.as_deref().map(str::trim) else {
            return Ok(None);
        };
        let bytes = hex::decode(raw)
            .map_err(|e| NodeError::Config(format!("session_secret is not hex: {e}")))?;
        if bytes.len() < 16 {
            return Err(NodeError::Config(
                "session_secret must be at least 16 bytes".to_string(),
            ));
        }
        Ok(Some(bytes))
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            storage: default_storage(),
            lmdb_map_size: default_lmdb_map_size(),
            rpc_port: default_rpc_port(),
            session_secret: None,
            super_admins: Vec::new(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            enable_metrics: false,
            params: ArenaParams::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = NodeConfig {
            super_admins: vec!["agt_x".into()],
            ..Default::default()
        };
        let toml_str = config.to_toml_string().unwrap();
        let parsed = NodeConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.rpc_port, config.rpc_port);
        assert_eq!(parsed.super_admins, config.super_admins);
        assert_eq!(parsed.params, config.params);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = NodeConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.rpc_port, 7080);
        assert_eq!(config.storage, StorageBackend::Lmdb);
        assert_eq!(config.log_format, "human");
        assert_eq!(config.params.challenge_ttl_secs, 300);
    }

    #[test]
    fn partial_params_table_keeps_other_defaults() {
        let toml = r#"
            storage = "memory"
            rpc_port = 9999

            [params]
            performance_duration_secs = 30
        "#;
        let config = NodeConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.rpc_port, 9999);
        assert_eq!(config.params.performance_duration_secs, 30);
        assert_eq!(config.params.no_show_grace_secs, 60);
    }

    #[test]
    fn session_secret_must_be_long_hex() {
        let mut config = NodeConfig::default();
        assert!(config.session_secret_bytes().unwrap().is_none());
        config.session_secret = Some("zz".into());
        assert!(config.session_secret_bytes().is_err());
        config.session_secret = Some("00ff".into());
        assert!(config.session_secret_bytes().is_err());
        config.session_secret = Some("11".repeat(32));
        assert_eq!(config.session_secret_bytes().unwrap().unwrap().len(), 32);
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = NodeConfig::from_toml_file("/nonexistent/agt.toml");
        assert!(matches!(result, Err(NodeError::Config(_))));
    }
}
