//! Configuration loading for consistency-test.
//!
//! Every setting has a default, so a config file is optional and may name
//! only the keys it changes. Command line flags override the file.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use probe_client::{RespStoreConfig, TesterConfig, DEFAULT_MAX_REDIRECTS};
use probe_core::{DEFAULT_KEYSPACE, DEFAULT_WORKING_SET};

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Probe loop settings.
    #[serde(default)]
    pub workload: WorkloadConfig,
    /// Store client settings.
    #[serde(default)]
    pub store: StoreConfig,
}

/// Probe loop configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkloadConfig {
    /// Hot key pool size (default: 1000).
    #[serde(default = "default_working_set")]
    pub working_set: u64,
    /// Cold key pool size (default: 10000).
    #[serde(default = "default_keyspace")]
    pub keyspace: u64,
    /// Pause after each iteration in milliseconds (default: 0).
    #[serde(default)]
    pub delay_ms: u64,
}

/// Store client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Per-request timeout in milliseconds (default: 100).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Cluster redirections followed per request (default: 16).
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

fn default_working_set() -> u64 {
    DEFAULT_WORKING_SET
}

fn default_keyspace() -> u64 {
    DEFAULT_KEYSPACE
}

fn default_timeout_ms() -> u64 {
    100
}

fn default_max_redirects() -> usize {
    DEFAULT_MAX_REDIRECTS
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            working_set: default_working_set(),
            keyspace: default_keyspace(),
            delay_ms: 0,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            max_redirects: default_max_redirects(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check values the types alone cannot rule out.
    ///
    /// Empty key pools are rejected later by the tester itself.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "store.timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Settings for the probe loop.
    pub fn tester_config(&self) -> TesterConfig {
        TesterConfig {
            working_set: self.workload.working_set,
            keyspace: self.workload.keyspace,
            delay: Duration::from_millis(self.workload.delay_ms),
        }
    }

    /// Settings for the store client.
    pub fn store_config(&self) -> RespStoreConfig {
        RespStoreConfig::default()
            .with_timeout(Duration::from_millis(self.store.timeout_ms))
            .with_max_redirects(self.store.max_redirects)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_library_defaults() {
        let config = Config::default();
        assert_eq!(config.workload.working_set, 1000);
        assert_eq!(config.workload.keyspace, 10000);
        assert_eq!(config.workload.delay_ms, 0);
        assert_eq!(config.store.timeout_ms, 100);
        assert_eq!(config.store.max_redirects, 16);

        let store = config.store_config();
        assert_eq!(store.timeout, Duration::from_millis(100));
        assert_eq!(store.max_redirects, 16);
        assert_eq!(config.tester_config().delay, Duration::ZERO);
    }

    #[test]
    fn config_from_toml_string() {
        let toml = r#"
[workload]
working_set = 50
keyspace = 500
delay_ms = 10

[store]
timeout_ms = 250
max_redirects = 4
"#;

        let config: Config = toml::from_str(toml).unwrap();
        let tester = config.tester_config();
        assert_eq!(tester.working_set, 50);
        assert_eq!(tester.keyspace, 500);
        assert_eq!(tester.delay, Duration::from_millis(10));

        let store = config.store_config();
        assert_eq!(store.timeout, Duration::from_millis(250));
        assert_eq!(store.max_redirects, 4);
    }

    #[test]
    fn missing_sections_and_fields_use_defaults() {
        let config: Config = toml::from_str("[workload]\ndelay_ms = 5\n").unwrap();
        assert_eq!(config.workload.delay_ms, 5);
        assert_eq!(config.workload.working_set, 1000);
        assert_eq!(config.store.timeout_ms, 100);

        let empty: Config = toml::from_str("").unwrap();
        assert_eq!(empty.workload.keyspace, 10000);
    }

    #[test]
    fn from_file_reads_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[store]\ntimeout_ms = 500").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.store.timeout_ms, 500);
    }

    #[test]
    fn from_file_missing_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::from_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn from_file_bad_toml_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[workload]\nworking_set = \"lots\"").unwrap();

        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[store]\ntimeout_ms = 0").unwrap();

        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("timeout_ms"));
    }
}
