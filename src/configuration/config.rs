use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error_handling::types::ConfigError;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Driver configuration, loaded from a TOML file.
///
/// ```toml
/// [engine]
/// host = "unix:///var/run/docker.sock"
/// request_timeout_secs = 120
///
/// [lifecycle]
/// stop_timeout_secs = 10
/// ```
///
/// Every field is optional; an empty file connects with the engine's local
/// defaults (which honour `DOCKER_HOST`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub engine: EngineSettings,
    pub lifecycle: LifecycleSettings,
}

/// How to reach the container engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// `unix://<path>`, an absolute socket path, or a plain `tcp://`/`http://` address.
    /// TLS endpoints are not supported.
    /// `None` uses local defaults.
    pub host: Option<String>,
    /// Transport-level timeout applied by the engine client to each request.
    pub request_timeout_secs: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            host: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Grace periods forwarded to stop/restart. `None` leaves the engine default.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleSettings {
    pub stop_timeout_secs: Option<i64>,
    pub restart_timeout_secs: Option<i64>,
}

/// Where an engine host string points.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEndpoint {
    LocalDefaults,
    Socket(String),
    Http(String),
}

impl DriverConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: DriverConfig =
            toml::from_str(raw).map_err(|e| ConfigError::TomlError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.endpoint()?;

        if self.engine.request_timeout_secs == 0 {
            return Err(ConfigError::NotInRange(
                "engine.request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        for (key, value) in [
            ("lifecycle.stop_timeout_secs", self.lifecycle.stop_timeout_secs),
            (
                "lifecycle.restart_timeout_secs",
                self.lifecycle.restart_timeout_secs,
            ),
        ] {
            if let Some(secs) = value {
                if secs < 0 {
                    return Err(ConfigError::NotInRange(format!(
                        "{} must not be negative, got {}",
                        key, secs
                    )));
                }
            }
        }

        Ok(())
    }
}

impl EngineSettings {
    pub fn endpoint(&self) -> Result<EngineEndpoint, ConfigError> {
        let host = match self.host.as_deref().map(str::trim) {
            None | Some("") => return Ok(EngineEndpoint::LocalDefaults),
            Some(host) => host,
        };

        if let Some(path) = host.strip_prefix("unix://") {
            if path.is_empty() {
                return Err(ConfigError::BadEngineHost(format!(
                    "missing socket path in {}",
                    host
                )));
            }
            Ok(EngineEndpoint::Socket(path.to_string()))
        } else if host.starts_with('/') {
            Ok(EngineEndpoint::Socket(host.to_string()))
        } else if host.starts_with("https://") {
            Err(ConfigError::BadEngineHost(format!(
                "TLS engine hosts are not supported: {}",
                host
            )))
        } else if host.starts_with("tcp://") || host.starts_with("http://") {
            Ok(EngineEndpoint::Http(host.to_string()))
        } else {
            Err(ConfigError::BadEngineHost(format!(
                "unsupported engine host {}",
                host
            )))
        }
    }
}
