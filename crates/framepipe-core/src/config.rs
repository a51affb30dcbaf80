//! Configuration types for the framepipe client and server.
//!
//! Configuration is loaded from an optional YAML file and validated before
//! use; every key has a default, and the CLI may override individual fields.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};
use crate::server::transform::ResponseTransform;
use crate::wire::{WireFormat, BOUNDED_MAX_PAYLOAD, DEFAULT_MAX_FRAME_SIZE};

/// Root configuration, shared by the server and the client.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PipeConfig {
    /// Socket location and client timing.
    #[serde(default)]
    pub socket: SocketConfig,

    /// Wire format selection.
    #[serde(default)]
    pub wire: WireConfig,

    /// Server-side processing.
    #[serde(default)]
    pub server: ServeConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Socket configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SocketConfig {
    /// Filesystem path of the Unix domain socket.
    #[serde(default = "default_socket_path")]
    pub path: PathBuf,

    /// How long the client waits for a response frame, in milliseconds.
    #[serde(default = "default_response_timeout_ms")]
    pub response_timeout_ms: u64,
}

/// Wire format configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WireConfig {
    /// Length-header policy: `streaming` or `bounded`.
    #[serde(default)]
    pub format: WireFormat,

    /// Defensive cap on announced frame lengths (streaming format).
    #[serde(default = "default_max_frame_size")]
    pub max_frame_size: usize,
}

/// Server-side processing configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServeConfig {
    /// Response transform. Defaults to the wire format's own transform
    /// (`uppercase` for streaming, `tagged` for bounded).
    #[serde(default)]
    pub transform: Option<ResponseTransform>,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output logs in JSON format (for production).
    #[serde(default)]
    pub json: bool,
}

// Default value functions

fn default_socket_path() -> PathBuf {
    PathBuf::from("/tmp/example_socket")
}

fn default_response_timeout_ms() -> u64 {
    10_000
}

fn default_max_frame_size() -> usize {
    DEFAULT_MAX_FRAME_SIZE
}

fn default_log_level() -> String {
    "info".to_string()
}

// Default implementations

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            path: default_socket_path(),
            response_timeout_ms: default_response_timeout_ms(),
        }
    }
}

impl Default for WireConfig {
    fn default() -> Self {
        Self {
            format: WireFormat::default(),
            max_frame_size: default_max_frame_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl PipeConfig {
    /// Load configuration from a YAML file and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid YAML, or
    /// fails validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns an error if the max frame size could not hold every frame the
    /// bounded format can announce.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.wire.max_frame_size < BOUNDED_MAX_PAYLOAD {
            return Err(ConfigError::MaxFrameSizeTooSmall(self.wire.max_frame_size));
        }
        Ok(())
    }

    /// The effective response transform for this configuration.
    #[must_use]
    pub fn transform(&self) -> ResponseTransform {
        self.server
            .transform
            .clone()
            .unwrap_or_else(|| ResponseTransform::default_for(self.wire.format))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipeConfig::default();
        assert_eq!(config.socket.path, PathBuf::from("/tmp/example_socket"));
        assert_eq!(config.wire.format, WireFormat::Streaming);
        assert_eq!(config.wire.max_frame_size, DEFAULT_MAX_FRAME_SIZE);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r"
socket:
  path: /run/framepipe.sock
  response_timeout_ms: 500
wire:
  format: bounded
server:
  transform:
    kind: tagged
    prefix: 'Echo: '
logging:
  level: debug
";
        let config: PipeConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.socket.path, PathBuf::from("/run/framepipe.sock"));
        assert_eq!(config.socket.response_timeout_ms, 500);
        assert_eq!(config.wire.format, WireFormat::Bounded);
        assert_eq!(config.transform().apply("x"), "Echo: x");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "wire:\n  format: bounded\n";
        let config: PipeConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.wire.format, WireFormat::Bounded);
        assert_eq!(config.socket.path, PathBuf::from("/tmp/example_socket"));
    }

    #[test]
    fn test_transform_follows_format_by_default() {
        let mut config = PipeConfig::default();
        assert_eq!(config.transform(), ResponseTransform::Uppercase);

        config.wire.format = WireFormat::Bounded;
        assert_eq!(config.transform().apply("ping"), "Processed: ping");
    }

    #[test]
    fn test_validation_rejects_tiny_max_frame_size() {
        let mut config = PipeConfig::default();
        config.wire.max_frame_size = 16;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MaxFrameSizeTooSmall(16))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = PipeConfig::from_file("/nonexistent/framepipe.yaml");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
