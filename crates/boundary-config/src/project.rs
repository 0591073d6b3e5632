//! Configuration file schema (boundary.toml)
//!
//! The same schema is used for the project file and the user-level file; the
//! loader merges them.
//!
//! ```toml
//! [library]
//! path = "target/release/libboundary_native.so"
//!
//! [marshal]
//! decode_loss = "warn"
//! ```

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Contents of a boundary.toml file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct BoundaryConfig {
    /// Native library binding
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library: Option<LibraryConfig>,

    /// Marshaling behaviour
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marshal: Option<MarshalConfig>,
}

/// Native library binding
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct LibraryConfig {
    /// Path to the native counterpart; relative paths resolve against the
    /// directory holding boundary.toml
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Marshaling behaviour
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct MarshalConfig {
    /// How lossy string decodes are reported (default: "warn")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decode_loss: Option<LossLevel>,
}

/// Reporting level for decoding loss
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LossLevel {
    #[default]
    Warn,
    Info,
    Debug,
    Off,
}

impl LossLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LossLevel::Warn => "warn",
            LossLevel::Info => "info",
            LossLevel::Debug => "debug",
            LossLevel::Off => "off",
        }
    }
}

impl fmt::Display for LossLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LossLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "warn" | "warning" => Ok(LossLevel::Warn),
            "info" => Ok(LossLevel::Info),
            "debug" => Ok(LossLevel::Debug),
            "off" | "none" => Ok(LossLevel::Off),
            other => Err(ConfigError::InvalidValue {
                field: "marshal.decode_loss".to_string(),
                reason: format!("must be 'warn', 'info', 'debug', or 'off', got '{}'", other),
            }),
        }
    }
}

impl BoundaryConfig {
    /// Load configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(path) = self.library_path() {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "library.path".to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Configured native library path, as written
    pub fn library_path(&self) -> Option<&Path> {
        self.library.as_ref().and_then(|l| l.path.as_deref())
    }

    pub fn decode_loss(&self) -> Option<LossLevel> {
        self.marshal.as_ref().and_then(|m| m.decode_loss)
    }

    /// Merge another config into this one
    /// Other config takes precedence for non-None values
    pub fn merge(&mut self, other: &BoundaryConfig) {
        if let Some(path) = other.library_path() {
            self.library
                .get_or_insert_with(LibraryConfig::default)
                .path = Some(path.to_path_buf());
        }
        if let Some(level) = other.decode_loss() {
            self.marshal
                .get_or_insert_with(MarshalConfig::default)
                .decode_loss = Some(level);
        }
    }
}
