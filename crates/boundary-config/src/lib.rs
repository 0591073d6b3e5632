//! Boundary Configuration System
//!
//! Provides configuration for the marshaling layer:
//! - Project configuration (boundary.toml)
//! - User configuration (~/.boundary/config.toml)
//! - Environment overrides (BOUNDARY_*)
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded and merged in the following order (later overrides earlier):
//! 1. User config (~/.boundary/config.toml)
//! 2. Project config (./boundary.toml, found by walking up the directory tree)
//! 3. Environment variables (BOUNDARY_*)
//! 4. CLI flags (handled by the caller)
//!
//! # Example
//!
//! ```no_run
//! use boundary_config::ConfigLoader;
//! use std::path::Path;
//!
//! let mut loader = ConfigLoader::new();
//! let settings = loader.load_from_directory(Path::new(".")).unwrap();
//! println!("decode loss: {}", settings.decode_loss);
//! ```

pub mod loader;
pub mod project;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Home directory not found")]
    HomeNotFound,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

// Re-export main types
pub use loader::{ConfigLoader, Settings, CONFIG_FILE_NAME};
pub use project::{BoundaryConfig, LibraryConfig, LossLevel, MarshalConfig};
