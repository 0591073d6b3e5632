//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::project::{BoundaryConfig, LossLevel};
use crate::{ConfigError, ConfigResult};
use std::env;
use std::path::{Path, PathBuf};

/// Project configuration file name
pub const CONFIG_FILE_NAME: &str = "boundary.toml";

/// Configuration loader
///
/// Loads configuration from multiple sources and merges them with proper precedence:
/// 1. User config (~/.boundary/config.toml) - lowest priority
/// 2. Project config (./boundary.toml) - overrides user
/// 3. Environment variables (BOUNDARY_*) - overrides project
/// 4. CLI flags - highest priority (handled by caller)
pub struct ConfigLoader {
    /// Cached user config path
    user_config_path: Option<PathBuf>,
}

/// Effective settings after merging every source
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Native library to bind, if configured
    pub library_path: Option<PathBuf>,

    /// How lossy string decodes are reported
    pub decode_loss: LossLevel,

    /// Directory holding boundary.toml, if one was found
    pub project_root: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            library_path: None,
            decode_loss: LossLevel::Warn,
            project_root: None,
        }
    }
}

impl Settings {
    fn from_config(config: &BoundaryConfig, project_root: Option<PathBuf>) -> Self {
        let defaults = Settings::default();
        Self {
            library_path: config.library_path().map(Path::to_path_buf),
            decode_loss: config.decode_loss().unwrap_or(defaults.decode_loss),
            project_root,
        }
    }

    /// Check if a boundary.toml was found
    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            user_config_path: None,
        }
    }

    /// Create a loader that reads the user config from an explicit path
    pub fn with_user_config_path(path: PathBuf) -> Self {
        Self {
            user_config_path: Some(path),
        }
    }

    /// Load settings starting from the given directory
    ///
    /// Walks up the directory tree to find boundary.toml, merges it over the
    /// user config, then applies environment overrides.
    pub fn load_from_directory(&mut self, start_dir: &Path) -> ConfigResult<Settings> {
        let (project_root, project_config) = self.find_project_config(start_dir)?;

        // User config is optional
        let mut config = self.load_user_config().unwrap_or_default();
        config.merge(&project_config);

        let config = self.apply_env_overrides(config)?;
        Ok(Settings::from_config(&config, project_root))
    }

    /// Load settings from a specific boundary.toml
    pub fn load_from_file(&mut self, config_path: &Path) -> ConfigResult<Settings> {
        let project_root = config_path.parent().map(|p| p.to_path_buf());
        let project_config =
            resolve_relative(BoundaryConfig::load_from_file(config_path)?, project_root.as_deref());

        let mut config = self.load_user_config().unwrap_or_default();
        config.merge(&project_config);

        let config = self.apply_env_overrides(config)?;
        Ok(Settings::from_config(&config, project_root))
    }

    /// Find project configuration by walking up directory tree
    ///
    /// Returns (project_root, project_config); the default config if none is found
    fn find_project_config(
        &self,
        start_dir: &Path,
    ) -> ConfigResult<(Option<PathBuf>, BoundaryConfig)> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(CONFIG_FILE_NAME);

            if config_path.exists() {
                let config = BoundaryConfig::load_from_file(&config_path)?;
                let config = resolve_relative(config, Some(&current));
                return Ok((Some(current), config));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok((None, BoundaryConfig::default())),
            }
        }
    }

    /// Load user configuration from ~/.boundary/config.toml
    ///
    /// A relative library path resolves against the user config directory.
    fn load_user_config(&mut self) -> ConfigResult<BoundaryConfig> {
        if self.user_config_path.is_none() {
            self.user_config_path = Some(Self::user_config_path()?);
        }

        match self.user_config_path.as_deref() {
            Some(path) if path.exists() => Ok(resolve_relative(
                BoundaryConfig::load_from_file(path)?,
                path.parent(),
            )),
            _ => Ok(BoundaryConfig::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// - BOUNDARY_LIBRARY=/path/to/libboundary_native.so
    /// - BOUNDARY_DECODE_LOSS=warn|info|debug|off
    fn apply_env_overrides(&self, mut config: BoundaryConfig) -> ConfigResult<BoundaryConfig> {
        let mut overrides = BoundaryConfig::default();

        if let Ok(library) = env::var("BOUNDARY_LIBRARY") {
            if !library.is_empty() {
                overrides.library.get_or_insert_with(Default::default).path =
                    Some(PathBuf::from(library));
            }
        }

        if let Ok(level) = env::var("BOUNDARY_DECODE_LOSS") {
            let level: LossLevel = level.parse()?;
            overrides.marshal.get_or_insert_with(Default::default).decode_loss = Some(level);
        }

        config.merge(&overrides);
        Ok(config)
    }

    /// Get the user config file path (~/.boundary/config.toml)
    pub fn user_config_path() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".boundary").join("config.toml"))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve a relative library path against the directory of its config file
fn resolve_relative(mut config: BoundaryConfig, root: Option<&Path>) -> BoundaryConfig {
    if let (Some(root), Some(library)) = (root, config.library.as_mut()) {
        if let Some(path) = library.path.as_mut() {
            if path.is_relative() {
                *path = root.join(&*path);
            }
        }
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn create_config_file(dir: &Path, content: &str) -> PathBuf {
        let config_path = dir.join(CONFIG_FILE_NAME);
        fs::write(&config_path, content).unwrap();
        config_path
    }

    fn isolated_loader(dir: &TempDir) -> ConfigLoader {
        ConfigLoader::with_user_config_path(dir.path().join("no-user-config.toml"))
    }

    #[test]
    #[serial(boundary_env)]
    fn test_defaults_without_config() {
        let temp_dir = TempDir::new().unwrap();
        let settings = isolated_loader(&temp_dir)
            .load_from_directory(temp_dir.path())
            .unwrap();

        assert!(!settings.is_project());
        assert_eq!(settings.library_path, None);
        assert_eq!(settings.decode_loss, LossLevel::Warn);
    }

    #[test]
    #[serial(boundary_env)]
    fn test_relative_library_path_resolves_against_root() {
        let temp_dir = TempDir::new().unwrap();
        create_config_file(
            temp_dir.path(),
            r#"
[library]
path = "native/libboundary_native.so"
"#,
        );

        let settings = isolated_loader(&temp_dir)
            .load_from_directory(temp_dir.path())
            .unwrap();

        assert_eq!(
            settings.library_path,
            Some(temp_dir.path().join("native/libboundary_native.so"))
        );
    }

    #[test]
    #[serial(boundary_env)]
    fn test_user_library_path_resolves_against_user_dir() {
        let user_dir = TempDir::new().unwrap();
        let project_dir = TempDir::new().unwrap();
        let user_config = user_dir.path().join("config.toml");
        fs::write(
            &user_config,
            r#"
[library]
path = "lib/libboundary_native.so"
"#,
        )
        .unwrap();

        let settings = ConfigLoader::with_user_config_path(user_config)
            .load_from_directory(project_dir.path())
            .unwrap();

        assert!(!settings.is_project());
        assert_eq!(
            settings.library_path,
            Some(user_dir.path().join("lib/libboundary_native.so"))
        );
    }

    #[test]
    #[serial(boundary_env)]
    fn test_env_override_decode_loss() {
        let temp_dir = TempDir::new().unwrap();
        create_config_file(
            temp_dir.path(),
            r#"
[marshal]
decode_loss = "warn"
"#,
        );

        env::set_var("BOUNDARY_DECODE_LOSS", "off");
        let settings = isolated_loader(&temp_dir).load_from_directory(temp_dir.path());
        env::remove_var("BOUNDARY_DECODE_LOSS");

        assert_eq!(settings.unwrap().decode_loss, LossLevel::Off);
    }

    #[test]
    #[serial(boundary_env)]
    fn test_env_override_invalid_decode_loss() {
        let temp_dir = TempDir::new().unwrap();

        env::set_var("BOUNDARY_DECODE_LOSS", "shout");
        let result = isolated_loader(&temp_dir).load_from_directory(temp_dir.path());
        env::remove_var("BOUNDARY_DECODE_LOSS");

        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }
}
