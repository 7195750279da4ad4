//! Configuration loader with layered merging.

use super::{ConfigError, ScriptConfig};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration loader with builder pattern.
///
/// # Example
///
/// ```ignore
/// use rslua_script::ConfigLoader;
///
/// let config = ConfigLoader::new()
///     .with_file("/path/to/rslua.toml")
///     .skip_env_vars()  // For testing
///     .load()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    /// Config file path. Missing files are ignored.
    file: Option<PathBuf>,

    /// Skip environment variable loading.
    skip_env: bool,
}

impl ConfigLoader {
    /// Creates a new loader with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the config file to read.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Skips environment variable loading.
    ///
    /// Useful for testing with deterministic config.
    #[must_use]
    pub fn skip_env_vars(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Loads defaults, then the file, then environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read or
    /// parsed, or if an environment variable has an invalid value.
    pub fn load(&self) -> Result<ScriptConfig, ConfigError> {
        let mut config = match &self.file {
            Some(path) => match self.load_file(path)? {
                Some(config) => {
                    debug!(path = %path.display(), "Loaded script config");
                    config
                }
                None => ScriptConfig::default(),
            },
            None => ScriptConfig::default(),
        };

        if !self.skip_env {
            apply_env_vars(&mut config)?;
        }

        Ok(config)
    }

    /// Loads a config file, returning None if it doesn't exist.
    fn load_file(&self, path: &Path) -> Result<Option<ScriptConfig>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let config =
            ScriptConfig::from_toml(&content).map_err(|e| ConfigError::parse_toml(path, e))?;

        Ok(Some(config))
    }
}

/// Applies `RSLUA_*` environment variable overrides.
fn apply_env_vars(config: &mut ScriptConfig) -> Result<(), ConfigError> {
    if let Ok(val) = std::env::var("RSLUA_LOG_PREFIX") {
        config.log_prefix = val;
    }
    if let Ok(val) = std::env::var("RSLUA_REFRESH_MARKER") {
        config.refresh_marker = val;
    }
    if let Ok(val) = std::env::var("RSLUA_REFRESH_DEBOUNCE_MS") {
        config.refresh_debounce_ms = val.trim().parse().map_err(|_| {
            ConfigError::invalid_env_var("RSLUA_REFRESH_DEBOUNCE_MS", "expected milliseconds")
        })?;
    }
    if let Ok(val) = std::env::var("RSLUA_WARN_ACYCLIC") {
        config.warn_acyclic_connections = parse_bool(&val)
            .ok_or_else(|| ConfigError::invalid_env_var("RSLUA_WARN_ACYCLIC", "expected bool"))?;
    }
    Ok(())
}

/// Parses a boolean from string.
///
/// Accepts: "true", "false", "1", "0", "yes", "no", "on", "off" (case-insensitive).
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_defaults_only() {
        let config = ConfigLoader::new().skip_env_vars().load().unwrap();
        assert_eq!(config, ScriptConfig::default());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let temp = TempDir::new().unwrap();
        let config = ConfigLoader::new()
            .with_file(temp.path().join("absent.toml"))
            .skip_env_vars()
            .load()
            .unwrap();
        assert_eq!(config, ScriptConfig::default());
    }

    #[test]
    fn load_file_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("rslua.toml");
        std::fs::write(
            &path,
            "log_prefix = \"Cell\"\nrefresh_debounce_ms = 50\n",
        )
        .unwrap();

        let config = ConfigLoader::new()
            .with_file(&path)
            .skip_env_vars()
            .load()
            .unwrap();

        assert_eq!(config.log_prefix, "Cell");
        assert_eq!(config.refresh_debounce_ms, 50);
        assert!(config.warn_acyclic_connections);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("rslua.toml");
        std::fs::write(&path, "log_prefix = ").unwrap();

        let err = ConfigLoader::new()
            .with_file(&path)
            .skip_env_vars()
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::ParseToml { .. }));
    }

    #[test]
    fn parse_bool_values() {
        assert_eq!(parse_bool("YES"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
