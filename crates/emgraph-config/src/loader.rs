//! Configuration loading utilities

use crate::schema::Config;
use emgraph_common::{ChannelId, EmGraphError};
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "EMGRAPH_CONFIG_PATH";

/// Files probed in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILES: [&str; 2] = ["emgraph.yaml", "emgraph.yml"];

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file '{path}': {source}")]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParse {
        /// Variable name.
        var: String,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration validation error
    #[error("Invalid value for '{field}': {message}")]
    Validation {
        /// Dotted path of the field.
        field: String,
        /// What is wrong with it.
        message: String,
    },
}

impl ConfigError {
    pub(crate) fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<ConfigError> for EmGraphError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, message } => {
                Self::validation_field(format!("{field}: {message}"), field)
            }
            other => Self::config_with_source("Failed to load configuration", other),
        }
    }
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file with environment variable overrides
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let mut config = Self::read_file(path.as_ref())?;
        Self::apply_env_overrides(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a specific file, ignoring the environment.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let config = Self::read_file(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    /// Configuration file to read, if any.
    ///
    /// Order: explicit path, `EMGRAPH_CONFIG_PATH`, `emgraph.yaml`/`emgraph.yml`
    /// in the working directory.
    pub fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
        Self::resolve_path_with(explicit, |var| env::var(var).ok())
    }

    fn resolve_path_with<F>(explicit: Option<&Path>, lookup: F) -> Option<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Some(path) = lookup(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }
        DEFAULT_CONFIG_FILES
            .iter()
            .map(Path::new)
            .find(|p| p.exists())
            .map(Path::to_path_buf)
    }

    /// Resolve and load the configuration.
    ///
    /// Reads the file named by [`ConfigLoader::resolve_path`], or starts from
    /// the built-in defaults when there is none. Environment overrides are
    /// applied on top in every case.
    pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
        if let Some(path) = Self::resolve_path(explicit) {
            return Self::load_config(path);
        }

        debug!("No configuration file found, using defaults");
        let mut config = Config::default();
        Self::apply_env_overrides(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML document. Missing sections fall back to defaults.
    pub fn from_yaml_str(content: &str) -> Result<Config, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    fn read_file(path: &Path) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Read configuration file");
        Self::from_yaml_str(&content)
    }

    /// Apply `EMGRAPH_*` environment variable overrides to configuration
    pub fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
        Self::apply_overrides(config, |var| env::var(var).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("EMGRAPH_DEVICE_URL") {
            config.device.url = url;
        }

        if let Some(channel) = lookup("EMGRAPH_CHANNEL_ID") {
            config.device.channel_id = ChannelId(parse_var("EMGRAPH_CHANNEL_ID", &channel)?);
        }

        if let Some(timeout) = lookup("EMGRAPH_TIMEOUT_SECS") {
            config.device.timeout_secs = parse_var("EMGRAPH_TIMEOUT_SECS", &timeout)?;
        }

        if let Some(path) = lookup("EMGRAPH_OUTPUT_PATH") {
            config.chart.output_path = PathBuf::from(path);
        }

        if let Some(tz) = lookup("EMGRAPH_TIMEZONE") {
            config.analysis.timezone = tz;
        }

        if let Some(display) = lookup("EMGRAPH_DISPLAY") {
            config.chart.display = parse_bool("EMGRAPH_DISPLAY", &display)?;
        }

        if let Some(level) = lookup("EMGRAPH_LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(())
    }
}

fn parse_var<T>(var: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.trim().parse().map_err(|e| ConfigError::EnvParse {
        var: var.to_string(),
        source: Box::new(e),
    })
}

fn parse_bool(var: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::EnvParse {
            var: var.to_string(),
            source: format!("expected a boolean, got '{value}'").into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = ConfigLoader::from_yaml_str(
            "device:\n  url: http://10.0.0.5/rpc/EM1Data.GetData\nchart:\n  display: false\n",
        )
        .unwrap();

        assert_eq!(config.device.url, "http://10.0.0.5/rpc/EM1Data.GetData");
        assert_eq!(config.device.timeout_secs, 10);
        assert!(!config.chart.display);
        assert_eq!(config.analysis.timezone, "Europe/Paris");
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(ConfigLoader::from_yaml_str("  \n").unwrap(), Config::default());
    }

    #[test]
    fn test_invalid_yaml() {
        let result = ConfigLoader::from_yaml_str("device: [unterminated");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_overrides_apply() {
        let mut config = Config::default();
        ConfigLoader::apply_overrides(
            &mut config,
            lookup(&[
                ("EMGRAPH_DEVICE_URL", "http://meter.local/rpc/EM1Data.GetData"),
                ("EMGRAPH_CHANNEL_ID", "1"),
                ("EMGRAPH_TIMEOUT_SECS", " 3 "),
                ("EMGRAPH_OUTPUT_PATH", "/tmp/chart.png"),
                ("EMGRAPH_TIMEZONE", "UTC"),
                ("EMGRAPH_DISPLAY", "off"),
                ("EMGRAPH_LOG_LEVEL", "debug"),
            ]),
        )
        .unwrap();

        assert_eq!(config.device.url, "http://meter.local/rpc/EM1Data.GetData");
        assert_eq!(config.device.channel_id, ChannelId(1));
        assert_eq!(config.device.timeout_secs, 3);
        assert_eq!(config.chart.output_path, PathBuf::from("/tmp/chart.png"));
        assert_eq!(config.analysis.timezone, "UTC");
        assert!(!config.chart.display);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_bad_override_is_reported() {
        let mut config = Config::default();
        let err = ConfigLoader::apply_overrides(
            &mut config,
            lookup(&[("EMGRAPH_TIMEOUT_SECS", "ten")]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("EMGRAPH_TIMEOUT_SECS"));

        let err =
            ConfigLoader::apply_overrides(&mut config, lookup(&[("EMGRAPH_DISPLAY", "maybe")]))
                .unwrap_err();
        assert!(matches!(err, ConfigError::EnvParse { .. }));
    }

    #[test]
    fn test_resolve_path_order() {
        let explicit = Path::new("cli.yaml");
        let env = lookup(&[(CONFIG_PATH_ENV, "/etc/emgraph/meter.yaml")]);

        assert_eq!(
            ConfigLoader::resolve_path_with(Some(explicit), &env),
            Some(PathBuf::from("cli.yaml"))
        );
        assert_eq!(
            ConfigLoader::resolve_path_with(None, &env),
            Some(PathBuf::from("/etc/emgraph/meter.yaml"))
        );
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigLoader::load_config("/nonexistent/emgraph.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));

        let converted: EmGraphError = err.into();
        assert!(converted.to_string().contains("Configuration error"));
    }
}
