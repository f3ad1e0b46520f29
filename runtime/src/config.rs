//! User configuration for the build CLI.
//!
//! Defines the YAML-serializable configuration that lists the available
//! platforms, where the SDK lives and how the CLI should behave.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! sdk:
//!   root: /opt/buildcmd/sdk/3.2.0
//! platforms:
//!   - android
//!   - ios
//! cli:
//!   prompt: true
//!   log_level: info
//!   build_type: development
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigFileError;

/// Environment variable naming a configuration file.
pub const CONFIG_ENV: &str = "BUILDCMD_CONFIG";

/// Platforms available when the configuration does not list any.
pub const DEFAULT_PLATFORMS: &[&str] = &["android", "ios", "mobileweb"];

/// Where the SDK is installed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SdkConfig {
    /// SDK root directory; platform handlers live below it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
}

/// CLI behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliSettings {
    /// Whether missing or invalid options may be prompted for.
    #[serde(default = "default_prompt")]
    pub prompt: bool,
    /// Log filter used when `--log-level` and `RUST_LOG` are absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    /// Overrides the default `--build-type`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_type: Option<String>,
}

fn default_prompt() -> bool {
    true
}

impl Default for CliSettings {
    fn default() -> Self {
        Self {
            prompt: true,
            log_level: None,
            build_type: None,
        }
    }
}

fn default_platforms() -> Vec<String> {
    DEFAULT_PLATFORMS.iter().map(|p| p.to_string()).collect()
}

fn default_version() -> String {
    "1.0".to_string()
}

/// Top-level CLI configuration.
///
/// The platform list is the enumeration every `--platform` value is checked
/// against.
///
/// # Examples
///
/// ```
/// use buildcmd_runtime::BuildConfig;
///
/// let config = BuildConfig::default();
/// assert!(config.is_available("android"));
/// assert!(!config.is_available("bogus"));
/// assert!(config.cli.prompt);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Configuration format version (e.g., `"1.0"`).
    #[serde(default = "default_version")]
    pub version: String,
    /// SDK location.
    #[serde(default)]
    pub sdk: SdkConfig,
    /// Available platforms.
    #[serde(default = "default_platforms")]
    pub platforms: Vec<String>,
    /// CLI behavior.
    #[serde(default)]
    pub cli: CliSettings,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            sdk: SdkConfig::default(),
            platforms: default_platforms(),
            cli: CliSettings::default(),
        }
    }
}

impl BuildConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](ConfigFileError::Io) if the file cannot be read, or
    /// [`Yaml`](ConfigFileError::Yaml) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigFileError> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](ConfigFileError::Io) if the file cannot be written, or
    /// [`Yaml`](ConfigFileError::Yaml) if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigFileError> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Loads the configuration the CLI should use.
    ///
    /// An explicit path wins, then the file named by [`CONFIG_ENV`], then the
    /// built-in defaults. A named file that cannot be loaded is an error.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigFileError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => Self::load(PathBuf::from(path)),
            _ => Ok(Self::default()),
        }
    }

    /// Returns `true` if `platform` is in the platform list.
    pub fn is_available(&self, platform: &str) -> bool {
        self.platforms.iter().any(|p| p == platform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
version: "1.0"
sdk:
  root: /opt/sdk/3.2.0
platforms:
  - android
  - ios
cli:
  prompt: false
  log_level: debug
  build_type: production
"#
    }

    #[test]
    fn test_deserialize_complete() {
        let config: BuildConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.sdk.root, Some(PathBuf::from("/opt/sdk/3.2.0")));
        assert_eq!(config.platforms, vec!["android", "ios"]);
        assert!(!config.cli.prompt);
        assert_eq!(config.cli.log_level.as_deref(), Some("debug"));
        assert_eq!(config.cli.build_type.as_deref(), Some("production"));
    }

    #[test]
    fn test_deserialize_minimal_uses_defaults() {
        let config: BuildConfig = serde_yaml::from_str("version: \"1.0\"\n").unwrap();
        assert_eq!(config.platforms, vec!["android", "ios", "mobileweb"]);
        assert!(config.sdk.root.is_none());
        assert!(config.cli.prompt);
    }

    #[test]
    fn test_is_available() {
        let config: BuildConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert!(config.is_available("ios"));
        assert!(!config.is_available("mobileweb"));
    }

    #[test]
    fn test_discover_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = BuildConfig::discover(Some(&dir.path().join("nope.yml")));
        assert!(matches!(result, Err(ConfigFileError::Io(_))));
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");

        let original: BuildConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        original.save(&path).unwrap();

        let loaded = BuildConfig::load(&path).unwrap();
        assert_eq!(loaded.version, original.version);
        assert_eq!(loaded.platforms, original.platforms);
        assert_eq!(loaded.sdk.root, original.sdk.root);
        assert_eq!(loaded.cli.prompt, original.cli.prompt);
    }
}
