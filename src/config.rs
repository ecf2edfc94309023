//! Configuration file handling.
//!
//! # Configuration Location
//!
//! The first of these that applies is used:
//! - the path passed with `--config` (must exist)
//! - `.pkgscan.toml` in the current directory
//! - `<config dir>/pkgscan/config.toml`, where `<config dir>` is
//!   `~/.config` on Linux, `~/Library/Application Support` on macOS and
//!   `%APPDATA%` on Windows
//!
//! With none of them present the defaults are used.
//!
//! # Example Configuration
//!
//! ```toml
//! severity_level = "error"
//! registry_url = "https://example.com/compromised-packages.txt"
//! additional_packages = ["internal-leaked-pkg"]
//! exclude_directories = ["node_modules", ".git", "dist", "build"]
//! cache_timeout_minutes = 60
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cache::DEFAULT_CACHE_TIMEOUT_MINUTES;
use crate::error::ConfigError;

pub const DEFAULT_REGISTRY_URL: &str =
    "https://raw.githubusercontent.com/Cobenian/shai-hulud-detect/main/compromised-packages.txt";

/// Project-local config file name, looked up in the current directory.
pub const LOCAL_CONFIG_FILE: &str = ".pkgscan.toml";

/// How findings are reported to CI. Matching does not depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Application configuration.
///
/// # Example
///
/// ```no_run
/// use pkgscan::Config;
///
/// let config = Config::load(None)?;
/// println!("Registry: {}", config.registry_url);
/// # Ok::<(), pkgscan::error::ConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Level used for CI annotations.
    ///
    /// Valid values: "error", "warning", "info"
    /// Default: "error"
    pub severity_level: Severity,

    /// URL of the plain-text compromised package list.
    pub registry_url: String,

    /// Directory to scan when `--directory` is not given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_directory: Option<PathBuf>,

    /// Extra package names treated as compromised in every version.
    pub additional_packages: Vec<String>,

    /// Directory names skipped at any depth.
    ///
    /// Default: node_modules, .git, dist, build
    pub exclude_directories: Vec<String>,

    /// How long a cached list stays usable, in minutes.
    ///
    /// Default: 60
    pub cache_timeout_minutes: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            severity_level: Severity::default(),
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            root_directory: None,
            additional_packages: Vec::new(),
            exclude_directories: ["node_modules", ".git", "dist", "build"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            cache_timeout_minutes: DEFAULT_CACHE_TIMEOUT_MINUTES as i64,
        }
    }
}

impl Config {
    /// Loads and validates the configuration.
    ///
    /// # Errors
    ///
    /// Fails when an explicit path does not exist, when the chosen file
    /// cannot be read or parsed, or when validation fails.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Some(path) => Some(path.to_path_buf()),
            None => Self::discover(),
        };

        let config = match path {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading configuration");
                Self::from_file(&path)?
            }
            None => {
                tracing::debug!("no configuration file found, using defaults");
                Self::default()
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Reads a config file without validating it.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.is_file() {
            return Some(local);
        }

        let user = Self::config_path();
        user.is_file().then_some(user)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.registry_url).map_err(|e| ConfigError::InvalidUrl {
            url: self.registry_url.clone(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: self.registry_url.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        if self.cache_timeout_minutes < 0 {
            return Err(ConfigError::NegativeCacheTimeout(self.cache_timeout_minutes));
        }

        Ok(())
    }

    /// Cache timeout in minutes; negative values are clamped to zero.
    pub fn cache_timeout(&self) -> u64 {
        self.cache_timeout_minutes.max(0) as u64
    }

    /// Returns the path to the user configuration file.
    ///
    /// ```
    /// use pkgscan::Config;
    ///
    /// let path = Config::config_path();
    /// assert!(path.ends_with("pkgscan/config.toml"));
    /// ```
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pkgscan")
            .join("config.toml")
    }

    /// Writes the default template to `path`, creating parent directories.
    /// An existing file is only replaced when `force` is set.
    pub fn write_default(path: &Path, force: bool) -> Result<(), ConfigError> {
        if path.exists() && !force {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }

        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(path, Self::generate_default_config()).map_err(write_err)
    }

    /// Renders the commented template written by `pkgscan init`.
    pub fn generate_default_config() -> String {
        let defaults = Config::default();
        let excludes = defaults
            .exclude_directories
            .iter()
            .map(|d| format!("\"{}\"", d))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            r#"# pkgscan configuration

# Annotation level for CI output: "error", "warning" or "info".
severity_level = "{severity}"

# Plain-text list of compromised packages, one `name` or `name:version` per line.
registry_url = "{url}"

# Directory to scan when --directory is not given.
# root_directory = "."

# Extra package names to treat as compromised in every version.
additional_packages = []

# Directory names skipped at any depth.
exclude_directories = [{excludes}]

# Minutes a cached copy of the list stays usable when the URL is unreachable.
cache_timeout_minutes = {timeout}
"#,
            severity = defaults.severity_level,
            url = defaults.registry_url,
            excludes = excludes,
            timeout = defaults.cache_timeout_minutes,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.severity_level, Severity::Error);
        assert_eq!(config.registry_url, DEFAULT_REGISTRY_URL);
        assert_eq!(config.root_directory, None);
        assert!(config.additional_packages.is_empty());
        assert_eq!(
            config.exclude_directories,
            ["node_modules", ".git", "dist", "build"]
        );
        assert_eq!(config.cache_timeout_minutes, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "severity_level = \"warning\"\nadditional_packages = [\"leaked-pkg\"]\n",
        );

        let config = Config::load(Some(&path)).unwrap();

        assert_eq!(config.severity_level, Severity::Warning);
        assert_eq!(config.additional_packages, ["leaked-pkg"]);
        assert_eq!(config.registry_url, DEFAULT_REGISTRY_URL);
        assert_eq!(config.exclude_directories.len(), 4);
    }

    #[test]
    fn test_missing_explicit_path() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_invalid_severity() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "severity_level = \"fatal\"\n");

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_invalid_url() {
        let config = Config {
            registry_url: "not a url".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUrl { .. })
        ));

        let config = Config {
            registry_url: "ftp://example.com/list.txt".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_negative_cache_timeout() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "cache_timeout_minutes = -5\n");

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::NegativeCacheTimeout(-5)));
    }

    #[test]
    fn test_zero_cache_timeout_is_valid() {
        let config = Config {
            cache_timeout_minutes: 0,
            ..Config::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.cache_timeout(), 0);
    }

    #[test]
    fn test_generated_template_parses_to_defaults() {
        let template = Config::generate_default_config();
        let parsed: Config = toml::from_str(&template).unwrap();

        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_write_default_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/dir/.pkgscan.toml");

        Config::write_default(&path, false).unwrap();

        assert_eq!(Config::from_file(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_write_default_refuses_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "severity_level = \"info\"\n");

        let err = Config::write_default(&path, false).unwrap_err();

        assert!(matches!(err, ConfigError::AlreadyExists(ref p) if p == &path));
        assert_eq!(fs::read_to_string(&path).unwrap(), "severity_level = \"info\"\n");
    }

    #[test]
    fn test_write_default_force_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "severity_level = \"info\"\n");

        Config::write_default(&path, true).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            Config::generate_default_config()
        );
    }
}
