//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub dataset: DatasetConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Dataset location and rebuild policy
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Relative paths are resolved against `data_dir`
    #[serde(default = "default_profiles_dir")]
    pub profiles_dir: String,

    #[serde(default = "default_post_histories_dir")]
    pub post_histories_dir: String,

    #[serde(default = "default_merged_file")]
    pub merged_file: String,

    /// Rebuild the merged file even when one already exists
    #[serde(default)]
    pub overwrite: bool,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("discourse-dataset").to_string_lossy().to_string())
        .unwrap_or_else(|| "./datasets/Discourse".to_string())
}

fn default_profiles_dir() -> String {
    "json_files/profiles".to_string()
}

fn default_post_histories_dir() -> String {
    "json_files/post_histories".to_string()
}

fn default_merged_file() -> String {
    "posts.json".to_string()
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            profiles_dir: default_profiles_dir(),
            post_histories_dir: default_post_histories_dir(),
            merged_file: default_merged_file(),
            overwrite: false,
        }
    }
}

impl DatasetConfig {
    /// `data_dir` with a leading `~` expanded to the home directory
    pub fn data_root(&self) -> PathBuf {
        expand_home(&self.data_dir)
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.data_root().join(path)
    }

    pub fn profiles_path(&self) -> PathBuf {
        self.resolve(&self.profiles_dir)
    }

    pub fn post_histories_path(&self) -> PathBuf {
        self.resolve(&self.post_histories_dir)
    }

    pub fn merged_path(&self) -> PathBuf {
        self.resolve(&self.merged_file)
    }
}

fn expand_home(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return PathBuf::from(path),
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => PathBuf::from(path),
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load from the first default location that exists, or environment only
    ///
    /// A config file that exists but cannot be read or parsed is an error.
    pub fn load_default() -> Result<Self, ConfigError> {
        let config_paths: Vec<PathBuf> = [
            dirs::config_dir().map(|p| p.join("discourse-dataset").join("config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self::load_first(&config_paths)
    }

    fn load_first(config_paths: &[PathBuf]) -> Result<Self, ConfigError> {
        match config_paths.iter().find(|path| path.exists()) {
            Some(path) => Self::load_with_env(path),
            None => Self::from_env(),
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(data_dir) = var("DISCOURSE_DATASET_DATA_DIR") {
            self.dataset.data_dir = data_dir;
        }
        if let Some(overwrite) = var("DISCOURSE_DATASET_OVERWRITE") {
            match overwrite.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => self.dataset.overwrite = true,
                "0" | "false" | "no" => self.dataset.overwrite = false,
                _ => {
                    return Err(ConfigError::Env {
                        name: "DISCOURSE_DATASET_OVERWRITE",
                        value: overwrite,
                    })
                }
            }
        }

        if let Some(level) = var("DISCOURSE_DATASET_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("DISCOURSE_DATASET_LOG_FORMAT") {
            self.logging.format = format;
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid value for {name}: {value:?}")]
    Env { name: &'static str, value: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Discourse Dataset Configuration
#
# Environment variables override these settings:
# - DISCOURSE_DATASET_DATA_DIR
# - DISCOURSE_DATASET_OVERWRITE
# - DISCOURSE_DATASET_LOG_LEVEL
# - DISCOURSE_DATASET_LOG_FORMAT

[dataset]
# Root of the harvested dataset
data_dir = "~/.local/share/discourse-dataset"

# Per-user JSON files written by the converter (relative to data_dir)
profiles_dir = "json_files/profiles"
post_histories_dir = "json_files/post_histories"

# Merged flat list of posts (relative to data_dir)
merged_file = "posts.json"

# Rebuild the merged file even if it already exists
overwrite = false

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.dataset.profiles_dir, "json_files/profiles");
        assert_eq!(config.dataset.post_histories_dir, "json_files/post_histories");
        assert_eq!(config.dataset.merged_file, "posts.json");
        assert!(!config.dataset.overwrite);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.dataset.data_dir, "~/.local/share/discourse-dataset");
        assert_eq!(config.dataset.merged_file, "posts.json");
        assert!(!config.dataset.overwrite);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[dataset]\ndata_dir = \"/srv/slms\"\noverwrite = true\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();

        assert!(config.dataset.overwrite);
        assert_eq!(
            config.dataset.profiles_path(),
            PathBuf::from("/srv/slms/json_files/profiles")
        );
        assert_eq!(
            config.dataset.merged_path(),
            PathBuf::from("/srv/slms/posts.json")
        );
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_absolute_subdirectory_overrides_data_dir() {
        let config = Config::parse(
            "[dataset]\ndata_dir = \"/srv/slms\"\npost_histories_dir = \"/mnt/histories\"\n",
        )
        .unwrap();
        assert_eq!(
            config.dataset.post_histories_path(),
            PathBuf::from("/mnt/histories")
        );
    }

    #[test]
    fn test_home_is_expanded() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let config = Config::parse("[dataset]\ndata_dir = \"~/slms\"\n").unwrap();

        assert_eq!(config.dataset.data_root(), home.join("slms"));
        assert_eq!(
            config.dataset.merged_path(),
            home.join("slms").join("posts.json")
        );
    }

    #[test]
    fn test_tilde_inside_name_is_kept() {
        let config = Config::parse("[dataset]\ndata_dir = \"~slms/data\"\n").unwrap();
        assert_eq!(config.dataset.data_root(), PathBuf::from("~slms/data"));
    }

    #[test]
    fn test_load_first_reports_broken_file() {
        let dir = tempdir().unwrap();
        let broken = dir.path().join("config.toml");
        std::fs::write(&broken, "[dataset\ndata_dir = \"/srv/x\"").unwrap();

        let result = Config::load_first(&[dir.path().join("missing.toml"), broken]);

        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_load_first_takes_first_existing_file() {
        let dir = tempdir().unwrap();
        let second = dir.path().join("second.toml");
        std::fs::write(&second, "[dataset]\nmerged_file = \"all.json\"\n").unwrap();

        let config = Config::load_first(&[dir.path().join("first.toml"), second]).unwrap();
        assert_eq!(config.dataset.merged_file, "all.json");
    }

    #[test]
    fn test_load_first_without_files_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_first(&[dir.path().join("missing.toml")]).unwrap();
        assert_eq!(config.dataset.merged_file, "posts.json");
        assert_eq!(config.dataset.profiles_dir, "json_files/profiles");
    }

    #[test]
    fn test_load_errors() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(Config::load(&missing), Err(ConfigError::Io { .. })));

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[dataset\n").unwrap();
        assert!(matches!(Config::load(&broken), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("DISCOURSE_DATASET_DATA_DIR", "/data"),
            ("DISCOURSE_DATASET_OVERWRITE", "TRUE"),
            ("DISCOURSE_DATASET_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.dataset.data_dir, "/data");
        assert!(config.dataset.overwrite);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_unrecognized_overwrite_is_rejected() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(|key| {
                (key == "DISCOURSE_DATASET_OVERWRITE").then(|| "maybe".to_string())
            })
            .unwrap_err();

        assert!(matches!(err, ConfigError::Env { ref value, .. } if value == "maybe"));
        assert!(!config.dataset.overwrite);
    }
}
