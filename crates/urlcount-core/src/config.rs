use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Word counted when neither the config file nor the CLI names one.
pub const DEFAULT_TARGET_WORD: &str = "Go";

/// Worker count used when neither the config file nor the CLI sets one.
pub const DEFAULT_WORKERS: usize = 5;

/// Rejected configuration values.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("worker count must be at least 1")]
    ZeroWorkers,
    #[error("target word must not be empty")]
    EmptyTargetWord,
}

/// Global configuration loaded from `~/.config/urlcount/config.toml`.
/// Keys missing from the file take their default values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlCountConfig {
    /// Maximum number of concurrent fetch workers.
    pub workers: usize,
    /// Word whose non-overlapping occurrences are counted in each body.
    pub target_word: String,
    /// Connect timeout for each fetch, in seconds.
    pub connect_timeout_secs: u64,
    /// Optional total timeout for each fetch (None = no limit).
    pub timeout_secs: Option<u64>,
    /// Follow HTTP redirects.
    pub follow_redirects: bool,
    /// Redirect limit when `follow_redirects` is set.
    pub max_redirections: u32,
    /// Treat non-2xx responses as fetch failures instead of counting their body.
    pub require_success_status: bool,
    /// Optional User-Agent header.
    pub user_agent: Option<String>,
}

impl Default for UrlCountConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            target_word: DEFAULT_TARGET_WORD.to_string(),
            connect_timeout_secs: 15,
            timeout_secs: None,
            follow_redirects: true,
            max_redirections: 10,
            require_success_status: false,
            user_agent: None,
        }
    }
}

impl UrlCountConfig {
    /// Check values that would make a run degenerate (e.g. zero workers never drain jobs).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.target_word.is_empty() {
            return Err(ConfigError::EmptyTargetWord);
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("urlcount")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<UrlCountConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = UrlCountConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load configuration from an explicit file. The file must exist.
pub fn load_from_path(path: &Path) -> Result<UrlCountConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let cfg: UrlCountConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = UrlCountConfig::default();
        assert_eq!(cfg.workers, 5);
        assert_eq!(cfg.target_word, "Go");
        assert_eq!(cfg.connect_timeout_secs, 15);
        assert!(cfg.timeout_secs.is_none());
        assert!(cfg.follow_redirects);
        assert!(!cfg.require_success_status);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            workers = 12
            target_word = "Rust"
            connect_timeout_secs = 3
            timeout_secs = 20
            follow_redirects = false
            max_redirections = 2
            require_success_status = true
            user_agent = "urlcount-test"
        "#;
        let cfg: UrlCountConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.workers, 12);
        assert_eq!(cfg.target_word, "Rust");
        assert_eq!(cfg.timeout_secs, Some(20));
        assert!(!cfg.follow_redirects);
        assert_eq!(cfg.max_redirections, 2);
        assert!(cfg.require_success_status);
        assert_eq!(cfg.user_agent.as_deref(), Some("urlcount-test"));
    }

    #[test]
    fn config_toml_optional_fields_default() {
        let toml = r#"
            workers = 2
            target_word = "Go"
            connect_timeout_secs = 15
            follow_redirects = true
            max_redirections = 10
        "#;
        let cfg: UrlCountConfig = toml::from_str(toml).unwrap();
        assert!(cfg.timeout_secs.is_none());
        assert!(cfg.user_agent.is_none());
        assert!(!cfg.require_success_status);
    }

    #[test]
    fn config_toml_partial_file_fills_defaults() {
        let cfg: UrlCountConfig = toml::from_str("workers = 3\n").unwrap();
        assert_eq!(cfg.workers, 3);
        assert_eq!(cfg.target_word, "Go");
        assert_eq!(cfg.connect_timeout_secs, 15);
        assert!(cfg.follow_redirects);
        assert_eq!(cfg.max_redirections, 10);
        assert!(cfg.timeout_secs.is_none());

        let empty: UrlCountConfig = toml::from_str("").unwrap();
        assert_eq!(empty.workers, DEFAULT_WORKERS);
    }

    #[test]
    fn load_from_path_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "target_word = \"Rust\"\n").unwrap();
        let loaded = load_from_path(&path).unwrap();
        assert_eq!(loaded.target_word, "Rust");
        assert_eq!(loaded.workers, DEFAULT_WORKERS);
    }

    #[test]
    fn validate_rejects_zero_workers_and_empty_word() {
        let mut cfg = UrlCountConfig {
            workers: 0,
            ..UrlCountConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroWorkers));
        cfg.workers = 1;
        cfg.target_word.clear();
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyTargetWord));
    }

    #[test]
    fn load_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = UrlCountConfig::default();
        cfg.workers = 7;
        fs::write(&path, toml::to_string_pretty(&cfg).unwrap()).unwrap();
        let loaded = load_from_path(&path).unwrap();
        assert_eq!(loaded.workers, 7);
        assert_eq!(loaded.target_word, "Go");
    }

    #[test]
    fn load_from_path_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_from_path(&dir.path().join("nope.toml")).unwrap_err();
        assert!(format!("{:#}", err).contains("read config"));
    }
}
