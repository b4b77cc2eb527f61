//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding draft folders (each with a `draft_content.json`).
    pub drafts_dir: PathBuf,

    /// Directory where extracted templates are written.
    pub templates_dir: PathBuf,

    /// Suffix appended to a draft file when keeping the pre-write copy.
    #[serde(default = "default_backup_suffix")]
    pub backup_suffix: String,

    /// Default deduplication switches.
    #[serde(default)]
    pub dedup: DedupDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default switches for the deduplication randomizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupDefaults {
    pub speed: bool,
    pub mirror: bool,
    pub crop: bool,
    pub filter: bool,
    /// Recompute target durations after speed jitter.
    pub resync_duration: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "draftcut=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data = data_home().join("draftcut");
        Self {
            drafts_dir: data.join("drafts"),
            templates_dir: data.join("templates"),
            backup_suffix: default_backup_suffix(),
            dedup: DedupDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for DedupDefaults {
    fn default() -> Self {
        Self {
            speed: true,
            mirror: true,
            crop: true,
            filter: true,
            resync_duration: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(config_path: &std::path::Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }

    /// Resolve a draft argument: absolute or existing paths are used as-is,
    /// bare names are looked up under `drafts_dir`.
    pub fn resolve_draft(&self, draft: &str) -> PathBuf {
        let direct = PathBuf::from(draft);
        if direct.is_absolute() || direct.exists() {
            direct
        } else {
            self.drafts_dir.join(draft)
        }
    }
}

fn default_backup_suffix() -> String {
    ".bak".to_string()
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home().join(".config"));
    base.join("draftcut").join("config.json")
}

fn data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home().join(".local").join("share"))
}

fn home() -> PathBuf {
    PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_keep_documented_speed_behavior() {
        let config = AppConfig::default();
        assert_eq!(config.backup_suffix, ".bak");
        assert!(config.dedup.speed && config.dedup.mirror);
        assert!(!config.dedup.resync_duration);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let json = r#"{
            "drafts_dir": "/srv/drafts",
            "templates_dir": "/srv/templates",
            "logging": { "level": "debug", "json": true, "file": null },
            "dedup": { "crop": false }
        }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.backup_suffix, ".bak");
        assert!(!config.dedup.crop);
        assert!(config.dedup.filter);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_unreadable_config_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("draftcut_test_bad_config.json");
        std::fs::write(&path, "not json").unwrap();
        let config = AppConfig::load_from(&path);
        assert_eq!(config.logging.level, "info");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_resolve_draft_joins_bare_names() {
        let config = AppConfig {
            drafts_dir: PathBuf::from("/nonexistent/drafts"),
            ..AppConfig::default()
        };
        assert_eq!(
            config.resolve_draft("my-draft-that-does-not-exist"),
            PathBuf::from("/nonexistent/drafts/my-draft-that-does-not-exist")
        );
        assert_eq!(config.resolve_draft("/abs/path"), PathBuf::from("/abs/path"));
    }
}
