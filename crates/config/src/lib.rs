use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Local development backend, used when nothing else names one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_LOG_FILTER: &str = "info,app_shell=debug";
pub const BASE_URL_ENV: &str = "JOTTER_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub schema_version: u32,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            api: ApiConfig::default(),
            log_filter: default_log_filter(),
        }
    }
}

impl AppConfig {
    /// Applies the `JOTTER_API_URL` override. `lookup` is `std::env::var` in the binary.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(BASE_URL_ENV).filter(|url| !url.trim().is_empty()) {
            debug!(env = BASE_URL_ENV, "base url taken from environment");
            self.api.base_url = url.trim().to_string();
        }
    }

    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url.filter(|url| !url.trim().is_empty()) {
            self.api.base_url = url.trim().to_string();
        }
        self
    }
}

pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join("config.json"),
        }
    }

    pub fn from_default_location() -> Result<Self> {
        let mut dir = dirs::config_dir().context("failed to resolve config_dir")?;
        dir.push("jotter");
        Ok(Self::from_dir(dir))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_or_init(&self) -> Result<AppConfig> {
        if !self.path.exists() {
            let config = AppConfig::default();
            self.save(&config)?;
            return Ok(config);
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let mut config: AppConfig =
            serde_json::from_str(&raw).context("failed to parse app config json")?;
        let migrated = self.migrate(&mut config);
        let repaired = fill_blank_base_url(&mut config);
        if migrated || repaired {
            self.save(&config)?;
        }
        Ok(config)
    }

    pub fn save(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let text = serde_json::to_string_pretty(config).context("failed to serialize config")?;
        fs::write(&self.path, text)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }

    fn migrate(&self, config: &mut AppConfig) -> bool {
        if config.schema_version >= CURRENT_SCHEMA_VERSION {
            return false;
        }

        warn!(
            from = config.schema_version,
            to = CURRENT_SCHEMA_VERSION,
            "migrating app config schema"
        );

        config.schema_version = CURRENT_SCHEMA_VERSION;
        true
    }
}

fn fill_blank_base_url(config: &mut AppConfig) -> bool {
    if !config.api.base_url.trim().is_empty() {
        return false;
    }
    warn!(
        base_url = DEFAULT_BASE_URL,
        "config has no base url, using the default"
    );
    config.api.base_url = default_base_url();
    true
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn creates_default_config_when_missing() {
        let dir = tempdir().expect("tempdir");
        let store = ConfigStore::from_dir(dir.path());
        let config = store.load_or_init().expect("load default");
        assert_eq!(config.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert!(store.path().exists());
    }

    #[test]
    fn keeps_configured_base_url() {
        let dir = tempdir().expect("tempdir");
        let store = ConfigStore::from_dir(dir.path());
        let mut config = AppConfig::default();
        config.api.base_url = "https://notes.example.com/api".to_string();
        store.save(&config).expect("save");

        let loaded = store.load_or_init().expect("reload");
        assert_eq!(loaded, config);
    }

    #[test]
    fn migrates_legacy_file_with_blank_url() {
        let dir = tempdir().expect("tempdir");
        let store = ConfigStore::from_dir(dir.path());
        fs::write(store.path(), r#"{"api":{"base_url":"  "}}"#).expect("write legacy");

        let config = store.load_or_init().expect("migrate");
        assert_eq!(config.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);

        let raw = fs::read_to_string(store.path()).expect("read back");
        assert!(raw.contains("\"schema_version\": 1"));
    }

    #[test]
    fn blank_url_in_current_schema_falls_back_to_default() {
        let dir = tempdir().expect("tempdir");
        let store = ConfigStore::from_dir(dir.path());
        fs::write(
            store.path(),
            r#"{"schema_version":1,"api":{"base_url":""}}"#,
        )
        .expect("write config");

        let config = store.load_or_init().expect("load");
        assert_eq!(config.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);

        let reloaded = store.load_or_init().expect("reload");
        assert_eq!(reloaded, config);
    }

    #[test]
    fn environment_overrides_file_value() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(|key| {
            (key == BASE_URL_ENV).then(|| " http://10.0.0.2:8080 ".to_string())
        });
        assert_eq!(config.api.base_url, "http://10.0.0.2:8080");
    }

    #[test]
    fn blank_overrides_are_ignored() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(|_| Some(String::new()));
        let config = config.with_base_url(Some("   ".to_string()));
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn command_line_wins_over_environment() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(|_| Some("http://from-env".to_string()));
        let config = config.with_base_url(Some("http://from-cli".to_string()));
        assert_eq!(config.api.base_url, "http://from-cli");
    }
}
