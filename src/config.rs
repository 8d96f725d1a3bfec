use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::Cli;
use crate::error::{Result, VaultError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub host: String,
    pub page_size: usize,
    pub order: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            host: "https://shikimori.one".to_string(),
            page_size: 8,
            order: "popularity".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub debounce_ms: u64,
    /// Ignore visibility triggers while a page is still being fetched
    pub guard_in_flight: bool,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            guard_in_flight: true,
        }
    }
}

impl FeedConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub feed: FeedConfig,
}

pub fn config_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("anivault").join("config.toml"))
}

impl Config {
    /// Load the config from the default location, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Config::default();
        };

        let Ok(content) = std::fs::read_to_string(&path) else {
            return Config::default();
        };

        match toml::from_str::<Config>(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                Config::default()
            }
        }
    }

    /// Load an explicitly requested config file; unlike `load`, failures are errors
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| VaultError::Config(e.to_string()))
    }

    pub fn resolve(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Config::from_path(path)?,
            None => Config::load(),
        };
        config.apply_overrides(cli);
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(host) = &cli.host {
            self.catalog.host = host.clone();
        }
        if let Some(order) = &cli.order {
            self.catalog.order = order.clone();
        }
        if let Some(debounce_ms) = cli.debounce_ms {
            self.feed.debounce_ms = debounce_ms;
        }
        if cli.no_guard {
            self.feed.guard_in_flight = false;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.catalog.page_size == 0 {
            return Err(VaultError::Config("catalog.page_size must be > 0".into()));
        }
        let host = &self.catalog.host;
        if !(host.starts_with("https://") || host.starts_with("http://")) {
            return Err(VaultError::Config(format!(
                "catalog.host must be an http(s) URL, got {:?}",
                host
            )));
        }
        if self.catalog.order.trim().is_empty() {
            return Err(VaultError::Config("catalog.order must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_valid_config() {
        let toml_str = r#"
[catalog]
host = "https://shikimori.example"
page_size = 16
order = "ranked"

[feed]
debounce_ms = 250
guard_in_flight = false
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.catalog.host, "https://shikimori.example");
        assert_eq!(config.catalog.page_size, 16);
        assert_eq!(config.catalog.order, "ranked");
        assert_eq!(config.feed.debounce(), Duration::from_millis(250));
        assert!(!config.feed.guard_in_flight);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: Config = toml::from_str("[feed]\ndebounce_ms = 100\n").unwrap();
        assert_eq!(config.catalog, CatalogConfig::default());
        assert_eq!(config.feed.debounce_ms, 100);
        assert!(config.feed.guard_in_flight);
    }

    #[test]
    fn defaults_match_catalog_endpoint() {
        let config = Config::default();
        assert_eq!(config.catalog.host, "https://shikimori.one");
        assert_eq!(config.catalog.page_size, 8);
        assert_eq!(config.catalog.order, "popularity");
        assert_eq!(config.feed.debounce(), Duration::from_millis(500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_page_size() {
        let mut config = Config::default();
        config.catalog.page_size = 0;
        assert!(matches!(config.validate(), Err(VaultError::Config(_))));
    }

    #[test]
    fn validate_rejects_non_http_host() {
        let mut config = Config::default();
        config.catalog.host = "shikimori.one".to_string();
        assert!(matches!(config.validate(), Err(VaultError::Config(_))));
    }

    #[test]
    fn cli_overrides_config() {
        let cli = Cli::parse_from([
            "anivault",
            "--host",
            "http://localhost:3000",
            "--order",
            "ranked",
            "--debounce-ms",
            "50",
            "--no-guard",
        ]);
        let mut config = Config::default();
        config.apply_overrides(&cli);
        assert_eq!(config.catalog.host, "http://localhost:3000");
        assert_eq!(config.catalog.order, "ranked");
        assert_eq!(config.feed.debounce_ms, 50);
        assert!(!config.feed.guard_in_flight);
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let err = Config::from_path(Path::new("/nonexistent/anivault.toml")).unwrap_err();
        assert!(matches!(err, VaultError::Io(_)));
    }
}
