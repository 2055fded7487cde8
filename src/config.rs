//! TOML configuration parsing and validation.
//!
//! ```toml
//! [storage]
//! path = "./data/quiz_progress.json"
//!
//! [remote]
//! base_url = "https://docs.example.org/v1"
//! collection = "quiz_progress"
//! token_env = "GIFTS_REMOTE_TOKEN"
//! timeout_secs = 10
//!
//! [logging]
//! level = "warn"
//! ```
//!
//! `[remote]` and `[logging]` are optional. A `[[catalog.gifts]]` array
//! replaces the shipped gift partition; it is checked at startup and a
//! malformed partition is logged, not refused.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use gift_survey_core::{GiftCatalog, GiftDefinition};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub storage: StorageConfig,
    #[serde(default)]
    pub remote: Option<RemoteConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub catalog: Option<CatalogConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// JSON file holding every participant record.
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RemoteConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub base_url: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_token_env")]
    pub token_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_enabled() -> bool {
    true
}
fn default_collection() -> String {
    "quiz_progress".to_string()
}
fn default_token_env() -> String {
    "GIFTS_REMOTE_TOKEN".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "warn".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    pub gifts: Vec<GiftDefinition>,
}

impl Config {
    /// Local-only configuration storing records at `path`.
    pub fn minimal(path: &Path) -> Self {
        Self {
            storage: StorageConfig {
                path: path.to_path_buf(),
            },
            remote: None,
            logging: LoggingConfig::default(),
            catalog: None,
        }
    }

    /// The configured gift catalog, or the shipped one.
    pub fn catalog(&self) -> GiftCatalog {
        match &self.catalog {
            Some(c) => GiftCatalog::new(c.gifts.clone()),
            None => GiftCatalog::standard(),
        }
    }

    /// The active remote section, if any.
    pub fn remote(&self) -> Option<&RemoteConfig> {
        self.remote.as_ref().filter(|r| r.enabled)
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.storage.path.as_os_str().is_empty() {
        bail!("storage.path must not be empty");
    }

    if let Some(remote) = &config.remote {
        let url = reqwest::Url::parse(&remote.base_url)
            .with_context(|| format!("remote.base_url is not a valid URL: '{}'", remote.base_url))?;
        match url.scheme() {
            "http" | "https" => {}
            other => bail!("remote.base_url must use http or https, got '{}'", other),
        }
        if remote.collection.trim().is_empty() {
            bail!("remote.collection must not be empty");
        }
        if remote.timeout_secs == 0 {
            bail!("remote.timeout_secs must be > 0");
        }
    }

    if let Some(catalog) = &config.catalog {
        if catalog.gifts.is_empty() {
            bail!("catalog.gifts must define at least one gift");
        }
        for gift in &catalog.gifts {
            if gift.id.trim().is_empty() {
                bail!("catalog.gifts entries need a non-empty id");
            }
        }
    }

    Ok(config)
}

/// Starter configuration written by `gifts init`.
pub fn example_config(storage_path: &Path) -> String {
    format!(
        r#"# Gift Survey configuration.

[storage]
path = "{}"

# Remote document store, tried before the local file.
# The bearer token is read from the environment variable named in token_env.
# [remote]
# base_url = "https://docs.example.org/v1"
# collection = "quiz_progress"
# token_env = "GIFTS_REMOTE_TOKEN"
# timeout_secs = 10

[logging]
level = "warn"
"#,
        storage_path.display()
    )
}
