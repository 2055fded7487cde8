//! `gifts init`: write a starter config and an empty store file.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::config::{example_config, load_config, Config};

/// Default store location used when no config exists yet.
pub const DEFAULT_STORAGE_PATH: &str = "./data/quiz_progress.json";

pub fn run_init(config_path: &Path) -> Result<()> {
    let config = if config_path.exists() {
        println!("Config already exists: {}", config_path.display());
        load_config(config_path)?
    } else {
        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create config directory: {}", parent.display())
                })?;
            }
        }
        let storage = Path::new(DEFAULT_STORAGE_PATH);
        fs::write(config_path, example_config(storage))
            .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        println!("Wrote config: {}", config_path.display());
        Config::minimal(storage)
    };

    let path = &config.storage.path;
    if path.exists() {
        println!("Store already exists: {}", path.display());
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory: {}", parent.display()))?;
        }
    }
    fs::write(path, "{}\n")
        .with_context(|| format!("Failed to create store: {}", path.display()))?;
    println!("Created store: {}", path.display());
    Ok(())
}
