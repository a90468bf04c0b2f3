//! Show or initialize the configuration file.

use std::path::PathBuf;

use anyhow::Context;
use autosquelch_common::config::{config_file_path, AppConfig};

pub fn run(config: &AppConfig, explicit: Option<PathBuf>, init: bool) -> anyhow::Result<()> {
    let path = explicit.clone().unwrap_or_else(config_file_path);

    if init {
        if path.exists() {
            anyhow::bail!(
                "{} already exists; remove it first to reset to defaults",
                path.display()
            );
        }
        let defaults = AppConfig::default();
        let written = match explicit {
            Some(path) => defaults.save_to(&path).map(|()| path),
            None => defaults.save(),
        }
        .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Wrote default configuration to {}", written.display());
        return Ok(());
    }

    println!("# {}", path.display());
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
