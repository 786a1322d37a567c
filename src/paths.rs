use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

const APP_DIR: &str = "anishelf";

pub fn database_file_path() -> Result<PathBuf> {
    if let Some(custom) = env::var_os("ANISHELF_DB").filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(custom));
    }
    Ok(data_dir()?.join("anishelf.db"))
}

pub fn config_file_path() -> Result<PathBuf> {
    if let Some(custom) = env::var_os("ANISHELF_CONFIG").filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(custom));
    }
    let base = dirs::config_dir().context("unable to resolve config directory")?;
    Ok(base.join(APP_DIR).join("config.toml"))
}

pub fn log_dir() -> Result<PathBuf> {
    Ok(data_dir()?.join("logs"))
}

fn data_dir() -> Result<PathBuf> {
    let base = dirs::data_dir().context("unable to resolve data directory")?;
    Ok(base.join(APP_DIR))
}
