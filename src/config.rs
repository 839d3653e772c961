use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::util::env::{env_opt, env_parse};

/// The seed file is the only required input besides network access:
/// `{"product_url": "<string>"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Seed {
    pub product_url: String,
}

impl Seed {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read seed file {}", path.display()))?;
        let seed = serde_json::from_str(&raw)
            .with_context(|| format!("parse seed file {}", path.display()))?;
        Ok(seed)
    }
}

/// Runtime knobs with env-backed defaults; CLI flags override on top.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub base_url: String,
    /// Marketplace city the offer listing is scoped to.
    pub city_id: String,
    pub timeout_secs: u64,
    pub export_dir: PathBuf,
    pub log_file: PathBuf,
}

impl ScrapeConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: env_opt("KASPI_BASE_URL").unwrap_or_else(|| "https://kaspi.kz".into()),
            city_id: env_opt("KASPI_CITY_ID").unwrap_or_else(|| "750000000".into()),
            timeout_secs: env_parse("KASPI_TIMEOUT_SECS", 15),
            export_dir: env_opt("EXPORT_DIR").unwrap_or_else(|| "export".into()).into(),
            log_file: env_opt("ACTION_LOG_FILE")
                .unwrap_or_else(|| "logs/log.json".into())
                .into(),
        }
    }
}
