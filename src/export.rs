use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::aggregate::ProductSummary;
use crate::kaspi::RawOffer;

pub const PRODUCT_FILE: &str = "product.json";
pub const OFFERS_FILE: &str = "offers.jsonl";

/// Write the product summary as one pretty-printed document, replacing any
/// prior content wholesale.
pub fn write_product(dir: &Path, summary: &ProductSummary) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("create export dir {}", dir.display()))?;
    let path = dir.join(PRODUCT_FILE);
    let body = serde_json::to_string_pretty(summary)?;
    fs::write(&path, body).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

/// Write one offer record per line with snake_case field names, replacing
/// any prior content wholesale. Both export files are regenerated on every
/// run, so there is no cross-file atomicity to maintain.
pub fn write_offers(dir: &Path, offers: &[RawOffer]) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("create export dir {}", dir.display()))?;
    let path = dir.join(OFFERS_FILE);
    let mut body = String::new();
    for offer in offers {
        body.push_str(&serde_json::to_string(offer)?);
        body.push('\n');
    }
    fs::write(&path, body).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

/// Re-read a previously exported product document.
pub fn read_product(dir: &Path) -> Result<ProductSummary> {
    let path = dir.join(PRODUCT_FILE);
    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let summary = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(summary)
}
