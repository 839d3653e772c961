pub mod action_log;
pub mod aggregate;
pub mod config;
pub mod database_ops;
pub mod error;
pub mod export;
pub mod kaspi;

pub mod util {
    pub mod db;
    pub mod env;
}

use std::path::Path;

use anyhow::Result;
use serde_json::json;
use tracing::info;

use action_log::ActionLog;
use config::{ScrapeConfig, Seed};
use kaspi::client::KaspiClient;
use util::db::Db;

/// Outcome of one scrape run.
#[derive(Debug, Default, Clone)]
pub struct ScrapeSummary {
    /// Row id of the reconciled product, when the database step ran.
    pub product_row_id: Option<i64>,
    pub seller_count: i32,
    pub offers_inserted: u64,
    pub offers_skipped: u64,
}

/// End-to-end run for a single product page: seed -> extract id -> fetch
/// offers -> aggregate -> export -> reconcile into the store.
///
/// Strictly sequential; any failure aborts the remaining steps and
/// propagates (no partial-success reporting). Each completed stage appends
/// one entry to the injected action log.
pub async fn run_scrape(
    db: Option<&Db>,
    log: &ActionLog,
    seed_path: &Path,
    cfg: &ScrapeConfig,
    skip_export: bool,
) -> Result<ScrapeSummary> {
    let seed = Seed::load(seed_path)?;
    let product_id = kaspi::extract_product_id(&seed.product_url)?;
    info!(%product_id, url = %seed.product_url, "resolved product identifier");

    let client = KaspiClient::new(Some(&cfg.base_url), Some(cfg.timeout_secs))?;
    let offers = client.fetch_offers(&product_id, &cfg.city_id).await?;
    log.append(
        "fetch_offers",
        "ok",
        json!({ "product_id": product_id, "offers": offers.len() }),
    )?;

    let summary = aggregate::summarize(&offers)?;
    log.append(
        "aggregate",
        "ok",
        json!({ "name": summary.name, "seller_count": summary.seller_count }),
    )?;

    let mut run = ScrapeSummary {
        seller_count: summary.seller_count,
        ..Default::default()
    };

    if skip_export {
        info!("export step skipped");
    } else {
        let product_path = export::write_product(&cfg.export_dir, &summary)?;
        let offers_path = export::write_offers(&cfg.export_dir, &offers)?;
        log.append(
            "export",
            "ok",
            json!({
                "product_file": product_path.display().to_string(),
                "offers_file": offers_path.display().to_string(),
            }),
        )?;
    }

    match db {
        Some(db) => {
            let row_id = database_ops::upsert_product(db, &summary).await?;
            log.append("save_product", "ok", json!({ "row_id": row_id }))?;

            let stats = database_ops::insert_new_offers(db, &offers, row_id).await?;
            log.append(
                "save_offers",
                "ok",
                json!({ "inserted": stats.inserted, "skipped": stats.skipped }),
            )?;

            run.product_row_id = Some(row_id);
            run.offers_inserted = stats.inserted;
            run.offers_skipped = stats.skipped;
        }
        None => info!("database step skipped"),
    }

    Ok(run)
}
