use anyhow::Result;
use serde_json::Value;
use tracing::{info, instrument};

use crate::aggregate::ProductSummary;
use crate::kaspi::RawOffer;
use crate::util::db::Db;

/// Outcome of one `insert_new_offers` batch.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfferInsertStats {
    pub inserted: u64,
    pub skipped: u64,
}

/// Idempotently create both tables. No migration support; schema changes
/// mean dropping and re-scraping.
pub async fn ensure_schema(db: &Db) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS products (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            category TEXT,
            min_price DOUBLE PRECISION,
            max_price DOUBLE PRECISION,
            rating DOUBLE PRECISION,
            review_count INTEGER,
            seller_count INTEGER,
            images JSONB,
            specs JSONB
        )",
    )
    .execute(&db.pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS offers (
            id BIGSERIAL PRIMARY KEY,
            product_id BIGINT NOT NULL REFERENCES products(id) ON DELETE CASCADE,
            merchant_name TEXT NOT NULL,
            price DOUBLE PRECISION,
            merchant_rating DOUBLE PRECISION,
            merchant_reviews INTEGER,
            kaspi_delivery BOOLEAN
        )",
    )
    .execute(&db.pool)
    .await?;

    info!("ensured products and offers tables");
    Ok(())
}

/// Update-in-place by `name`, or insert a new row with a fresh id.
///
/// The lookup and the write run in one transaction so another writer
/// targeting the same name cannot interleave between them. All mutable
/// fields are overwritten; `name` is the identity and never changes here.
#[instrument(skip(db, summary), fields(product = %summary.name))]
pub async fn upsert_product(db: &Db, summary: &ProductSummary) -> Result<i64> {
    let images = Value::Array(summary.images.clone());
    let specs = Value::Object(summary.specs.clone());

    let mut tx = db.pool.begin().await?;
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM products WHERE name = $1")
        .bind(&summary.name)
        .fetch_optional(&mut *tx)
        .await?;

    let id = match existing {
        Some(id) => {
            sqlx::query(
                "UPDATE products
                 SET category = $1,
                     min_price = $2,
                     max_price = $3,
                     rating = $4,
                     review_count = $5,
                     seller_count = $6,
                     images = $7,
                     specs = $8
                 WHERE id = $9",
            )
            .bind(&summary.category)
            .bind(summary.min_price)
            .bind(summary.max_price)
            .bind(summary.rating)
            .bind(summary.review_count)
            .bind(summary.seller_count)
            .bind(&images)
            .bind(&specs)
            .bind(id)
            .execute(&mut *tx)
            .await?;
            info!(id, "updated existing product row");
            id
        }
        None => {
            let id: i64 = sqlx::query_scalar(
                "INSERT INTO products
                     (name, category, min_price, max_price, rating,
                      review_count, seller_count, images, specs)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                 RETURNING id",
            )
            .bind(&summary.name)
            .bind(&summary.category)
            .bind(summary.min_price)
            .bind(summary.max_price)
            .bind(summary.rating)
            .bind(summary.review_count)
            .bind(summary.seller_count)
            .bind(&images)
            .bind(&specs)
            .fetch_one(&mut *tx)
            .await?;
            info!(id, "inserted new product row");
            id
        }
    };

    tx.commit().await?;
    Ok(id)
}

/// Insert offers whose `(product_id, merchant_name)` pair is not stored yet.
///
/// Existing rows are left untouched: history is supplemented by offers from
/// new merchants, never overwritten. Safe to call repeatedly with
/// overlapping offer sets. The whole batch runs in one transaction, so a
/// failure mid-batch rolls back rather than leaving a partial insert.
#[instrument(skip(db, offers))]
pub async fn insert_new_offers(
    db: &Db,
    offers: &[RawOffer],
    product_id: i64,
) -> Result<OfferInsertStats> {
    let mut stats = OfferInsertStats::default();
    let mut tx = db.pool.begin().await?;

    for offer in offers {
        let existing: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM offers WHERE product_id = $1 AND merchant_name = $2",
        )
        .bind(product_id)
        .bind(&offer.merchant_name)
        .fetch_optional(&mut *tx)
        .await?;
        if existing.is_some() {
            stats.skipped += 1;
            continue;
        }

        sqlx::query(
            "INSERT INTO offers
                 (product_id, merchant_name, price, merchant_rating,
                  merchant_reviews, kaspi_delivery)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(product_id)
        .bind(&offer.merchant_name)
        .bind(offer.price)
        .bind(offer.merchant_rating)
        .bind(offer.merchant_reviews)
        .bind(offer.kaspi_delivery)
        .execute(&mut *tx)
        .await?;
        stats.inserted += 1;
    }

    tx.commit().await?;
    info!(
        product_id,
        inserted = stats.inserted,
        skipped = stats.skipped,
        "offer reconciliation finished"
    );
    Ok(stats)
}

/// Row counts for the ops CLI.
pub async fn count_rows(db: &Db) -> Result<(i64, i64)> {
    let products: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(&db.pool)
        .await?;
    let offers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM offers")
        .fetch_one(&db.pool)
        .await?;
    Ok((products, offers))
}
