pub mod client;

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ScrapeError;

/// One merchant listing as returned by the offer endpoint.
///
/// Wire field names are camelCase; serialization uses the snake_case Rust
/// names, which is exactly what lands in `offers.jsonl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOffer {
    #[serde(rename(deserialize = "merchantName"))]
    pub merchant_name: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(rename(deserialize = "merchantRating"), default)]
    pub merchant_rating: Option<f64>,
    #[serde(rename(deserialize = "merchantReviewsQuantity"), default)]
    pub merchant_reviews: Option<i32>,
    #[serde(rename(deserialize = "kaspiDelivery"), default)]
    pub kaspi_delivery: bool,
    /// Product title as the merchant lists it; feeds the aggregator only.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename(deserialize = "masterCategory"), default)]
    pub category: Option<String>,
}

static PRODUCT_ID_RE: OnceLock<Regex> = OnceLock::new();

/// Pull the numeric product identifier out of a product page URL.
///
/// Product pages look like `https://kaspi.kz/shop/p/<slug>-<digits>/...`; the
/// digit run closing the `/p/` segment is the shop-wide product id.
pub fn extract_product_id(url: &str) -> Result<String, ScrapeError> {
    let re = PRODUCT_ID_RE
        .get_or_init(|| Regex::new(r"/p/[^/?#]*-(\d+)(?:[/?#]|$)").expect("static pattern"));
    re.captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ScrapeError::MalformedUrl {
            url: url.to_string(),
        })
}
