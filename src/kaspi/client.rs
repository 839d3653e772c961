use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::RawOffer;

/// Client for the marketplace offer-listing endpoint.
#[derive(Debug, Clone)]
pub struct KaspiClient {
    base_url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct OffersResponse {
    #[serde(default)]
    offers: Vec<RawOffer>,
}

impl KaspiClient {
    pub fn new(base_url: Option<&str>, timeout_secs: Option<u64>) -> Result<Self> {
        let base_url = base_url
            .unwrap_or("https://kaspi.kz")
            .trim_end_matches('/')
            .to_string();
        let http = Client::builder()
            .user_agent("kaspi-parser/0.1")
            .timeout(Duration::from_secs(timeout_secs.unwrap_or(15)))
            .build()?;
        Ok(Self { base_url, http })
    }

    /// POST the offer listing for one product, scoped to a city.
    ///
    /// Protocol failures bubble up unmodified; a non-2xx status is an error
    /// as well. An absent `offers` array reads as zero offers.
    pub async fn fetch_offers(&self, product_id: &str, city_id: &str) -> Result<Vec<RawOffer>> {
        let url = format!("{}/yml/offer-view/offers/{}", self.base_url, product_id);
        let body = json!({ "cityId": city_id, "offersList": [product_id] });
        debug!(%url, product_id, city_id, "requesting offer listing");
        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let parsed: OffersResponse = resp.json().await?;
        Ok(parsed.offers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_offer_listing_payload() {
        let raw = r#"{
            "offersCount": 2,
            "offers": [
                {"merchantName": "A", "price": 100},
                {"merchantName": "B", "price": 150, "kaspiDelivery": true}
            ]
        }"#;
        let parsed: OffersResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.offers.len(), 2);
        assert_eq!(parsed.offers[0].merchant_name, "A");
        assert!(parsed.offers[1].kaspi_delivery);
    }

    #[test]
    fn payload_without_offers_array_reads_as_empty() {
        let parsed: OffersResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.offers.is_empty());
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = KaspiClient::new(Some("https://kaspi.kz/"), None).unwrap();
        assert_eq!(client.base_url, "https://kaspi.kz");
    }
}
