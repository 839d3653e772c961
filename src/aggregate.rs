use serde::{Deserialize, Serialize};

use crate::error::ScrapeError;
use crate::kaspi::RawOffer;

/// Aggregated view of every offer for one product.
///
/// `name` doubles as the natural identity key when reconciling against
/// previously stored rows. `images` and `specs` are carried for the store
/// schema but stay empty in the current scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub name: String,
    pub category: Option<String>,
    pub min_price: f64,
    pub max_price: f64,
    /// Mean merchant rating rounded to one decimal; None when no offer
    /// carried a rating (distinct from zero).
    pub rating: Option<f64>,
    pub review_count: i32,
    /// Number of raw offers seen this run, priced or not.
    pub seller_count: i32,
    #[serde(default)]
    pub images: Vec<serde_json::Value>,
    #[serde(default)]
    pub specs: serde_json::Map<String, serde_json::Value>,
}

/// Fold raw offers into a product summary.
///
/// `name`/`category` come from the first offer: every offer in one listing
/// describes the same product, so disagreement is a data glitch and the
/// first entry wins. Offers without a price are excluded from the price
/// range but still count toward `seller_count`.
pub fn summarize(offers: &[RawOffer]) -> Result<ProductSummary, ScrapeError> {
    let first = offers.first().ok_or(ScrapeError::EmptyOfferSet)?;

    let mut prices = offers.iter().filter_map(|o| o.price);
    let mut min_price = prices.next().ok_or(ScrapeError::EmptyOfferSet)?;
    let mut max_price = min_price;
    for price in prices {
        if price < min_price {
            min_price = price;
        }
        if price > max_price {
            max_price = price;
        }
    }

    let ratings: Vec<f64> = offers.iter().filter_map(|o| o.merchant_rating).collect();
    let rating = if ratings.is_empty() {
        None
    } else {
        let mean = ratings.iter().sum::<f64>() / ratings.len() as f64;
        Some((mean * 10.0).round() / 10.0)
    };

    let review_count = offers.iter().filter_map(|o| o.merchant_reviews).sum();

    Ok(ProductSummary {
        name: first.title.clone().unwrap_or_default(),
        category: first.category.clone(),
        min_price,
        max_price,
        rating,
        review_count,
        seller_count: offers.len() as i32,
        images: Vec::new(),
        specs: serde_json::Map::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(
        merchant: &str,
        price: Option<f64>,
        rating: Option<f64>,
        reviews: Option<i32>,
    ) -> RawOffer {
        RawOffer {
            merchant_name: merchant.to_string(),
            price,
            merchant_rating: rating,
            merchant_reviews: reviews,
            kaspi_delivery: false,
            title: Some("Example Product".to_string()),
            category: Some("Phones".to_string()),
        }
    }

    #[test]
    fn aggregates_two_priced_offers() {
        let offers = vec![
            offer("A", Some(100.0), Some(4.0), Some(10)),
            offer("B", Some(150.0), Some(5.0), Some(20)),
        ];
        let summary = summarize(&offers).unwrap();
        assert_eq!(summary.min_price, 100.0);
        assert_eq!(summary.max_price, 150.0);
        assert_eq!(summary.rating, Some(4.5));
        assert_eq!(summary.review_count, 30);
        assert_eq!(summary.seller_count, 2);
        assert_eq!(summary.name, "Example Product");
        assert_eq!(summary.category.as_deref(), Some("Phones"));
        assert!(summary.images.is_empty());
        assert!(summary.specs.is_empty());
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(summarize(&[]), Err(ScrapeError::EmptyOfferSet)));
    }

    #[test]
    fn input_with_no_priced_offer_is_rejected() {
        let offers = vec![offer("A", None, Some(4.0), Some(3))];
        assert!(matches!(
            summarize(&offers),
            Err(ScrapeError::EmptyOfferSet)
        ));
    }

    #[test]
    fn unpriced_offers_still_count_as_sellers() {
        let offers = vec![
            offer("A", Some(100.0), None, None),
            offer("B", None, None, None),
        ];
        let summary = summarize(&offers).unwrap();
        assert_eq!(summary.seller_count, 2);
        assert_eq!(summary.min_price, 100.0);
        assert_eq!(summary.max_price, 100.0);
        assert_eq!(summary.rating, None);
        assert_eq!(summary.review_count, 0);
    }

    #[test]
    fn rating_rounds_to_one_decimal() {
        let offers = vec![
            offer("A", Some(10.0), Some(4.0), None),
            offer("B", Some(10.0), Some(4.0), None),
            offer("C", Some(10.0), Some(5.0), None),
        ];
        // mean 4.333... -> 4.3
        assert_eq!(summarize(&offers).unwrap().rating, Some(4.3));
    }

    #[test]
    fn price_range_is_drawn_from_input_prices() {
        let offers = vec![
            offer("A", Some(120.0), None, None),
            offer("B", Some(90.0), None, None),
            offer("C", Some(199.0), None, None),
        ];
        let summary = summarize(&offers).unwrap();
        assert!(summary.min_price <= summary.max_price);
        for bound in [summary.min_price, summary.max_price] {
            assert!(offers.iter().any(|o| o.price == Some(bound)));
        }
    }

    #[test]
    fn first_offer_wins_name_and_category() {
        let mut a = offer("A", Some(5.0), None, None);
        a.title = Some("First".into());
        a.category = Some("Cat1".into());
        let mut b = offer("B", Some(6.0), None, None);
        b.title = Some("Second".into());
        b.category = Some("Cat2".into());
        let summary = summarize(&[a, b]).unwrap();
        assert_eq!(summary.name, "First");
        assert_eq!(summary.category.as_deref(), Some("Cat1"));
    }

    #[test]
    fn untitled_first_offer_yields_empty_name() {
        let mut a = offer("A", Some(5.0), None, None);
        a.title = None;
        a.category = None;
        let summary = summarize(&[a]).unwrap();
        assert_eq!(summary.name, "");
        assert_eq!(summary.category, None);
    }
}
