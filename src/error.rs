use thiserror::Error;

/// Failure kinds callers branch on. Transport (`reqwest::Error`) and store
/// (`sqlx::Error`) failures are propagated unmodified through `anyhow`.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The product URL carries no `/p/<slug>-<digits>/` segment. Fatal before
    /// any network call.
    #[error("product url does not match /p/<slug>-<digits>/: {url}")]
    MalformedUrl { url: String },

    /// The offer listing was empty, or none of the offers carried a price.
    /// Fatal before any write.
    #[error("no priced offers for product")]
    EmptyOfferSet,
}
