//! HTTP client and fetch orchestration against the upstream deals site.
//!
//! One search term turns into: fetch the search page, extract candidate
//! offer URLs, fetch each offer page up to the caller's limit with a
//! pacing delay between consecutive fetches, decode and normalize each
//! page. Individual offer pages that 404, time out, or carry no payload
//! are skipped; partial results are the expected outcome. Only a failed
//! search-page fetch surfaces as an error.

use std::time::Duration;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::{Client, Url};
use tilbud_core::Offer;

use crate::decode::decode_offer_payload;
use crate::error::ScrapeError;
use crate::extract::extract_offer_urls;
use crate::normalize::normalize_offer;

/// Production origin of the deals site.
pub const UPSTREAM_ORIGIN: &str = "https://etilbudsavis.dk";

/// Search-results path; the term is percent-encoded into it.
const SEARCH_PATH: &str = "soeg";

/// Client for the upstream deals site.
///
/// Use [`DealsClient::new`] for production or
/// [`DealsClient::with_base_url`] to point at a mock server in tests.
pub struct DealsClient {
    client: Client,
    origin: String,
}

impl DealsClient {
    /// Creates a client pointed at the production site.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, ScrapeError> {
        Self::with_base_url(timeout_secs, user_agent, UPSTREAM_ORIGIN)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ScrapeError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let parsed = Url::parse(base_url).map_err(|e| ScrapeError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        let origin = parsed.as_str().trim_end_matches('/').to_string();

        Ok(Self { client, origin })
    }

    /// Origin all extracted offer URLs must live on.
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Search-results URL for a term.
    #[must_use]
    pub fn search_url(&self, term: &str) -> String {
        let encoded = utf8_percent_encode(term, NON_ALPHANUMERIC);
        format!("{}/{SEARCH_PATH}/{encoded}", self.origin)
    }

    /// Fetch canonical offers for one search term.
    ///
    /// Paces consecutive offer-page fetches by `delay` to avoid
    /// hammering the upstream site. Pages that fail to fetch or decode
    /// are skipped, never fatal for the batch.
    ///
    /// # Errors
    ///
    /// Returns an error only when the search page itself cannot be
    /// fetched; everything below that degrades to partial results.
    pub async fn fetch_offers(
        &self,
        term: &str,
        limit: usize,
        delay: Duration,
    ) -> Result<Vec<Offer>, ScrapeError> {
        let search_url = self.search_url(term);
        let html = self.fetch_page(&search_url).await?;
        let urls = extract_offer_urls(&html, &self.origin);
        tracing::debug!(term, candidates = urls.len(), "extracted offer URLs");

        let mut offers = Vec::new();
        for (index, url) in urls.iter().take(limit).enumerate() {
            if index > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let page = match self.fetch_page(url).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::debug!(url, error = %e, "offer page fetch failed; skipping");
                    continue;
                }
            };

            let Some(payload) = decode_offer_payload(&page) else {
                tracing::debug!(url, "no offer payload on page; skipping");
                continue;
            };

            offers.push(normalize_offer(&payload, url));
        }

        tracing::debug!(term, count = offers.len(), "normalized offers");
        Ok(offers)
    }

    async fn fetch_page(&self, url: &str) -> Result<String, ScrapeError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ScrapeError::NotFound {
                url: url.to_owned(),
            });
        }
        if !status.is_success() {
            return Err(ScrapeError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_url_percent_encodes_the_term() {
        let client = DealsClient::new(15, "test-agent").expect("client");
        assert_eq!(
            client.search_url("mælk"),
            "https://etilbudsavis.dk/soeg/m%C3%A6lk"
        );
        assert_eq!(
            client.search_url("rema 1000"),
            "https://etilbudsavis.dk/soeg/rema%201000"
        );
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client =
            DealsClient::with_base_url(15, "test-agent", "http://localhost:9999/").expect("client");
        assert_eq!(client.origin(), "http://localhost:9999");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = DealsClient::with_base_url(15, "test-agent", "not a url");
        assert!(matches!(result, Err(ScrapeError::InvalidBaseUrl { .. })));
    }
}
