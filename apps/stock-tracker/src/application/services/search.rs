//! Symbol search.

use std::sync::Arc;

use crate::application::ports::MarketDataPort;
use crate::domain::SearchPage;

use super::TrackerError;

/// Symbol lookup for the add-ticker flow.
pub struct SearchService {
    market: Arc<dyn MarketDataPort>,
}

impl std::fmt::Debug for SearchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchService").finish_non_exhaustive()
    }
}

impl SearchService {
    /// Create a search service.
    #[must_use]
    pub fn new(market: Arc<dyn MarketDataPort>) -> Self {
        Self { market }
    }

    /// Search active stock symbols matching `term`.
    ///
    /// A blank term returns an empty page without a request.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::MarketData`] on fetch or decode failure.
    pub async fn search(&self, term: &str) -> Result<SearchPage, TrackerError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(SearchPage::default());
        }
        let page = self.market.search(term).await?;
        tracing::debug!(term, hits = page.hits.len(), "Search completed");
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use super::*;
    use crate::application::ports::{MarketDataError, MockMarketDataPort};
    use crate::domain::{SearchHit, Ticker};

    fn hit(ticker: &str) -> SearchHit {
        SearchHit {
            ticker: Ticker::new(ticker),
            display_name: format!("{ticker} Inc."),
            market: "stocks".to_string(),
            locale: "us".to_string(),
            asset_type: "CS".to_string(),
            active: true,
            currency: "usd".to_string(),
            last_updated: "2024-03-01T00:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn trims_and_forwards_term() {
        let mut market = MockMarketDataPort::new();
        market
            .expect_search()
            .with(eq("apple"))
            .times(1)
            .returning(|_| {
                Ok(SearchPage {
                    hits: vec![hit("AAPL")],
                    count: 1,
                    next_url: None,
                })
            });

        let page = SearchService::new(Arc::new(market))
            .search("  apple ")
            .await
            .unwrap();

        assert_eq!(page.count, 1);
        assert_eq!(page.hits[0].ticker.as_str(), "AAPL");
    }

    #[tokio::test]
    async fn blank_term_skips_network() {
        let mut market = MockMarketDataPort::new();
        market.expect_search().times(0);

        let page = SearchService::new(Arc::new(market))
            .search("   ")
            .await
            .unwrap();

        assert!(page.hits.is_empty());
        assert_eq!(page.count, 0);
    }

    #[tokio::test]
    async fn upstream_failure_propagates() {
        let mut market = MockMarketDataPort::new();
        market
            .expect_search()
            .returning(|_| Err(MarketDataError::HttpStatus { code: 503 }));

        let err = SearchService::new(Arc::new(market))
            .search("msft")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            TrackerError::MarketData(MarketDataError::HttpStatus { code: 503 })
        ));
    }
}
