//! [`MarketDataPort`] implementation over the Polygon REST API.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Url;

use super::decode::{DecodeError, decode_bar_series, decode_market_cap, decode_search_page};
use super::requests::RequestBuilder;
use crate::application::ports::{
    BarWindow, MarketCap, MarketDataError, MarketDataPort, ResponseKind, TickerBars,
};
use crate::domain::{BarSeries, SearchPage, Ticker};
use crate::infrastructure::http::{BatchFetcher, FetchClient};

/// Polygon market data adapter.
#[derive(Debug, Clone)]
pub struct PolygonMarketData {
    requests: RequestBuilder,
    client: FetchClient,
    batch: BatchFetcher,
}

impl PolygonMarketData {
    /// Create the adapter. Batches run at most `max_in_flight` requests at once.
    #[must_use]
    pub fn new(requests: RequestBuilder, client: FetchClient, max_in_flight: usize) -> Self {
        let batch = BatchFetcher::new(client.clone(), max_in_flight);
        Self {
            requests,
            client,
            batch,
        }
    }

    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, MarketDataError> {
        Ok(self.client.fetch(url).await?)
    }
}

#[async_trait]
impl MarketDataPort for PolygonMarketData {
    async fn snapshot_bars(
        &self,
        tickers: &[Ticker],
        window: BarWindow,
    ) -> Result<Vec<TickerBars>, MarketDataError> {
        let mut requests: Vec<(Ticker, Url)> = Vec::with_capacity(tickers.len());
        for ticker in tickers {
            if requests.iter().all(|(t, _)| t != ticker) {
                requests.push((ticker.clone(), self.requests.bars(ticker, window)));
            }
        }

        let urls: Vec<Url> = requests.iter().map(|(_, url)| url.clone()).collect();
        let bodies = self.batch.fetch_all(&urls).await?;

        Ok(requests
            .into_iter()
            .map(|(ticker, url)| {
                let result = bodies
                    .get(url.path())
                    .ok_or_else(|| DecodeError {
                        kind: ResponseKind::BarSeries,
                        message: "no response body for request path".to_string(),
                    })
                    .and_then(|body| decode_bar_series(body.as_slice()))
                    .map_err(MarketDataError::from);
                TickerBars { ticker, result }
            })
            .collect())
    }

    async fn history_bars(
        &self,
        ticker: &Ticker,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<BarSeries, MarketDataError> {
        let body = self
            .fetch(&self.requests.aggregate_bars(ticker, from, to))
            .await?;
        Ok(decode_bar_series(&body)?)
    }

    async fn market_cap(
        &self,
        ticker: &Ticker,
        as_of: NaiveDate,
    ) -> Result<MarketCap, MarketDataError> {
        let body = self.fetch(&self.requests.reference(ticker, as_of)).await?;
        Ok(decode_market_cap(&body)?)
    }

    async fn search(&self, term: &str) -> Result<SearchPage, MarketDataError> {
        let body = self.fetch(&self.requests.search(term)).await?;
        Ok(decode_search_page(&body)?)
    }
}
