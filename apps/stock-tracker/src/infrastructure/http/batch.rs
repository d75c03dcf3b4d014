//! Bounded fan-out of fetches keyed by URL path.

use std::collections::{HashMap, HashSet};

use futures::{StreamExt, TryStreamExt, stream};
use reqwest::Url;

use super::fetch::{FetchClient, FetchError};

/// Default number of requests in flight at once.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 4;

/// Runs a batch of fetches through one [`FetchClient`].
///
/// Every member gets its own retry budget. The first unrecoverable failure
/// fails the whole batch and drops the remaining requests.
#[derive(Debug, Clone)]
pub struct BatchFetcher {
    client: FetchClient,
    max_in_flight: usize,
}

impl BatchFetcher {
    /// Create a fetcher with at most `max_in_flight` concurrent requests.
    ///
    /// A cap of zero is raised to one.
    #[must_use]
    pub fn new(client: FetchClient, max_in_flight: usize) -> Self {
        Self {
            client,
            max_in_flight: max_in_flight.max(1),
        }
    }

    /// Concurrency cap.
    #[must_use]
    pub const fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    /// Fetch every URL and key the bodies by URL path.
    ///
    /// Identical URLs are requested once. Distinct URLs sharing a path
    /// collapse to a single entry.
    ///
    /// # Errors
    ///
    /// Returns the first [`FetchError`] produced by any member.
    pub async fn fetch_all(&self, urls: &[Url]) -> Result<HashMap<String, Vec<u8>>, FetchError> {
        let mut seen = HashSet::new();
        let unique: Vec<Url> = urls
            .iter()
            .filter(|u| seen.insert(u.as_str()))
            .cloned()
            .collect();

        tracing::debug!(
            requested = urls.len(),
            unique = unique.len(),
            max_in_flight = self.max_in_flight,
            "Fetching batch"
        );

        stream::iter(unique)
            .map(|url| {
                let client = self.client.clone();
                async move {
                    let body = client.fetch(&url).await?;
                    Ok::<_, FetchError>((url.path().to_string(), body))
                }
            })
            .buffer_unordered(self.max_in_flight)
            .try_collect()
            .await
    }
}
