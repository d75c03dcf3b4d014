//! Polygon adapter error and its mapping onto the market data port.

use thiserror::Error;

use super::decode::DecodeError;
use crate::application::ports::MarketDataError;
use crate::infrastructure::http::FetchError;

/// Polygon adapter error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolygonError {
    /// Request failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Response body did not decode.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl From<PolygonError> for MarketDataError {
    fn from(err: PolygonError) -> Self {
        match err {
            PolygonError::Fetch(FetchError::NotHttpResponse { message }) => {
                Self::Transport { message }
            }
            PolygonError::Fetch(FetchError::RateLimited) => Self::RateLimited,
            PolygonError::Fetch(FetchError::HttpStatus { code }) => Self::HttpStatus { code },
            PolygonError::Fetch(FetchError::Timeout) => Self::Timeout,
            PolygonError::Decode(DecodeError { kind, message }) => Self::Decode { kind, message },
        }
    }
}

impl From<FetchError> for MarketDataError {
    fn from(err: FetchError) -> Self {
        PolygonError::from(err).into()
    }
}

impl From<DecodeError> for MarketDataError {
    fn from(err: DecodeError) -> Self {
        PolygonError::from(err).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::ResponseKind;

    #[test]
    fn fetch_errors_map_one_to_one() {
        assert_eq!(
            MarketDataError::from(FetchError::RateLimited),
            MarketDataError::RateLimited
        );
        assert_eq!(
            MarketDataError::from(FetchError::HttpStatus { code: 403 }),
            MarketDataError::HttpStatus { code: 403 }
        );
        assert_eq!(
            MarketDataError::from(FetchError::Timeout),
            MarketDataError::Timeout
        );
        assert_eq!(
            MarketDataError::from(FetchError::NotHttpResponse {
                message: "dns".to_string()
            }),
            MarketDataError::Transport {
                message: "dns".to_string()
            }
        );
    }

    #[test]
    fn decode_error_keeps_kind() {
        let err = MarketDataError::from(DecodeError {
            kind: ResponseKind::SearchPage,
            message: "eof".to_string(),
        });
        assert_eq!(
            err,
            MarketDataError::Decode {
                kind: ResponseKind::SearchPage,
                message: "eof".to_string()
            }
        );
    }
}
