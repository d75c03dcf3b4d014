//! HTTP plumbing: transport seam, retrying fetch client and batch fan-out.

mod batch;
mod fetch;
mod transport;

pub use batch::{BatchFetcher, DEFAULT_MAX_IN_FLIGHT};
pub use fetch::{FetchClient, FetchError, RetryPolicy};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport, TransportError};
