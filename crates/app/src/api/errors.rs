//! API client errors.

use bazaar::prices::PriceError;
use thiserror::Error;

/// Errors raised while talking to the marketplace backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure: connection, timeout, TLS, body read.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with an error envelope.
    #[error("{message} ({code})")]
    Server { code: String, message: String },

    /// Non-2xx status without a readable error envelope.
    #[error("unexpected response status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A success envelope came back without the expected payload.
    #[error("response has no payload")]
    MissingPayload,

    /// A price in the response could not be read.
    #[error(transparent)]
    Price(#[from] PriceError),
}
