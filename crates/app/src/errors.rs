//! Errors surfaced to the UI.
//!
//! Every failure that reaches a store boundary is flattened into a
//! [`DomainError`]: a machine-readable code plus a message fit for a toast.

use bazaar::{
    cart::CartError, listing::ListingError, orders::OrderError, prices::PriceError,
    selection::SelectionError, tabs::TabOrderError,
};
use thiserror::Error;

use crate::api::ApiError;

pub const NETWORK: &str = "NETWORK";
pub const DECODE: &str = "DECODE";
pub const UNKNOWN_OFFER: &str = "UNKNOWN_OFFER";
pub const INVALID_PRICE: &str = "INVALID_PRICE";
pub const EMPTY_SELECTION: &str = "EMPTY_SELECTION";
pub const STORAGE: &str = "STORAGE";
pub const INVALID_CART: &str = "INVALID_CART";
pub const INVALID_TAB: &str = "INVALID_TAB";
pub const STALE_PAGE: &str = "STALE_PAGE";

/// A user-facing error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DomainError {
    /// Server error code, or one of the client codes in this module.
    pub code: String,

    /// Human readable message.
    pub message: String,
}

impl DomainError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<ApiError> for DomainError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Server { code, message } => Self { code, message },
            ApiError::Http(source) => Self::new(NETWORK, source.to_string()),
            ApiError::Status { status, body } => {
                let message = if body.is_empty() {
                    format!("Request failed with status {status}")
                } else {
                    body
                };

                Self::new(format!("HTTP_{status}"), message)
            }
            ApiError::Decode(source) => Self::new(DECODE, source.to_string()),
            ApiError::MissingPayload => Self::new(DECODE, ApiError::MissingPayload.to_string()),
            ApiError::Price(source) => source.into(),
        }
    }
}

impl From<PriceError> for DomainError {
    fn from(error: PriceError) -> Self {
        Self::new(INVALID_PRICE, error.to_string())
    }
}

impl From<CartError> for DomainError {
    fn from(error: CartError) -> Self {
        let code = match error {
            CartError::UnknownOffer(_) => UNKNOWN_OFFER,
            CartError::DuplicateOffer(_) => INVALID_CART,
            CartError::CurrencyMismatch(..) => INVALID_PRICE,
        };

        Self::new(code, error.to_string())
    }
}

impl From<SelectionError> for DomainError {
    fn from(error: SelectionError) -> Self {
        match error {
            SelectionError::UnknownOffer(_) => Self::new(UNKNOWN_OFFER, error.to_string()),
            SelectionError::Price(source) => source.into(),
        }
    }
}

impl From<OrderError> for DomainError {
    fn from(error: OrderError) -> Self {
        match error {
            OrderError::EmptySelection => Self::new(EMPTY_SELECTION, error.to_string()),
            OrderError::UnknownOffer(_) => Self::new(UNKNOWN_OFFER, error.to_string()),
            OrderError::Price(source) => source.into(),
        }
    }
}

impl From<ListingError> for DomainError {
    fn from(error: ListingError) -> Self {
        Self::new(STALE_PAGE, error.to_string())
    }
}

impl From<TabOrderError> for DomainError {
    fn from(error: TabOrderError) -> Self {
        Self::new(INVALID_TAB, error.to_string())
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(error: sqlx::Error) -> Self {
        Self::new(STORAGE, error.to_string())
    }
}
