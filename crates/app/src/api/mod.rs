//! Marketplace backend API

pub mod client;
mod errors;
pub(crate) mod wire;

pub use client::{ApiClient, ApiConfig};
pub use errors::ApiError;
