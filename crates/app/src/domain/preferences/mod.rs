//! Preferences
//!
//! Locally persisted user preferences. Currently only the order of the
//! bottom navigation tabs.

pub mod errors;
mod repository;
pub mod service;

pub use service::*;
