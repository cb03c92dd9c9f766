//! Bazaar client application layer: backend services, reactive stores and
//! local preferences built on top of the `bazaar` core.

pub mod api;
pub mod config;
pub mod context;
pub mod database;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod session;
pub mod store;

#[cfg(test)]
mod test;
