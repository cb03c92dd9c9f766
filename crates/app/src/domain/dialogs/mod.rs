//! Messenger Dialogs

pub mod models;
pub mod service;

pub use service::*;
