//! Bazaar Domain Concerns

pub mod carts;
pub mod dialogs;
pub mod listings;
pub mod preferences;
