//! Bazaar
//!
//! Client-side domain model for the Bazaar marketplace: the shopping cart and
//! its seller groups, the checkout selection and its running total, paginated
//! listing pages and the navigation tab order. Everything here is synchronous
//! and free of I/O; fetching and persistence live in `bazaar-app`.

pub mod cart;
pub mod ids;
pub mod listing;
pub mod orders;
pub mod prelude;
pub mod prices;
pub mod selection;
pub mod sellers;
pub mod tabs;
