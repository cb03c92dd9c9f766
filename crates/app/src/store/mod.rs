//! Reactive state stores backing the UI screens.

pub mod cart;
pub mod paged;

pub use cart::{CartState, CartStore, Notice};
pub use paged::{DialogsFeed, ListingsFeed, PageSource, PagedState, PagedStore};
