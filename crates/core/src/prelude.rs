//! Bazaar prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, CartGroup, CartLine, OfferId, QuantityChange, clamp_quantity},
    ids::Id,
    listing::{
        ListingError, ListingItem, ListingPage, ListingQuery, PageChunk, PageRequest, SortOrder,
    },
    orders::{OrderDraft, OrderError, OrderId, OrderLine},
    prices::{Price, PriceError, line_total, parse_price},
    selection::{SelectedOffer, Selection, SelectionError},
    sellers::{Seller, SellerId},
    tabs::{Tab, TabOrder, TabOrderError},
};
