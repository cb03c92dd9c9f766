//! Cart Lines

use crate::{
    ids::Id,
    prices::{Price, PriceError, line_total},
    sellers::SellerId,
};

/// Offer Id
pub type OfferId = Id<CartLine>;

/// A single product entry in the user's basket.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    /// The offer this line is for.
    pub offer_id: OfferId,

    /// The seller publishing the offer.
    pub seller_id: SellerId,

    /// Offer title as shown to the user.
    pub title: String,

    /// Price of a single unit.
    pub price_per_item: Price,

    /// Units the seller has in stock.
    pub available_quantity: u32,

    /// Units the user intends to buy.
    pub selected_quantity: u32,

    /// Whether the offer can be bought through the safe-deal checkout.
    pub safe_deal_eligible: bool,
}

impl CartLine {
    /// Clamp `requested` to the quantities this line can hold.
    pub fn clamp_quantity(&self, requested: i64) -> u32 {
        clamp_quantity(requested, self.available_quantity)
    }

    /// Price of the selected quantity.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] if the total does not fit in minor units.
    pub fn total(&self) -> Result<Price, PriceError> {
        line_total(&self.price_per_item, self.selected_quantity)
    }
}

/// Clamp a requested quantity into `[1, available]`.
///
/// A line with nothing in stock still holds one unit; the range collapses to `[1, 1]`.
pub fn clamp_quantity(requested: i64, available: u32) -> u32 {
    let upper = available.max(1);

    u32::try_from(requested.clamp(1, i64::from(upper))).unwrap_or(upper)
}
