//! Orders

use thiserror::Error;

use crate::{
    cart::{Cart, OfferId},
    ids::Id,
    prices::{Price, PriceError},
    selection::Selection,
};

/// Order Id
pub type OrderId = Id<OrderDraft>;

/// Errors raised while turning a selection into an order.
#[derive(Debug, Error, PartialEq)]
pub enum OrderError {
    /// Nothing is selected.
    #[error("nothing is selected")]
    EmptySelection,

    /// A selected offer has left the cart.
    #[error("offer {0} is not in the cart")]
    UnknownOffer(OfferId),

    /// Wrapped price arithmetic error.
    #[error(transparent)]
    Price(#[from] PriceError),
}

/// A single line of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLine {
    /// Offer to buy.
    pub offer_id: OfferId,

    /// Units to buy.
    pub quantity: u32,
}

/// An order ready to be submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    /// Lines in cart order.
    pub lines: Vec<OrderLine>,

    /// Expected total.
    pub total: Price,
}

impl OrderDraft {
    /// Build an order from the selected lines of `cart`.
    ///
    /// # Errors
    ///
    /// Returns an [`OrderError`] when nothing is selected, a selected offer is
    /// missing from the cart, or the total overflows.
    pub fn from_selection(cart: &Cart, selection: &Selection) -> Result<Self, OrderError> {
        if selection.is_empty() {
            return Err(OrderError::EmptySelection);
        }

        if let Some(missing) = selection.iter().find(|entry| !cart.contains(entry.offer_id)) {
            return Err(OrderError::UnknownOffer(missing.offer_id));
        }

        let lines = selection
            .offer_ids(cart)
            .into_iter()
            .filter_map(|offer| selection.get(offer))
            .map(|entry| OrderLine {
                offer_id: entry.offer_id,
                quantity: entry.quantity,
            })
            .collect();

        Ok(Self {
            lines,
            total: selection.total(cart.currency())?,
        })
    }

    /// Offers covered by the order.
    pub fn offer_ids(&self) -> Vec<OfferId> {
        self.lines.iter().map(|line| line.offer_id).collect()
    }
}
