//! Cart
//!
//! The cart aggregate owns the flat list of [`CartLine`]s returned by the
//! backend. Seller groups are a derived view and are rebuilt from the lines on
//! every call to [`Cart::groups`].

use rusty_money::iso::Currency;
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use crate::{
    prices::{Price, PriceError, sum},
    sellers::{Seller, SellerId},
};

pub mod group;
pub mod line;

pub use group::{CartGroup, group_by_seller};
pub use line::{CartLine, OfferId, clamp_quantity};

/// Errors related to cart construction and mutation.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// The offer is not in the cart.
    #[error("offer {0} is not in the cart")]
    UnknownOffer(OfferId),

    /// The backend returned the same offer twice.
    #[error("offer {0} appears more than once")]
    DuplicateOffer(OfferId),

    /// A line's currency differs from the cart currency (offer, line currency, cart currency).
    #[error("offer {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(OfferId, &'static str, &'static str),
}

/// Outcome of a local quantity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityChange {
    /// The offer that changed.
    pub offer_id: OfferId,

    /// Quantity before the change.
    pub previous: u32,

    /// Quantity after clamping.
    pub applied: u32,
}

impl QuantityChange {
    /// Whether clamping left the line as it was.
    pub fn is_noop(&self) -> bool {
        self.previous == self.applied
    }
}

/// The user's basket.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
    sellers: FxHashMap<SellerId, Seller>,
    currency: &'static Currency,
}

impl Cart {
    /// Create an empty cart.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            lines: Vec::new(),
            sellers: FxHashMap::default(),
            currency,
        }
    }

    /// Create a cart from lines and the sellers publishing them.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if an offer appears twice or a line is priced in
    /// a different currency.
    pub fn with_lines(
        currency: &'static Currency,
        sellers: impl IntoIterator<Item = Seller>,
        lines: impl Into<Vec<CartLine>>,
    ) -> Result<Self, CartError> {
        let lines = lines.into();
        let mut seen = FxHashSet::default();

        for line in &lines {
            if !seen.insert(line.offer_id) {
                return Err(CartError::DuplicateOffer(line.offer_id));
            }

            let line_currency = line.price_per_item.currency();

            if line_currency != currency {
                return Err(CartError::CurrencyMismatch(
                    line.offer_id,
                    line_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ));
            }
        }

        Ok(Self {
            lines,
            sellers: sellers
                .into_iter()
                .map(|seller| (seller.id, seller))
                .collect(),
            currency,
        })
    }

    /// Flatten seller groups back into a cart.
    ///
    /// # Errors
    ///
    /// See [`Cart::with_lines`].
    pub fn from_groups(
        currency: &'static Currency,
        groups: impl IntoIterator<Item = CartGroup>,
    ) -> Result<Self, CartError> {
        let mut sellers = Vec::new();
        let mut lines = Vec::new();

        for group in groups {
            lines.extend(group.lines);
            sellers.push(group.seller);
        }

        Self::with_lines(currency, sellers, lines)
    }

    /// Lines in server order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Find the line for an offer.
    pub fn line(&self, offer: OfferId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.offer_id == offer)
    }

    /// Check whether an offer is in the cart.
    pub fn contains(&self, offer: OfferId) -> bool {
        self.line(offer).is_some()
    }

    /// Lines grouped by seller.
    pub fn groups(&self) -> Vec<CartGroup> {
        group_by_seller(&self.lines, &self.sellers)
    }

    /// The group for a single seller, if the cart holds any of their offers.
    pub fn group(&self, seller: SellerId) -> Option<CartGroup> {
        group_by_seller(
            self.lines.iter().filter(|line| line.seller_id == seller),
            &self.sellers,
        )
        .into_iter()
        .next()
    }

    /// Set the quantity of a line, clamped to `[1, available_quantity]`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::UnknownOffer`] if the offer is not in the cart.
    pub fn set_quantity(
        &mut self,
        offer: OfferId,
        requested: i64,
    ) -> Result<QuantityChange, CartError> {
        let line = self
            .lines
            .iter_mut()
            .find(|line| line.offer_id == offer)
            .ok_or(CartError::UnknownOffer(offer))?;

        let previous = line.selected_quantity;
        let applied = line.clamp_quantity(requested);

        line.selected_quantity = applied;

        Ok(QuantityChange {
            offer_id: offer,
            previous,
            applied,
        })
    }

    /// Remove the lines for the given offers, returning what was removed.
    ///
    /// Offers that are not in the cart are ignored.
    pub fn remove(&mut self, offers: &[OfferId]) -> Vec<CartLine> {
        let (removed, kept): (Vec<CartLine>, Vec<CartLine>) = self
            .lines
            .drain(..)
            .partition(|line| offers.contains(&line.offer_id));

        self.lines = kept;

        removed
    }

    /// Sum of every line's price times its selected quantity.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] if the total does not fit in minor units.
    pub fn subtotal(&self) -> Result<Price, PriceError> {
        let totals = self
            .lines
            .iter()
            .map(CartLine::total)
            .collect::<Result<Vec<_>, _>>()?;

        sum(self.currency, totals)
    }

    /// Get the seller profile for an id.
    pub fn seller(&self, seller: SellerId) -> Option<&Seller> {
        self.sellers.get(&seller)
    }

    /// Get the currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Get the number of lines in the cart.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
