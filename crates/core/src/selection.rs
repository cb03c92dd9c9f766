//! Selection
//!
//! The set of cart lines the user has ticked for checkout. Every entry is a
//! snapshot of `(offer, quantity, unit price)`; the running total is
//! recomputed from those snapshots on demand.

use rusty_money::iso::Currency;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::{
    cart::{Cart, CartLine, OfferId},
    prices::{Price, PriceError, line_total, sum},
    sellers::SellerId,
};

/// Errors raised by selection changes.
#[derive(Debug, Error, PartialEq)]
pub enum SelectionError {
    /// Only offers in the cart can be selected.
    #[error("offer {0} is not in the cart")]
    UnknownOffer(OfferId),

    /// Wrapped price arithmetic error.
    #[error(transparent)]
    Price(#[from] PriceError),
}

/// A selected cart line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectedOffer {
    /// The selected offer.
    pub offer_id: OfferId,

    /// Seller of the offer.
    pub seller_id: SellerId,

    /// Units to buy.
    pub quantity: u32,

    /// Unit price when selected.
    pub price_per_item: Price,
}

impl From<&CartLine> for SelectedOffer {
    fn from(line: &CartLine) -> Self {
        Self {
            offer_id: line.offer_id,
            seller_id: line.seller_id,
            quantity: line.selected_quantity,
            price_per_item: line.price_per_item,
        }
    }
}

/// Lines ticked for checkout, keyed by offer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    entries: FxHashMap<OfferId, SelectedOffer>,
}

impl Selection {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the selection state of an offer in `cart`.
    ///
    /// Returns `true` when the offer is selected afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::UnknownOffer`] when the offer is not in the cart.
    pub fn toggle(&mut self, cart: &Cart, offer: OfferId) -> Result<bool, SelectionError> {
        if self.entries.remove(&offer).is_some() {
            return Ok(false);
        }

        let line = cart.line(offer).ok_or(SelectionError::UnknownOffer(offer))?;

        self.entries.insert(offer, SelectedOffer::from(line));

        Ok(true)
    }

    /// Select every safe-deal line of one seller.
    ///
    /// Lines already selected are refreshed; the number of newly added offers
    /// is returned.
    pub fn select_all_for_seller(&mut self, cart: &Cart, seller: SellerId) -> usize {
        cart.lines()
            .iter()
            .filter(|line| line.seller_id == seller && line.safe_deal_eligible)
            .filter(|line| {
                self.entries
                    .insert(line.offer_id, SelectedOffer::from(*line))
                    .is_none()
            })
            .count()
    }

    /// Drop every selected line of one seller, returning how many were removed.
    pub fn deselect_seller(&mut self, seller: SellerId) -> usize {
        let before = self.entries.len();

        self.entries.retain(|_, entry| entry.seller_id != seller);

        before - self.entries.len()
    }

    /// Record a new quantity for a selected offer. Unselected offers are ignored.
    pub fn update_quantity(&mut self, offer: OfferId, quantity: u32) {
        if let Some(entry) = self.entries.get_mut(&offer) {
            entry.quantity = quantity;
        }
    }

    /// Drop the given offers.
    pub fn remove(&mut self, offers: &[OfferId]) {
        self.entries.retain(|offer, _| !offers.contains(offer));
    }

    /// Re-align the selection with a freshly loaded cart.
    ///
    /// Offers no longer in the cart are dropped; the rest pick up the cart's
    /// current quantity and price.
    pub fn sync_with(&mut self, cart: &Cart) {
        self.entries.retain(|offer, entry| match cart.line(*offer) {
            Some(line) => {
                *entry = SelectedOffer::from(line);
                true
            }
            None => false,
        });
    }

    /// Check if an offer is selected.
    pub fn contains(&self, offer: OfferId) -> bool {
        self.entries.contains_key(&offer)
    }

    /// Get a selected offer.
    pub fn get(&self, offer: OfferId) -> Option<&SelectedOffer> {
        self.entries.get(&offer)
    }

    /// Iterate over the selected offers in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &SelectedOffer> {
        self.entries.values()
    }

    /// Selected offer ids, ordered as they appear in `cart`.
    pub fn offer_ids(&self, cart: &Cart) -> Vec<OfferId> {
        cart.lines()
            .iter()
            .map(|line| line.offer_id)
            .filter(|offer| self.contains(*offer))
            .collect()
    }

    /// Σ(price × quantity) over the selection.
    ///
    /// # Errors
    ///
    /// Returns a [`PriceError`] on overflow or if a selected price is in
    /// another currency.
    pub fn total(&self, currency: &'static Currency) -> Result<Price, PriceError> {
        let totals = self
            .entries
            .values()
            .map(|entry| line_total(&entry.price_per_item, entry.quantity))
            .collect::<Result<Vec<_>, _>>()?;

        sum(currency, totals)
    }

    /// Drop every selected offer.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Get the number of selected offers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::RUB};
    use testresult::TestResult;

    use crate::{cart::CartError, sellers::Seller};

    use super::*;

    fn line(offer: i64, seller: i64, price: i64, selected: u32, safe_deal: bool) -> CartLine {
        CartLine {
            offer_id: OfferId::new(offer),
            seller_id: SellerId::new(seller),
            title: format!("offer {offer}"),
            price_per_item: Money::from_minor(price, RUB),
            available_quantity: 10,
            selected_quantity: selected,
            safe_deal_eligible: safe_deal,
        }
    }

    fn test_cart() -> Result<Cart, CartError> {
        Cart::with_lines(
            RUB,
            [
                Seller::new(SellerId::new(1), "A"),
                Seller::new(SellerId::new(2), "B"),
            ],
            vec![
                line(1, 1, 10_00, 1, true),
                line(2, 1, 5_00, 2, true),
                line(3, 1, 7_00, 1, false),
                line(4, 2, 1_00, 3, true),
            ],
        )
    }

    #[test]
    fn selecting_both_lines_of_seller_a_totals_twenty() -> TestResult {
        let cart = test_cart()?;
        let mut selection = Selection::new();

        selection.toggle(&cart, OfferId::new(1))?;
        selection.toggle(&cart, OfferId::new(2))?;

        assert_eq!(selection.total(RUB)?, Money::from_minor(20_00, RUB));

        Ok(())
    }

    #[test]
    fn toggle_twice_deselects() -> TestResult {
        let cart = test_cart()?;
        let mut selection = Selection::new();

        assert!(selection.toggle(&cart, OfferId::new(1))?);
        assert!(!selection.toggle(&cart, OfferId::new(1))?);
        assert!(selection.is_empty());
        assert_eq!(selection.total(RUB)?, Money::from_minor(0, RUB));

        Ok(())
    }

    #[test]
    fn total_tracks_every_toggle() -> TestResult {
        let cart = test_cart()?;
        let mut selection = Selection::new();

        let steps = [(1, 10_00), (4, 13_00), (2, 23_00), (1, 13_00), (4, 10_00)];

        for (offer, expected) in steps {
            selection.toggle(&cart, OfferId::new(offer))?;

            assert_eq!(
                selection.total(RUB)?,
                Money::from_minor(expected, RUB),
                "after toggling offer {offer}"
            );
        }

        Ok(())
    }

    #[test]
    fn toggle_unknown_offer_errors() -> TestResult {
        let cart = test_cart()?;
        let mut selection = Selection::new();

        let result = selection.toggle(&cart, OfferId::new(99));

        assert_eq!(result, Err(SelectionError::UnknownOffer(OfferId::new(99))));
        assert!(selection.is_empty());

        Ok(())
    }

    #[test]
    fn select_all_for_seller_skips_ineligible_lines() -> TestResult {
        let cart = test_cart()?;
        let mut selection = Selection::new();

        let added = selection.select_all_for_seller(&cart, SellerId::new(1));

        assert_eq!(added, 2);
        assert!(selection.contains(OfferId::new(1)));
        assert!(selection.contains(OfferId::new(2)));
        assert!(!selection.contains(OfferId::new(3)));
        assert!(!selection.contains(OfferId::new(4)));

        assert_eq!(selection.select_all_for_seller(&cart, SellerId::new(1)), 0);

        Ok(())
    }

    #[test]
    fn deselect_seller_leaves_other_sellers() -> TestResult {
        let cart = test_cart()?;
        let mut selection = Selection::new();

        selection.select_all_for_seller(&cart, SellerId::new(1));
        selection.toggle(&cart, OfferId::new(4))?;

        assert_eq!(selection.deselect_seller(SellerId::new(1)), 2);
        assert_eq!(selection.offer_ids(&cart), vec![OfferId::new(4)]);

        Ok(())
    }

    #[test]
    fn deselect_seller_drops_lines_already_gone_from_cart() -> TestResult {
        let mut cart = test_cart()?;
        let mut selection = Selection::new();

        selection.select_all_for_seller(&cart, SellerId::new(1));
        let removed = cart.remove(&[OfferId::new(1)]);

        assert_eq!(removed.len(), 1);
        assert_eq!(selection.deselect_seller(SellerId::new(1)), 2);
        assert!(selection.is_empty());

        Ok(())
    }

    #[test]
    fn update_quantity_changes_total() -> TestResult {
        let cart = test_cart()?;
        let mut selection = Selection::new();

        selection.toggle(&cart, OfferId::new(2))?;
        selection.update_quantity(OfferId::new(2), 5);
        selection.update_quantity(OfferId::new(1), 5);

        assert_eq!(selection.total(RUB)?, Money::from_minor(25_00, RUB));
        assert_eq!(selection.len(), 1);

        Ok(())
    }

    #[test]
    fn sync_with_prunes_removed_offers() -> TestResult {
        let mut cart = test_cart()?;
        let mut selection = Selection::new();

        selection.select_all_for_seller(&cart, SellerId::new(1));

        cart.remove(&[OfferId::new(1)]);
        cart.set_quantity(OfferId::new(2), 4)?;
        selection.sync_with(&cart);

        assert_eq!(selection.offer_ids(&cart), vec![OfferId::new(2)]);
        assert_eq!(selection.get(OfferId::new(2)).map(|e| e.quantity), Some(4));

        Ok(())
    }

    #[test]
    fn offer_ids_follow_cart_order() -> TestResult {
        let cart = test_cart()?;
        let mut selection = Selection::new();

        selection.toggle(&cart, OfferId::new(4))?;
        selection.toggle(&cart, OfferId::new(1))?;

        assert_eq!(
            selection.offer_ids(&cart),
            vec![OfferId::new(1), OfferId::new(4)]
        );

        Ok(())
    }
}
