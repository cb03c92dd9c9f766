//! Cart Groups

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::{
    cart::line::CartLine,
    sellers::{Seller, SellerId},
};

/// Basket lines belonging to one seller.
#[derive(Debug, Clone, PartialEq)]
pub struct CartGroup {
    /// The seller all lines belong to.
    pub seller: Seller,

    /// Lines in server order.
    pub lines: SmallVec<[CartLine; 4]>,
}

impl CartGroup {
    /// Lines that can be bought through the safe-deal checkout.
    pub fn eligible_lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter().filter(|line| line.safe_deal_eligible)
    }

    /// Number of lines in the group.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the group has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Group flat lines by seller.
///
/// Groups come out in the order each seller first appears; lines keep their
/// relative order. Sellers missing from `sellers` get an unnamed profile.
pub fn group_by_seller<'a, I>(lines: I, sellers: &FxHashMap<SellerId, Seller>) -> Vec<CartGroup>
where
    I: IntoIterator<Item = &'a CartLine>,
{
    let mut order: Vec<SellerId> = Vec::new();
    let mut seen: FxHashSet<SellerId> = FxHashSet::default();
    let mut grouped: FxHashMap<SellerId, SmallVec<[CartLine; 4]>> = FxHashMap::default();

    for line in lines {
        if seen.insert(line.seller_id) {
            order.push(line.seller_id);
        }

        grouped
            .entry(line.seller_id)
            .or_default()
            .push(line.clone());
    }

    order
        .into_iter()
        .filter_map(|seller_id| {
            let lines = grouped.remove(&seller_id)?;
            let seller = sellers
                .get(&seller_id)
                .cloned()
                .unwrap_or_else(|| Seller::unnamed(seller_id));

            Some(CartGroup { seller, lines })
        })
        .collect()
}
