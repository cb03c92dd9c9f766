//! Sellers

use crate::ids::Id;

/// Seller Id
pub type SellerId = Id<Seller>;

/// A seller that publishes offers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seller {
    /// Seller Id
    pub id: SellerId,

    /// Display name
    pub name: String,
}

impl Seller {
    /// Create a seller with the given display name.
    pub fn new(id: SellerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// A seller the backend returned no profile for.
    pub fn unnamed(id: SellerId) -> Self {
        Self {
            id,
            name: String::new(),
        }
    }
}
