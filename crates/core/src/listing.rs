//! Listing Pages
//!
//! A [`ListingPage`] is the client-side window over a paginated feed: the
//! items loaded so far, in server order, plus the offset of the next chunk.
//! Changing the query truncates the page and bumps its generation so chunks
//! requested for the old query can be told apart and rejected.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{cart::OfferId, prices::Price, sellers::SellerId};

/// Errors raised while appending chunks.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ListingError {
    /// The chunk was requested before the query last changed (chunk, current).
    #[error("chunk for generation {0} arrived after the page moved to generation {1}")]
    StaleGeneration(u64, u64),

    /// The chunk does not start where the page ends (chunk offset, page offset).
    #[error("chunk starts at {0} but the page ends at {1}")]
    OffsetMismatch(u32, u32),
}

/// Listing sort order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Backend relevance ranking.
    #[default]
    Relevance,

    /// Cheapest first.
    PriceAscending,

    /// Most expensive first.
    PriceDescending,

    /// Most recently published first.
    Newest,
}

/// Search filters and sort for the listings feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingQuery {
    /// Free text search.
    pub text: Option<String>,

    /// Category slug.
    pub category: Option<String>,

    /// Sort order.
    pub sort: SortOrder,

    /// Additional attribute filters.
    pub filters: BTreeMap<String, String>,
}

impl ListingQuery {
    /// A query matching `text`.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// The same query with a different sort order.
    #[must_use]
    pub fn sorted_by(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// The same query with an extra attribute filter.
    #[must_use]
    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }
}

/// An offer as shown in the listings feed.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingItem {
    /// Offer Id
    pub offer_id: OfferId,

    /// Seller Id
    pub seller_id: SellerId,

    /// Offer title
    pub title: String,

    /// Unit price
    pub price: Price,

    /// Whether the offer can be bought through the safe-deal checkout.
    pub safe_deal_eligible: bool,
}

/// One chunk of a paginated response.
#[derive(Debug, Clone, PartialEq)]
pub struct PageChunk<T> {
    /// Items in server order.
    pub items: Vec<T>,

    /// Whether the backend has more items after this chunk.
    pub has_more: bool,
}

/// Where the next chunk should be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Generation the request belongs to.
    pub generation: u64,

    /// Offset of the first item to load.
    pub offset: u32,

    /// Maximum number of items to load.
    pub limit: u32,
}

/// Items loaded so far for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingPage<T, Q = ListingQuery> {
    query: Q,
    generation: u64,
    items: Vec<T>,
    exhausted: bool,
}

impl<T, Q> ListingPage<T, Q> {
    /// Create an empty page for a query.
    pub fn new(query: Q) -> Self {
        Self {
            query,
            generation: 0,
            items: Vec::new(),
            exhausted: false,
        }
    }

    /// Truncate the page and start over with `query`, returning the new generation.
    pub fn restart(&mut self, query: Q) -> u64 {
        self.query = query;
        self.items.clear();
        self.exhausted = false;
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    /// The request for the next chunk, or `None` once the feed is exhausted.
    pub fn next_request(&self, limit: u32) -> Option<PageRequest> {
        if self.exhausted {
            return None;
        }

        Some(PageRequest {
            generation: self.generation,
            offset: self.next_offset(),
            limit,
        })
    }

    /// Append a chunk loaded for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`ListingError::StaleGeneration`] when the query changed after
    /// the request was made, and [`ListingError::OffsetMismatch`] when the
    /// chunk does not continue the page.
    pub fn append(&mut self, request: PageRequest, chunk: PageChunk<T>) -> Result<(), ListingError> {
        if request.generation != self.generation {
            return Err(ListingError::StaleGeneration(
                request.generation,
                self.generation,
            ));
        }

        let offset = self.next_offset();

        if request.offset != offset {
            return Err(ListingError::OffsetMismatch(request.offset, offset));
        }

        self.exhausted = !chunk.has_more || chunk.items.is_empty();
        self.items.extend(chunk.items);

        Ok(())
    }

    /// The current query.
    pub fn query(&self) -> &Q {
        &self.query
    }

    /// The current generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Items in server order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Offset of the next chunk.
    pub fn next_offset(&self) -> u32 {
        u32::try_from(self.items.len()).unwrap_or(u32::MAX)
    }

    /// Whether the backend reported no further items.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Get the number of loaded items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if no items are loaded.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T, Q: PartialEq> ListingPage<T, Q> {
    /// Restart the page if `query` differs from the current one.
    ///
    /// Returns the new generation when the page was restarted.
    pub fn apply_query(&mut self, query: Q) -> Option<u64> {
        if self.query == query {
            return None;
        }

        Some(self.restart(query))
    }
}

impl<T, Q: Default> Default for ListingPage<T, Q> {
    fn default() -> Self {
        Self::new(Q::default())
    }
}
