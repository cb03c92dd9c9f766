//! Listings service.

use async_trait::async_trait;
use bazaar::listing::{ListingItem, ListingQuery, PageChunk};
use mockall::automock;

use crate::api::{
    ApiClient, ApiError,
    wire::{ListingRow, PageBody, SearchRequest},
};

const SEARCH_PATH: &str = "/offers/operations/search";

#[derive(Debug, Clone)]
pub struct HttpListingsService {
    client: ApiClient,
}

impl HttpListingsService {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ListingsService for HttpListingsService {
    async fn search(
        &self,
        query: &ListingQuery,
        offset: u32,
        limit: u32,
    ) -> Result<PageChunk<ListingItem>, ApiError> {
        let request = self.client.post(
            SEARCH_PATH,
            None,
            &SearchRequest {
                query,
                offset,
                limit,
            },
        );

        let page: PageBody<ListingRow> = self.client.fetch(request).await?;

        Ok(page.try_map(ListingItem::try_from)?)
    }
}

/// Public offer search.
#[automock]
#[async_trait]
pub trait ListingsService: Send + Sync {
    /// Load one chunk of offers matching `query`, starting at `offset`.
    async fn search(
        &self,
        query: &ListingQuery,
        offset: u32,
        limit: u32,
    ) -> Result<PageChunk<ListingItem>, ApiError>;
}
