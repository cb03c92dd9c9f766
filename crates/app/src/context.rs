//! App Context

use std::sync::Arc;

use bazaar::prices::PriceError;
use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    api::{ApiClient, ApiError},
    config::ClientConfig,
    database::{self, Db},
    domain::{
        carts::{CartsService, HttpCartsService},
        dialogs::{DialogsService, HttpDialogsService},
        listings::{HttpListingsService, ListingsService},
        preferences::{SqliteTabOrderService, TabOrderService},
    },
    store::{CartStore, DialogsFeed, ListingsFeed, PagedStore},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to build the API client")]
    Api(#[source] ApiError),

    #[error("failed to open the preferences database")]
    Database(#[source] sqlx::Error),

    #[error("invalid cart currency")]
    Currency(#[source] PriceError),
}

#[derive(Clone)]
pub struct AppContext {
    pub carts: Arc<dyn CartsService>,
    pub listings: Arc<dyn ListingsService>,
    pub dialogs: Arc<dyn DialogsService>,
    pub tab_order: Arc<dyn TabOrderService>,
    pub currency: &'static Currency,
    pub page_size: u32,
}

impl AppContext {
    /// Build application context from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built, the database
    /// cannot be opened, or the currency is not supported.
    pub async fn from_config(config: &ClientConfig) -> Result<Self, AppInitError> {
        let currency = config.api.currency().map_err(AppInitError::Currency)?;
        let client = ApiClient::new(config.api.api_config()).map_err(AppInitError::Api)?;

        let pool = database::connect(&config.database.database_url)
            .await
            .map_err(AppInitError::Database)?;

        Ok(Self {
            carts: Arc::new(HttpCartsService::new(client.clone())),
            listings: Arc::new(HttpListingsService::new(client.clone())),
            dialogs: Arc::new(HttpDialogsService::new(client)),
            tab_order: Arc::new(SqliteTabOrderService::new(Db::new(pool))),
            currency,
            page_size: config.api.page_size,
        })
    }

    #[must_use]
    pub fn cart_store(&self) -> CartStore {
        CartStore::new(Arc::clone(&self.carts), self.currency)
    }

    #[must_use]
    pub fn listings_store(&self) -> PagedStore<ListingsFeed> {
        PagedStore::new(ListingsFeed(Arc::clone(&self.listings)), self.page_size)
    }

    #[must_use]
    pub fn dialogs_store(&self) -> PagedStore<DialogsFeed> {
        PagedStore::new(DialogsFeed(Arc::clone(&self.dialogs)), self.page_size)
    }
}
