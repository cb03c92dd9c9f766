//! Preferences service.

use async_trait::async_trait;
use bazaar::tabs::{Tab, TabOrder};
use mockall::automock;
use tokio::sync::Mutex;

use crate::{
    database::Db,
    domain::preferences::{errors::PreferencesError, repository::SqliteTabOrderRepository},
};

#[derive(Debug)]
pub struct SqliteTabOrderService {
    db: Db,
    repository: SqliteTabOrderRepository,
    /// Serializes read-modify-write cycles on the tab order.
    writer: Mutex<()>,
}

impl SqliteTabOrderService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: SqliteTabOrderRepository::new(),
            writer: Mutex::new(()),
        }
    }
}

#[async_trait]
impl TabOrderService for SqliteTabOrderService {
    async fn load(&self) -> Result<TabOrder, PreferencesError> {
        let mut tx = self.db.begin().await?;

        let order = self.repository.load_tab_order(&mut tx).await?;

        tx.commit().await?;

        Ok(order)
    }

    async fn move_tab(&self, tab: Tab, position: usize) -> Result<TabOrder, PreferencesError> {
        let _writer = self.writer.lock().await;

        let mut tx = self.db.begin().await?;

        let mut order = self.repository.load_tab_order(&mut tx).await?;

        order.move_tab(tab, position)?;

        self.repository.save_tab_order(&mut tx, &order).await?;

        tx.commit().await?;

        Ok(order)
    }
}

#[automock]
#[async_trait]
pub trait TabOrderService: Send + Sync {
    /// The stored tab order, completed with any tabs it is missing.
    async fn load(&self) -> Result<TabOrder, PreferencesError>;

    /// Move a tab to `position` and persist the result.
    async fn move_tab(&self, tab: Tab, position: usize) -> Result<TabOrder, PreferencesError>;
}
