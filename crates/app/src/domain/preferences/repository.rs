//! Tab Order Repository

use bazaar::tabs::TabOrder;
use sqlx::{Sqlite, Transaction, query, query_scalar};
use tracing::debug;

const LIST_TAB_ORDER_SQL: &str = include_str!("sql/list_tab_order.sql");
const CLEAR_TAB_ORDER_SQL: &str = include_str!("sql/clear_tab_order.sql");
const INSERT_TAB_SQL: &str = include_str!("sql/insert_tab.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct SqliteTabOrderRepository;

impl SqliteTabOrderRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Stored tab names, by position.
    #[tracing::instrument(name = "preferences.repository.load_tab_order", skip(self, tx), err)]
    pub(crate) async fn load_tab_order(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
    ) -> Result<TabOrder, sqlx::Error> {
        let stored: Vec<String> = query_scalar(LIST_TAB_ORDER_SQL)
            .fetch_all(&mut **tx)
            .await?;

        Ok(TabOrder::from_stored(stored))
    }

    #[tracing::instrument(name = "preferences.repository.save_tab_order", skip(self, tx, order), err)]
    pub(crate) async fn save_tab_order(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        order: &TabOrder,
    ) -> Result<(), sqlx::Error> {
        query(CLEAR_TAB_ORDER_SQL).execute(&mut **tx).await?;

        for (position, tab) in (0_i64..).zip(order.tabs()) {
            query(INSERT_TAB_SQL)
                .bind(position)
                .bind(tab.as_str())
                .execute(&mut **tx)
                .await?;
        }

        debug!(tabs = order.tabs().len(), "saved tab order");

        Ok(())
    }
}
