//! Paged stores
//!
//! A [`PagedStore`] drives a [`ListingPage`] from any [`PageSource`]: it asks
//! the page where the next chunk starts, fetches it and appends it, dropping
//! chunks whose query has since been replaced.

use std::sync::Arc;

use async_trait::async_trait;
use bazaar::listing::{ListingItem, ListingPage, ListingQuery, PageChunk};
use tokio::sync::{Mutex, watch};
use tracing::debug;

use crate::{
    api::ApiError,
    domain::{dialogs::DialogsService, dialogs::models::Dialog, listings::ListingsService},
    errors::DomainError,
    session::Session,
};

/// A backend feed that can be read in chunks.
#[async_trait]
pub trait PageSource: Send + Sync {
    type Item: Clone + Send + Sync + 'static;
    type Query: Clone + Default + PartialEq + Send + Sync + 'static;

    async fn fetch(
        &self,
        session: &Session,
        query: &Self::Query,
        offset: u32,
        limit: u32,
    ) -> Result<PageChunk<Self::Item>, ApiError>;
}

/// Public offer search.
pub struct ListingsFeed(pub Arc<dyn ListingsService>);

#[async_trait]
impl PageSource for ListingsFeed {
    type Item = ListingItem;
    type Query = ListingQuery;

    async fn fetch(
        &self,
        _session: &Session,
        query: &ListingQuery,
        offset: u32,
        limit: u32,
    ) -> Result<PageChunk<ListingItem>, ApiError> {
        self.0.search(query, offset, limit).await
    }
}

/// The user's messenger dialogs.
pub struct DialogsFeed(pub Arc<dyn DialogsService>);

#[async_trait]
impl PageSource for DialogsFeed {
    type Item = Dialog;
    type Query = ();

    async fn fetch(
        &self,
        session: &Session,
        _query: &(),
        offset: u32,
        limit: u32,
    ) -> Result<PageChunk<Dialog>, ApiError> {
        self.0.dialogs(session, offset, limit).await
    }
}

/// Snapshot of a paged screen.
#[derive(Debug, Clone, PartialEq)]
pub struct PagedState<T, Q> {
    pub page: ListingPage<T, Q>,
    /// A chunk is being fetched.
    pub is_loading: bool,
    /// Error of the last chunk load.
    pub error: Option<DomainError>,
}

impl<T, Q: Default> Default for PagedState<T, Q> {
    fn default() -> Self {
        Self {
            page: ListingPage::default(),
            is_loading: false,
            error: None,
        }
    }
}

type StateOf<S> = PagedState<<S as PageSource>::Item, <S as PageSource>::Query>;

/// Loads a [`PageSource`] chunk by chunk and publishes [`PagedState`]
/// snapshots.
pub struct PagedStore<S: PageSource> {
    source: S,
    page_size: u32,
    inner: Mutex<StateOf<S>>,
    state: watch::Sender<StateOf<S>>,
}

impl<S: PageSource> PagedStore<S> {
    #[must_use]
    pub fn new(source: S, page_size: u32) -> Self {
        Self {
            source,
            page_size: page_size.max(1),
            inner: Mutex::new(PagedState::default()),
            state: watch::Sender::new(PagedState::default()),
        }
    }

    /// Observe state changes.
    pub fn subscribe(&self) -> watch::Receiver<StateOf<S>> {
        self.state.subscribe()
    }

    pub fn state(&self) -> StateOf<S> {
        self.state.borrow().clone()
    }

    fn publish(&self, state: &StateOf<S>) {
        self.state.send_replace(state.clone());
    }

    /// Switch to a new query and load its first chunk.
    ///
    /// An unchanged query is not refetched once its first chunk has arrived.
    ///
    /// # Errors
    ///
    /// Returns the error of the first chunk load.
    pub async fn set_query(&self, session: &Session, query: S::Query) -> Result<(), DomainError> {
        {
            let mut state = self.inner.lock().await;

            if state.page.apply_query(query).is_some() {
                state.is_loading = false;
                state.error = None;

                self.publish(&state);
            } else if !state.page.is_empty() || state.page.is_exhausted() {
                return Ok(());
            }
        }

        self.load_next(session).await
    }

    /// Drop what is loaded and start the current query over.
    ///
    /// # Errors
    ///
    /// Returns the error of the first chunk load.
    pub async fn reload(&self, session: &Session) -> Result<(), DomainError> {
        {
            let mut state = self.inner.lock().await;
            let query = state.page.query().clone();

            state.page.restart(query);
            state.is_loading = false;
            state.error = None;

            self.publish(&state);
        }

        self.load_next(session).await
    }

    /// Append the next chunk.
    ///
    /// Does nothing while a chunk is already loading or once the feed is
    /// exhausted. A chunk that arrives after the query changed is discarded.
    ///
    /// # Errors
    ///
    /// Returns the load error, which is also kept in [`PagedState::error`].
    pub async fn load_next(&self, session: &Session) -> Result<(), DomainError> {
        let (request, query) = {
            let mut state = self.inner.lock().await;

            if state.is_loading {
                return Ok(());
            }

            let Some(request) = state.page.next_request(self.page_size) else {
                return Ok(());
            };

            state.is_loading = true;

            self.publish(&state);

            (request, state.page.query().clone())
        };

        let result = self
            .source
            .fetch(session, &query, request.offset, request.limit)
            .await;

        let mut state = self.inner.lock().await;

        if state.page.generation() != request.generation {
            debug!(
                generation = request.generation,
                current = state.page.generation(),
                "dropping stale page chunk"
            );
            return Ok(());
        }

        state.is_loading = false;

        let outcome = result
            .map_err(DomainError::from)
            .and_then(|chunk| Ok(state.page.append(request, chunk)?));

        let outcome = match outcome {
            Ok(()) => {
                state.error = None;
                Ok(())
            }
            Err(error) => {
                state.error = Some(error.clone());
                Err(error)
            }
        };

        self.publish(&state);

        outcome
    }
}
