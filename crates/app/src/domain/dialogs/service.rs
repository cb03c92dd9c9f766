//! Dialogs service.

use async_trait::async_trait;
use bazaar::listing::PageChunk;
use mockall::automock;

use crate::{
    api::{
        ApiClient, ApiError,
        wire::{DialogRow, DialogsRequest, PageBody},
    },
    domain::dialogs::models::Dialog,
    session::Session,
};

const GET_DIALOGS_PATH: &str = "/users/operations/get-dialogs";

#[derive(Debug, Clone)]
pub struct HttpDialogsService {
    client: ApiClient,
}

impl HttpDialogsService {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DialogsService for HttpDialogsService {
    async fn dialogs(
        &self,
        session: &Session,
        offset: u32,
        limit: u32,
    ) -> Result<PageChunk<Dialog>, ApiError> {
        let request = self.client.post(
            GET_DIALOGS_PATH,
            Some(session),
            &DialogsRequest {
                login_id: session.login_id(),
                offset,
                limit,
            },
        );

        let page: PageBody<DialogRow> = self.client.fetch(request).await?;

        page.try_map(|row| Ok(Dialog::from(row)))
    }
}

/// Messenger dialogs of the logged-in user.
#[automock]
#[async_trait]
pub trait DialogsService: Send + Sync {
    /// Load one chunk of dialogs, most recent first.
    async fn dialogs(
        &self,
        session: &Session,
        offset: u32,
        limit: u32,
    ) -> Result<PageChunk<Dialog>, ApiError>;
}
