//! Wire types
//!
//! JSON bodies exchanged with the marketplace backend. Every response is
//! wrapped in an [`Envelope`]; payload rows are converted into core domain
//! types before leaving the API layer.

use bazaar::{
    cart::{CartLine, OfferId},
    listing::{ListingItem, ListingQuery, PageChunk},
    orders::{OrderId, OrderLine},
    prices::{PriceError, parse_price},
    sellers::{Seller, SellerId},
};
use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    api::ApiError,
    domain::dialogs::models::{Dialog, DialogId},
    session::LoginId,
};

/// Response envelope shared by every endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub payload: Option<T>,
    pub error: Option<ErrorBody>,
}

/// Server-provided error details.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ErrorBody {
    pub code: String,
    pub human_message: String,
}

impl From<ErrorBody> for ApiError {
    fn from(body: ErrorBody) -> Self {
        ApiError::Server {
            code: body.code,
            message: body.human_message,
        }
    }
}

impl<T> Envelope<T> {
    fn failure(&mut self) -> Option<ApiError> {
        if let Some(error) = self.error.take() {
            return Some(error.into());
        }

        if self.success {
            None
        } else {
            Some(ApiError::Server {
                code: "UNKNOWN".to_string(),
                message: "The request was not successful".to_string(),
            })
        }
    }

    /// The payload of a successful response.
    pub(crate) fn into_payload(mut self) -> Result<T, ApiError> {
        if let Some(error) = self.failure() {
            return Err(error);
        }

        self.payload.ok_or(ApiError::MissingPayload)
    }

    /// Check a response whose payload is irrelevant.
    pub(crate) fn into_ack(mut self) -> Result<(), ApiError> {
        match self.failure() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginRequest {
    pub login_id: LoginId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartItemRequest {
    pub login_id: LoginId,
    pub offer_id: OfferId,
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RemoveItemsRequest {
    pub login_id: LoginId,
    pub offer_ids: Vec<OfferId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateOrderRequest {
    pub login_id: LoginId,
    pub lines: Vec<OrderLineBody>,
    pub expected_total: Decimal,
    pub currency: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderLineBody {
    pub offer_id: OfferId,
    pub quantity: u32,
}

impl From<OrderLine> for OrderLineBody {
    fn from(line: OrderLine) -> Self {
        Self {
            offer_id: line.offer_id,
            quantity: line.quantity,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatedOrder {
    pub order_id: OrderId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchRequest<'a> {
    pub query: &'a ListingQuery,
    pub offset: u32,
    pub limit: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DialogsRequest {
    pub login_id: LoginId,
    pub offset: u32,
    pub limit: u32,
}

/// A paginated payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PageBody<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
}

impl<T> PageBody<T> {
    pub(crate) fn try_map<U, E>(
        self,
        convert: impl FnMut(T) -> Result<U, E>,
    ) -> Result<PageChunk<U>, E> {
        Ok(PageChunk {
            items: self
                .items
                .into_iter()
                .map(convert)
                .collect::<Result<Vec<_>, _>>()?,
            has_more: self.has_more,
        })
    }
}

/// A flat cart row as returned by `get-cart-items`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartRow {
    pub offer_id: OfferId,
    pub seller_id: SellerId,
    #[serde(default)]
    pub seller_name: Option<String>,
    pub title: String,
    pub price: Decimal,
    pub currency: String,
    pub available_quantity: u32,
    pub quantity: u32,
    #[serde(default)]
    pub safe_deal: bool,
}

impl CartRow {
    pub(crate) fn seller(&self) -> Seller {
        match &self.seller_name {
            Some(name) => Seller::new(self.seller_id, name.clone()),
            None => Seller::unnamed(self.seller_id),
        }
    }

    pub(crate) fn into_line(self) -> Result<CartLine, PriceError> {
        Ok(CartLine {
            offer_id: self.offer_id,
            seller_id: self.seller_id,
            title: self.title,
            price_per_item: parse_price(self.price, &self.currency)?,
            available_quantity: self.available_quantity,
            selected_quantity: self.quantity,
            safe_deal_eligible: self.safe_deal,
        })
    }
}

/// A listing row as returned by `search`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListingRow {
    pub offer_id: OfferId,
    pub seller_id: SellerId,
    pub title: String,
    pub price: Decimal,
    pub currency: String,
    #[serde(default)]
    pub safe_deal: bool,
}

impl TryFrom<ListingRow> for ListingItem {
    type Error = PriceError;

    fn try_from(row: ListingRow) -> Result<Self, Self::Error> {
        Ok(ListingItem {
            offer_id: row.offer_id,
            seller_id: row.seller_id,
            title: row.title,
            price: parse_price(row.price, &row.currency)?,
            safe_deal_eligible: row.safe_deal,
        })
    }
}

/// A messenger dialog row as returned by `get-dialogs`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DialogRow {
    pub dialog_id: DialogId,
    pub peer_name: String,
    #[serde(default)]
    pub last_message: Option<String>,
    #[serde(default)]
    pub unread_count: u32,
    pub updated_at: Timestamp,
}

impl From<DialogRow> for Dialog {
    fn from(row: DialogRow) -> Self {
        Dialog {
            id: row.dialog_id,
            peer_name: row.peer_name,
            last_message: row.last_message,
            unread_count: row.unread_count,
            updated_at: row.updated_at,
        }
    }
}
