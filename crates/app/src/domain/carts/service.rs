//! Carts service.

use async_trait::async_trait;
use bazaar::{
    cart::{CartGroup, CartLine, OfferId, group_by_seller},
    orders::{OrderDraft, OrderId},
    sellers::{Seller, SellerId},
};
use mockall::automock;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use uuid::Uuid;

use crate::{
    api::{
        ApiClient, ApiError,
        wire::{
            CartItemRequest, CartRow, CreateOrderRequest, CreatedOrder, LoginRequest,
            RemoveItemsRequest,
        },
    },
    session::Session,
};

const GET_CART_ITEMS_PATH: &str = "/user/operations/get-cart-items";
const ADD_ITEM_TO_CART_PATH: &str = "/users/operations/add-item-to-cart";
const CHANGE_QUANTITY_PATH: &str = "/users/operations/change-cart-item-quantity";
const REMOVE_MANY_ITEMS_PATH: &str = "/users/operations/remove-many-items-from-cart";
const CREATE_ORDER_PATH: &str = "/users/operations/create-order";

/// Header carrying a per-attempt key so a retried order is not placed twice.
const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Minor-unit scale of every supported currency.
const PRICE_SCALE: u32 = 2;

#[derive(Debug, Clone)]
pub struct HttpCartsService {
    client: ApiClient,
}

impl HttpCartsService {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CartsService for HttpCartsService {
    async fn fetch_cart(&self, session: &Session) -> Result<Vec<CartGroup>, ApiError> {
        let request = self.client.post(
            GET_CART_ITEMS_PATH,
            Some(session),
            &LoginRequest {
                login_id: session.login_id(),
            },
        );

        let rows: Vec<CartRow> = self.client.fetch(request).await?;

        let sellers: FxHashMap<SellerId, Seller> = rows
            .iter()
            .map(|row| (row.seller_id, row.seller()))
            .collect();

        let lines = rows
            .into_iter()
            .map(CartRow::into_line)
            .collect::<Result<Vec<CartLine>, _>>()?;

        Ok(group_by_seller(&lines, &sellers))
    }

    async fn add_item(
        &self,
        session: &Session,
        offer: OfferId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        let request = self.client.post(
            ADD_ITEM_TO_CART_PATH,
            Some(session),
            &CartItemRequest {
                login_id: session.login_id(),
                offer_id: offer,
                quantity,
            },
        );

        self.client.acknowledge(request).await
    }

    async fn change_quantity(
        &self,
        session: &Session,
        offer: OfferId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        let request = self.client.post(
            CHANGE_QUANTITY_PATH,
            Some(session),
            &CartItemRequest {
                login_id: session.login_id(),
                offer_id: offer,
                quantity,
            },
        );

        self.client.acknowledge(request).await
    }

    async fn remove_items(&self, session: &Session, offers: Vec<OfferId>) -> Result<(), ApiError> {
        let request = self.client.post(
            REMOVE_MANY_ITEMS_PATH,
            Some(session),
            &RemoveItemsRequest {
                login_id: session.login_id(),
                offer_ids: offers,
            },
        );

        self.client.acknowledge(request).await
    }

    async fn create_order(&self, session: &Session, draft: OrderDraft) -> Result<OrderId, ApiError> {
        let body = CreateOrderRequest {
            login_id: session.login_id(),
            expected_total: Decimal::new(draft.total.to_minor_units(), PRICE_SCALE),
            currency: draft.total.currency().iso_alpha_code,
            lines: draft.lines.into_iter().map(Into::into).collect(),
        };

        let request = self
            .client
            .post(CREATE_ORDER_PATH, Some(session), &body)
            .header(IDEMPOTENCY_KEY_HEADER, Uuid::now_v7().to_string());

        let created: CreatedOrder = self.client.fetch(request).await?;

        Ok(created.order_id)
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Fetch the user's cart, grouped by seller.
    async fn fetch_cart(&self, session: &Session) -> Result<Vec<CartGroup>, ApiError>;

    /// Put an offer into the cart.
    async fn add_item(
        &self,
        session: &Session,
        offer: OfferId,
        quantity: u32,
    ) -> Result<(), ApiError>;

    /// Persist a new quantity for a cart line.
    async fn change_quantity(
        &self,
        session: &Session,
        offer: OfferId,
        quantity: u32,
    ) -> Result<(), ApiError>;

    /// Remove several offers from the cart in one call.
    async fn remove_items(&self, session: &Session, offers: Vec<OfferId>) -> Result<(), ApiError>;

    /// Place an order for the drafted lines.
    async fn create_order(&self, session: &Session, draft: OrderDraft) -> Result<OrderId, ApiError>;
}
