//! Cart store
//!
//! Holds the basket, the checkout selection and the load status as a
//! [`CartState`] published on a `watch` channel. Mutations are applied
//! locally first and persisted afterwards; a failed quantity change rolls the
//! line back to the last quantity the server confirmed.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use bazaar::{
    cart::{Cart, CartGroup, OfferId},
    orders::{OrderDraft, OrderId},
    prices::Price,
    selection::Selection,
    sellers::SellerId,
};
use jiff::Timestamp;
use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use tokio::sync::{Mutex, broadcast, watch};
use tracing::{debug, info, warn};

use crate::{domain::carts::CartsService, errors::DomainError, session::Session};

const NOTICE_CAPACITY: usize = 16;

/// Snapshot of the cart screen.
#[derive(Debug, Clone, PartialEq)]
pub struct CartState {
    pub cart: Cart,
    /// Lines grouped by seller, in first-appearance order.
    pub groups: Vec<CartGroup>,
    pub selection: Selection,
    /// Σ(price × quantity) over the selection, `None` if it cannot be computed.
    pub total: Option<Price>,
    /// A refresh is in flight.
    pub is_loading: bool,
    /// Error of the last refresh, cleared by the next successful one.
    pub error: Option<DomainError>,
    /// When the cart was last loaded from the backend.
    pub loaded_at: Option<Timestamp>,
}

/// One-off events for the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// A mutation failed.
    Toast(DomainError),

    /// Checkout succeeded.
    OrderCreated { order_id: OrderId, total: Price },
}

/// Bookkeeping for quantity changes of one offer that are still in flight.
#[derive(Debug, Clone, Copy)]
struct PendingQuantity {
    /// Sequence number of the most recent change.
    latest: u64,
    /// Highest sequence number the backend acknowledged.
    acked: u64,
    /// Requests that have not completed yet.
    in_flight: u32,
    /// Last quantity the backend accepted.
    confirmed: u32,
    /// The most recent change failed and the line shows `confirmed`.
    rolled_back: bool,
}

impl PendingQuantity {
    fn new(seq: u64, confirmed: u32) -> Self {
        Self {
            latest: seq,
            acked: 0,
            in_flight: 1,
            confirmed,
            rolled_back: false,
        }
    }

    fn push(&mut self, seq: u64) {
        self.latest = seq;
        self.in_flight += 1;
        self.rolled_back = false;
    }
}

#[derive(Debug)]
struct Inner {
    cart: Cart,
    selection: Selection,
    is_loading: bool,
    error: Option<DomainError>,
    loaded_at: Option<Timestamp>,
    pending: FxHashMap<OfferId, PendingQuantity>,
}

impl Inner {
    fn new(currency: &'static Currency) -> Self {
        Self {
            cart: Cart::new(currency),
            selection: Selection::new(),
            is_loading: false,
            error: None,
            loaded_at: None,
            pending: FxHashMap::default(),
        }
    }

    fn snapshot(&self) -> CartState {
        CartState {
            cart: self.cart.clone(),
            groups: self.cart.groups(),
            selection: self.selection.clone(),
            total: self.selection.total(self.cart.currency()).ok(),
            is_loading: self.is_loading,
            error: self.error.clone(),
            loaded_at: self.loaded_at,
        }
    }

    fn forget(&mut self, offers: &[OfferId]) {
        self.cart.remove(offers);
        self.selection.remove(offers);

        for offer in offers {
            self.pending.remove(offer);
        }
    }
}

/// Reactive owner of the cart screen state.
///
/// All mutations go through the store; readers take snapshots with
/// [`CartStore::state`] or follow them with [`CartStore::subscribe`].
pub struct CartStore {
    service: Arc<dyn CartsService>,
    currency: &'static Currency,
    inner: Mutex<Inner>,
    state: watch::Sender<CartState>,
    notices: broadcast::Sender<Notice>,
    generation: AtomicU64,
    mutation_seq: AtomicU64,
}

impl CartStore {
    #[must_use]
    pub fn new(service: Arc<dyn CartsService>, currency: &'static Currency) -> Self {
        let inner = Inner::new(currency);
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);

        Self {
            service,
            currency,
            state: watch::Sender::new(inner.snapshot()),
            inner: Mutex::new(inner),
            notices,
            generation: AtomicU64::new(0),
            mutation_seq: AtomicU64::new(0),
        }
    }

    /// Observe state changes.
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.state.subscribe()
    }

    /// Observe toasts and order confirmations.
    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    /// The latest published state.
    pub fn state(&self) -> CartState {
        self.state.borrow().clone()
    }

    fn publish(&self, inner: &Inner) {
        self.state.send_replace(inner.snapshot());
    }

    fn toast(&self, error: DomainError) -> DomainError {
        // No subscribers is fine.
        self.notices.send(Notice::Toast(error.clone())).ok();
        error
    }

    /// Re-fetch the cart and replace the local copy.
    ///
    /// Only the most recently issued refresh is applied; responses to older
    /// refreshes are dropped. A refresh also forgets pending quantity changes,
    /// since the server copy is authoritative.
    ///
    /// # Errors
    ///
    /// Returns the load error, which is also kept in [`CartState::error`].
    pub async fn refresh(&self, session: &Session) -> Result<(), DomainError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        {
            let mut inner = self.inner.lock().await;
            inner.is_loading = true;
            self.publish(&inner);
        }

        let result = self.service.fetch_cart(session).await;

        let mut inner = self.inner.lock().await;
        let current = self.generation.load(Ordering::SeqCst);

        if current != generation {
            debug!(generation, current, "dropping stale cart response");
            return Ok(());
        }

        inner.is_loading = false;

        let loaded = result
            .map_err(DomainError::from)
            .and_then(|groups| Cart::from_groups(self.currency, groups).map_err(DomainError::from));

        match loaded {
            Ok(cart) => {
                inner.selection.sync_with(&cart);
                inner.cart = cart;
                inner.pending.clear();
                inner.error = None;
                inner.loaded_at = Some(Timestamp::now());

                self.publish(&inner);

                Ok(())
            }
            Err(error) => {
                inner.error = Some(error.clone());

                self.publish(&inner);

                Err(error)
            }
        }
    }

    /// Change the quantity of a line, clamped to what the seller has.
    ///
    /// The new quantity is visible immediately. If persisting it fails and no
    /// newer change for the same offer is in flight, the line is rolled back to
    /// the last confirmed quantity and a toast is sent. An older change that
    /// succeeds after such a rollback moves the line to the quantity it
    /// persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if the offer is not in the cart or the backend rejects
    /// the change.
    pub async fn change_quantity(
        &self,
        session: &Session,
        offer: OfferId,
        requested: i64,
    ) -> Result<u32, DomainError> {
        let seq = self.mutation_seq.fetch_add(1, Ordering::SeqCst) + 1;

        let applied = {
            let mut inner = self.inner.lock().await;

            let change = inner
                .cart
                .set_quantity(offer, requested)
                .map_err(|error| self.toast(error.into()))?;

            if change.is_noop() {
                return Ok(change.applied);
            }

            inner
                .pending
                .entry(offer)
                .and_modify(|pending| pending.push(seq))
                .or_insert_with(|| PendingQuantity::new(seq, change.previous));

            inner.selection.update_quantity(offer, change.applied);

            self.publish(&inner);

            change.applied
        };

        let result = self.service.change_quantity(session, offer, applied).await;

        let mut inner = self.inner.lock().await;

        let Some(mut pending) = inner.pending.get(&offer).copied() else {
            debug!(%offer, "ignoring quantity result after the cart was reloaded");
            return result.map(|()| applied).map_err(DomainError::from);
        };

        pending.in_flight = pending.in_flight.saturating_sub(1);

        let outcome = match result {
            Ok(()) => {
                if seq > pending.acked {
                    pending.acked = seq;
                    pending.confirmed = applied;

                    // The newest change failed earlier, so the line shows the
                    // confirmed quantity and has to follow it.
                    if pending.rolled_back {
                        restore(&mut inner, offer, applied);
                        self.publish(&inner);
                    }
                }

                Ok(applied)
            }
            Err(error) if seq != pending.latest => {
                debug!(%offer, seq, "superseded quantity change failed");
                Err(DomainError::from(error))
            }
            Err(error) => {
                let error = DomainError::from(error);

                pending.rolled_back = true;
                restore(&mut inner, offer, pending.confirmed);

                warn!(
                    %offer,
                    attempted = applied,
                    restored = pending.confirmed,
                    code = %error.code,
                    "rolled back quantity change"
                );

                self.publish(&inner);

                Err(self.toast(error))
            }
        };

        if pending.in_flight == 0 {
            inner.pending.remove(&offer);
        } else {
            inner.pending.insert(offer, pending);
        }

        outcome
    }

    /// Remove offers from the cart once the backend confirms.
    ///
    /// # Errors
    ///
    /// Returns the backend error; local state is left untouched.
    pub async fn delete(&self, session: &Session, offers: Vec<OfferId>) -> Result<(), DomainError> {
        if offers.is_empty() {
            return Ok(());
        }

        if let Err(error) = self.service.remove_items(session, offers.clone()).await {
            return Err(self.toast(error.into()));
        }

        let mut inner = self.inner.lock().await;

        inner.forget(&offers);

        self.publish(&inner);

        Ok(())
    }

    /// Put an offer into the cart and reload it.
    ///
    /// # Errors
    ///
    /// Returns the backend error, or the error of the follow-up refresh.
    pub async fn add_item(
        &self,
        session: &Session,
        offer: OfferId,
        quantity: u32,
    ) -> Result<(), DomainError> {
        if let Err(error) = self.service.add_item(session, offer, quantity).await {
            return Err(self.toast(error.into()));
        }

        self.refresh(session).await
    }

    /// Flip the selection of one line.
    ///
    /// # Errors
    ///
    /// Returns an error if the offer is not in the cart.
    pub async fn toggle(&self, offer: OfferId) -> Result<bool, DomainError> {
        let mut inner = self.inner.lock().await;
        let Inner {
            cart, selection, ..
        } = &mut *inner;

        let selected = selection.toggle(cart, offer)?;

        self.publish(&inner);

        Ok(selected)
    }

    /// Select every safe-deal line of a seller.
    pub async fn select_all_for_seller(&self, seller: SellerId) -> usize {
        let mut inner = self.inner.lock().await;
        let Inner {
            cart, selection, ..
        } = &mut *inner;

        let added = selection.select_all_for_seller(cart, seller);

        self.publish(&inner);

        added
    }

    /// Deselect every line of a seller.
    pub async fn deselect_seller(&self, seller: SellerId) -> usize {
        let mut inner = self.inner.lock().await;

        let removed = inner.selection.deselect_seller(seller);

        self.publish(&inner);

        removed
    }

    /// Deselect everything.
    pub async fn clear_selection(&self) {
        let mut inner = self.inner.lock().await;

        inner.selection.clear();

        self.publish(&inner);
    }

    /// Order the selected lines.
    ///
    /// On success the ordered lines leave the cart, the selection is cleared
    /// and [`Notice::OrderCreated`] is sent.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is selected or the backend refuses the
    /// order; local state is left untouched.
    pub async fn checkout(&self, session: &Session) -> Result<OrderId, DomainError> {
        let draft = {
            let inner = self.inner.lock().await;

            OrderDraft::from_selection(&inner.cart, &inner.selection)
                .map_err(|error| self.toast(error.into()))?
        };

        let offers = draft.offer_ids();
        let total = draft.total;

        let order_id = self
            .service
            .create_order(session, draft)
            .await
            .map_err(|error| self.toast(error.into()))?;

        {
            let mut inner = self.inner.lock().await;

            inner.forget(&offers);
            inner.selection.clear();

            self.publish(&inner);
        }

        info!(%order_id, %total, lines = offers.len(), "order created");

        self.notices
            .send(Notice::OrderCreated { order_id, total })
            .ok();

        Ok(order_id)
    }

    /// Drop everything, e.g. on logout. In-flight refreshes are ignored.
    pub async fn discard(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);

        let mut inner = self.inner.lock().await;

        *inner = Inner::new(self.currency);

        self.publish(&inner);
    }
}

fn restore(inner: &mut Inner, offer: OfferId, quantity: u32) {
    if inner.cart.set_quantity(offer, i64::from(quantity)).is_ok() {
        inner.selection.update_quantity(offer, quantity);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use async_trait::async_trait;
    use bazaar::{
        cart::{CartLine, group_by_seller},
        sellers::Seller,
    };
    use mockall::predicate::eq;
    use rusty_money::{Money, iso::RUB};
    use testresult::TestResult;
    use tokio::sync::oneshot;

    use crate::{
        api::ApiError,
        domain::carts::MockCartsService,
        errors::{EMPTY_SELECTION, UNKNOWN_OFFER},
        test::test_session,
    };

    use super::*;

    fn line(offer: i64, seller: i64, minor: i64, available: u32, quantity: u32) -> CartLine {
        CartLine {
            offer_id: OfferId::new(offer),
            seller_id: SellerId::new(seller),
            title: format!("Offer {offer}"),
            price_per_item: Money::from_minor(minor, RUB),
            available_quantity: available,
            selected_quantity: quantity,
            safe_deal_eligible: true,
        }
    }

    fn groups(lines: &[CartLine]) -> Vec<CartGroup> {
        let sellers: FxHashMap<SellerId, Seller> = lines
            .iter()
            .map(|line| (line.seller_id, Seller::unnamed(line.seller_id)))
            .collect();

        group_by_seller(lines, &sellers)
    }

    /// Seller 1 sells offer 1 (10.00 × 1, 5 in stock) and offer 2 (5.00 × 2).
    fn seller_a() -> Vec<CartGroup> {
        groups(&[line(1, 1, 10_00, 5, 1), line(2, 1, 5_00, 9, 2)])
    }

    fn server_error(code: &str) -> ApiError {
        ApiError::Server {
            code: code.to_string(),
            message: format!("{code} happened"),
        }
    }

    fn mock_with_cart(cart: Vec<CartGroup>) -> MockCartsService {
        let mut mock = MockCartsService::new();

        mock.expect_fetch_cart()
            .returning(move |_| Ok(cart.clone()));

        mock
    }

    async fn loaded_store(mock: MockCartsService) -> Result<CartStore, DomainError> {
        let store = CartStore::new(Arc::new(mock), RUB);

        store.refresh(&test_session()).await?;

        Ok(store)
    }

    fn quantity(state: &CartState, offer: i64) -> Option<u32> {
        state
            .cart
            .line(OfferId::new(offer))
            .map(|line| line.selected_quantity)
    }

    #[tokio::test]
    async fn selecting_a_seller_totals_price_times_quantity() -> TestResult {
        let mock = mock_with_cart(seller_a());
        let store = loaded_store(mock).await?;

        let added = store.select_all_for_seller(SellerId::new(1)).await;

        assert_eq!(added, 2);
        assert_eq!(store.state().total, Some(Money::from_minor(20_00, RUB)));

        store.toggle(OfferId::new(2)).await?;

        assert_eq!(store.state().total, Some(Money::from_minor(10_00, RUB)));

        Ok(())
    }

    #[tokio::test]
    async fn toggling_an_unknown_offer_fails() -> TestResult {
        let store = loaded_store(mock_with_cart(seller_a())).await?;

        let result = store.toggle(OfferId::new(99)).await;

        assert_eq!(result.map_err(|error| error.code), Err(UNKNOWN_OFFER.to_string()));

        Ok(())
    }

    #[tokio::test]
    async fn quantity_is_clamped_before_it_is_persisted() -> TestResult {
        let mut mock = mock_with_cart(seller_a());

        mock.expect_change_quantity()
            .withf(|_, offer, quantity| *offer == OfferId::new(1) && *quantity == 5)
            .times(1)
            .returning(|_, _, _| Ok(()));

        let store = loaded_store(mock).await?;

        let applied = store
            .change_quantity(&test_session(), OfferId::new(1), 99)
            .await?;

        assert_eq!(applied, 5);
        assert_eq!(quantity(&store.state(), 1), Some(5));

        Ok(())
    }

    #[tokio::test]
    async fn unchanged_quantity_is_not_persisted() -> TestResult {
        let mut mock = mock_with_cart(seller_a());

        mock.expect_change_quantity().never();

        let store = loaded_store(mock).await?;

        let applied = store
            .change_quantity(&test_session(), OfferId::new(1), 0)
            .await?;

        assert_eq!(applied, 1);

        Ok(())
    }

    #[tokio::test]
    async fn failed_quantity_change_rolls_back_and_toasts() -> TestResult {
        let mut mock = mock_with_cart(seller_a());

        mock.expect_change_quantity()
            .returning(|_, _, _| Err(server_error("OUT_OF_STOCK")));

        let store = loaded_store(mock).await?;

        store.toggle(OfferId::new(1)).await?;

        let mut notices = store.notices();

        let result = store
            .change_quantity(&test_session(), OfferId::new(1), 3)
            .await;

        assert!(result.is_err());

        let state = store.state();

        assert_eq!(quantity(&state, 1), Some(1));
        assert_eq!(
            state.selection.get(OfferId::new(1)).map(|entry| entry.quantity),
            Some(1)
        );
        assert_eq!(state.total, Some(Money::from_minor(10_00, RUB)));

        assert!(matches!(
            notices.try_recv()?,
            Notice::Toast(DomainError { code, .. }) if code == "OUT_OF_STOCK"
        ));

        Ok(())
    }

    #[tokio::test]
    async fn selected_quantity_follows_line_quantity() -> TestResult {
        let mut mock = mock_with_cart(seller_a());

        mock.expect_change_quantity().returning(|_, _, _| Ok(()));

        let store = loaded_store(mock).await?;

        store.select_all_for_seller(SellerId::new(1)).await;
        store
            .change_quantity(&test_session(), OfferId::new(1), 3)
            .await?;

        assert_eq!(store.state().total, Some(Money::from_minor(40_00, RUB)));

        Ok(())
    }

    #[tokio::test]
    async fn delete_removes_lines_and_selection() -> TestResult {
        let mut mock = mock_with_cart(seller_a());

        mock.expect_remove_items()
            .with(mockall::predicate::always(), eq(vec![OfferId::new(1)]))
            .times(1)
            .returning(|_, _| Ok(()));

        let store = loaded_store(mock).await?;

        store.select_all_for_seller(SellerId::new(1)).await;
        store
            .delete(&test_session(), vec![OfferId::new(1)])
            .await?;

        let state = store.state();

        assert!(!state.cart.contains(OfferId::new(1)));
        assert!(!state.selection.contains(OfferId::new(1)));
        assert_eq!(state.total, Some(Money::from_minor(10_00, RUB)));

        Ok(())
    }

    #[tokio::test]
    async fn failed_delete_leaves_state_unchanged() -> TestResult {
        let mut mock = mock_with_cart(seller_a());

        mock.expect_remove_items()
            .returning(|_, _| Err(server_error("LOCKED")));

        let store = loaded_store(mock).await?;

        store.select_all_for_seller(SellerId::new(1)).await;

        let before = store.state();
        let mut notices = store.notices();

        let result = store
            .delete(&test_session(), vec![OfferId::new(1), OfferId::new(2)])
            .await;

        assert!(result.is_err());
        assert_eq!(store.state(), before);
        assert!(matches!(notices.try_recv()?, Notice::Toast(_)));

        Ok(())
    }

    #[tokio::test]
    async fn checkout_removes_ordered_lines() -> TestResult {
        let mut mock = mock_with_cart(groups(&[
            line(1, 1, 10_00, 5, 1),
            line(2, 1, 5_00, 9, 2),
            line(3, 2, 7_00, 1, 1),
        ]));

        mock.expect_create_order()
            .withf(|_, draft| draft.total == Money::from_minor(20_00, RUB))
            .times(1)
            .returning(|_, _| Ok(OrderId::new(900)));

        let store = loaded_store(mock).await?;
        let mut notices = store.notices();

        store.select_all_for_seller(SellerId::new(1)).await;

        let order_id = store.checkout(&test_session()).await?;

        assert_eq!(order_id, OrderId::new(900));

        let state = store.state();
        let remaining: Vec<i64> = state
            .cart
            .lines()
            .iter()
            .map(|line| line.offer_id.get())
            .collect();

        assert_eq!(remaining, vec![3]);
        assert!(state.selection.is_empty());
        assert_eq!(
            notices.try_recv()?,
            Notice::OrderCreated {
                order_id: OrderId::new(900),
                total: Money::from_minor(20_00, RUB),
            }
        );

        Ok(())
    }

    #[tokio::test]
    async fn checkout_without_selection_is_rejected_locally() -> TestResult {
        let mut mock = mock_with_cart(seller_a());

        mock.expect_create_order().never();

        let store = loaded_store(mock).await?;

        let result = store.checkout(&test_session()).await;

        assert_eq!(
            result.map_err(|error| error.code),
            Err(EMPTY_SELECTION.to_string())
        );

        Ok(())
    }

    #[tokio::test]
    async fn refresh_prunes_selection_to_remaining_offers() -> TestResult {
        let mut mock = MockCartsService::new();
        let mut responses = VecDeque::from([
            seller_a(),
            groups(&[line(2, 1, 6_00, 9, 3)]),
        ]);

        mock.expect_fetch_cart()
            .times(2)
            .returning(move |_| Ok(responses.pop_front().unwrap_or_default()));

        let store = loaded_store(mock).await?;

        store.select_all_for_seller(SellerId::new(1)).await;
        store.refresh(&test_session()).await?;

        let state = store.state();

        assert!(!state.selection.contains(OfferId::new(1)));
        assert_eq!(state.total, Some(Money::from_minor(18_00, RUB)));

        Ok(())
    }

    #[tokio::test]
    async fn failed_refresh_keeps_cart_and_records_error() -> TestResult {
        let mut mock = MockCartsService::new();
        let mut calls = 0;

        mock.expect_fetch_cart().returning(move |_| {
            calls += 1;

            if calls == 1 {
                Ok(seller_a())
            } else {
                Err(server_error("MAINTENANCE"))
            }
        });

        let store = loaded_store(mock).await?;

        assert!(store.refresh(&test_session()).await.is_err());

        let state = store.state();

        assert_eq!(state.cart.len(), 2);
        assert!(!state.is_loading);
        assert_eq!(
            state.error.map(|error| error.code),
            Some("MAINTENANCE".to_string())
        );

        Ok(())
    }

    type Gate<T> = Mutex<VecDeque<oneshot::Receiver<T>>>;

    /// Hands out cart and quantity responses only when the test releases them.
    struct GatedCarts {
        responses: Gate<Vec<CartGroup>>,
        quantities: Gate<Result<(), ApiError>>,
    }

    impl GatedCarts {
        fn new(
            responses: Vec<oneshot::Receiver<Vec<CartGroup>>>,
            quantities: Vec<oneshot::Receiver<Result<(), ApiError>>>,
        ) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                quantities: Mutex::new(quantities.into()),
            }
        }
    }

    #[async_trait]
    impl CartsService for GatedCarts {
        async fn fetch_cart(&self, _session: &Session) -> Result<Vec<CartGroup>, ApiError> {
            let receiver = self
                .responses
                .lock()
                .await
                .pop_front()
                .ok_or(ApiError::MissingPayload)?;

            receiver.await.map_err(|_| ApiError::MissingPayload)
        }

        async fn add_item(&self, _: &Session, _: OfferId, _: u32) -> Result<(), ApiError> {
            Err(ApiError::MissingPayload)
        }

        async fn change_quantity(&self, _: &Session, _: OfferId, _: u32) -> Result<(), ApiError> {
            let receiver = self
                .quantities
                .lock()
                .await
                .pop_front()
                .ok_or(ApiError::MissingPayload)?;

            receiver.await.unwrap_or(Err(ApiError::MissingPayload))
        }

        async fn remove_items(&self, _: &Session, _: Vec<OfferId>) -> Result<(), ApiError> {
            Err(ApiError::MissingPayload)
        }

        async fn create_order(&self, _: &Session, _: OrderDraft) -> Result<OrderId, ApiError> {
            Err(ApiError::MissingPayload)
        }
    }

    #[tokio::test]
    async fn stale_refresh_response_is_dropped() -> TestResult {
        let (old_tx, old_rx) = oneshot::channel();
        let (new_tx, new_rx) = oneshot::channel();

        let store = CartStore::new(
            Arc::new(GatedCarts::new(vec![old_rx, new_rx], vec![])),
            RUB,
        );
        let session = test_session();

        new_tx
            .send(groups(&[line(2, 1, 5_00, 9, 1)]))
            .map_err(|_| "new response not delivered")?;

        let old = store.refresh(&session);
        let new = async {
            let result = store.refresh(&session).await;
            old_tx.send(seller_a()).ok();
            result
        };

        let (old_result, new_result) = tokio::join!(old, new);

        old_result?;
        new_result?;

        let offers: Vec<i64> = store
            .state()
            .cart
            .lines()
            .iter()
            .map(|line| line.offer_id.get())
            .collect();

        assert_eq!(offers, vec![2]);

        Ok(())
    }

    /// A store whose cart is already loaded with [`seller_a`] and whose
    /// quantity changes wait on `quantities`.
    async fn gated_store(
        quantities: Vec<oneshot::Receiver<Result<(), ApiError>>>,
    ) -> Result<CartStore, Box<dyn std::error::Error>> {
        let (tx, rx) = oneshot::channel();

        tx.send(seller_a()).map_err(|_| "cart not delivered")?;

        let store = CartStore::new(Arc::new(GatedCarts::new(vec![rx], quantities)), RUB);

        store.refresh(&test_session()).await?;

        Ok(store)
    }

    #[tokio::test]
    async fn older_success_after_latest_failure_restores_server_quantity() -> TestResult {
        let (first_tx, first_rx) = oneshot::channel();
        let (second_tx, second_rx) = oneshot::channel();

        let store = gated_store(vec![first_rx, second_rx]).await?;
        let session = test_session();

        store.toggle(OfferId::new(1)).await?;

        let mut notices = store.notices();

        second_tx
            .send(Err(server_error("OUT_OF_STOCK")))
            .map_err(|_| "second result not delivered")?;

        let first = store.change_quantity(&session, OfferId::new(1), 2);
        let second = async {
            let result = store.change_quantity(&session, OfferId::new(1), 3).await;
            first_tx.send(Ok(())).ok();
            result
        };

        let (first_result, second_result) = tokio::join!(first, second);

        assert_eq!(first_result?, 2);
        assert_eq!(
            second_result.map_err(|error| error.code),
            Err("OUT_OF_STOCK".to_string())
        );

        let state = store.state();

        assert_eq!(quantity(&state, 1), Some(2));
        assert_eq!(
            state.selection.get(OfferId::new(1)).map(|entry| entry.quantity),
            Some(2)
        );
        assert_eq!(state.total, Some(Money::from_minor(20_00, RUB)));

        assert!(matches!(notices.try_recv()?, Notice::Toast(_)));
        assert!(notices.try_recv().is_err());

        Ok(())
    }

    #[tokio::test]
    async fn superseded_failure_keeps_newer_quantity_silently() -> TestResult {
        let (first_tx, first_rx) = oneshot::channel();
        let (second_tx, second_rx) = oneshot::channel();

        let store = gated_store(vec![first_rx, second_rx]).await?;
        let session = test_session();
        let mut notices = store.notices();

        let first = async {
            let result = store.change_quantity(&session, OfferId::new(1), 2).await;
            let seen = quantity(&store.state(), 1);
            second_tx.send(Ok(())).ok();
            (result, seen)
        };
        let second = store.change_quantity(&session, OfferId::new(1), 3);
        let release = async {
            first_tx.send(Err(server_error("TIMEOUT"))).ok();
        };

        let ((first_result, seen), second_result, ()) = tokio::join!(first, second, release);

        assert!(first_result.is_err());
        assert_eq!(seen, Some(3));
        assert_eq!(second_result?, 3);
        assert_eq!(quantity(&store.state(), 1), Some(3));
        assert!(notices.try_recv().is_err());

        Ok(())
    }

    #[tokio::test]
    async fn latest_failure_rolls_back_to_quantity_acked_in_between() -> TestResult {
        let (first_tx, first_rx) = oneshot::channel();
        let (second_tx, second_rx) = oneshot::channel();

        let store = gated_store(vec![first_rx, second_rx]).await?;
        let session = test_session();

        let first = async {
            let result = store.change_quantity(&session, OfferId::new(1), 2).await;
            second_tx.send(Err(server_error("OUT_OF_STOCK"))).ok();
            result
        };
        let second = store.change_quantity(&session, OfferId::new(1), 3);
        let release = async {
            first_tx.send(Ok(())).ok();
        };

        let (first_result, second_result, ()) = tokio::join!(first, second, release);

        assert_eq!(first_result?, 2);
        assert!(second_result.is_err());
        assert_eq!(quantity(&store.state(), 1), Some(2));

        Ok(())
    }

    #[tokio::test]
    async fn discard_drops_in_flight_refresh() -> TestResult {
        let (tx, rx) = oneshot::channel();

        let store = CartStore::new(Arc::new(GatedCarts::new(vec![rx], vec![])), RUB);
        let session = test_session();

        let refresh = store.refresh(&session);
        let logout = async {
            store.discard().await;
            tx.send(seller_a()).ok();
        };

        let (refresh_result, ()) = tokio::join!(refresh, logout);

        refresh_result?;

        let state = store.state();

        assert!(state.cart.is_empty());
        assert!(!state.is_loading);
        assert_eq!(state.loaded_at, None);

        Ok(())
    }

    #[tokio::test]
    async fn discard_clears_everything() -> TestResult {
        let store = loaded_store(mock_with_cart(seller_a())).await?;

        store.select_all_for_seller(SellerId::new(1)).await;
        store.discard().await;

        let state = store.state();

        assert!(state.cart.is_empty());
        assert!(state.selection.is_empty());
        assert_eq!(state.loaded_at, None);

        Ok(())
    }
}
