use std::{
    collections::HashSet,
    sync::{Arc, Mutex, PoisonError},
};

use crate::{
    api::{chat::ChatClient, checkout_webhook::OrderNotifier},
    cart::{CART_STORAGE_KEY, CartStorage, CartStore},
    checkout::CheckoutSubmitter,
    store::{CatalogStore, OrderStore},
};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogStore>,
    pub orders: Arc<dyn OrderStore>,
    pub cart_storage: Arc<dyn CartStorage>,
    pub notifier: Arc<dyn OrderNotifier>,
    pub chat: ChatClient,
    pub admin_token: Option<Arc<str>>,
    checkouts_in_flight: Arc<Mutex<HashSet<String>>>,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        orders: Arc<dyn OrderStore>,
        cart_storage: Arc<dyn CartStorage>,
        notifier: Arc<dyn OrderNotifier>,
        chat: ChatClient,
        admin_token: Option<String>,
    ) -> Self {
        Self {
            catalog,
            orders,
            cart_storage,
            notifier,
            chat,
            admin_token: admin_token.map(Arc::from),
            checkouts_in_flight: Arc::default(),
        }
    }

    /// The cart belonging to one shopper session.
    pub fn cart(&self, session: &SessionId) -> CartStore<Arc<dyn CartStorage>> {
        CartStore::load_with_key(
            self.cart_storage.clone(),
            format!("{CART_STORAGE_KEY}:{}", session.0),
        )
    }

    pub fn checkout_submitter(&self) -> CheckoutSubmitter {
        CheckoutSubmitter::new(self.orders.clone(), self.notifier.clone())
    }

    /// Marks `session` as submitting. `None` if it already is.
    pub fn begin_checkout(&self, session: &SessionId) -> Option<CheckoutGuard> {
        // The set holds plain session ids, so a poisoned lock is still consistent.
        let mut in_flight = self
            .checkouts_in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        in_flight.insert(session.0.clone()).then(|| CheckoutGuard {
            session: session.0.clone(),
            in_flight: self.checkouts_in_flight.clone(),
        })
    }
}

/// Shopper session identifier taken from the `x-session-id` header.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(pub String);

/// Releases the session's in-flight checkout marker on drop.
pub struct CheckoutGuard {
    session: String,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl Drop for CheckoutGuard {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.session);
    }
}
