//! Shopping cart held on behalf of a shopper and persisted to a [`CartStorage`] slot.

pub mod storage;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use utoipa::ToSchema;

use crate::price::format_price;

pub use storage::{CartStorage, FileStorage, MemoryStorage, StorageError};

/// Storage key the cart is persisted under.
pub const CART_STORAGE_KEY: &str = "jack-joias-cart";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl CartItem {
    /// Two lines are the same line when product id and size both match.
    pub fn same_line(&self, id: &str, size: Option<&str>) -> bool {
        self.id == id && self.size.as_deref() == size
    }

    /// `price * quantity`, or `None` when it does not fit in a [`Decimal`].
    pub fn subtotal(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

/// Sum of line subtotals, or `None` on overflow.
fn checked_total(items: &[CartItem]) -> Option<Decimal> {
    items
        .iter()
        .try_fold(Decimal::ZERO, |total, item| total.checked_add(item.subtotal()?))
}

#[derive(Debug, Error)]
pub enum CartError {
    #[error("quantity must be at least 1")]
    InvalidQuantity,
    #[error("price must not be negative")]
    NegativePrice,
    #[error("cart total is too large")]
    TotalOverflow,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Whether the cart panel is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CartDrawer {
    #[default]
    Closed,
    Open,
}

/// Read-only snapshot handed to callers outside the store.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub total_items: u64,
    pub total_price: Decimal,
    pub formatted_total: String,
    pub drawer: CartDrawer,
}

/// Insertion-ordered cart lines, unique by `(id, size)`.
///
/// Mutations go through the methods below and every one of them writes the
/// whole collection back to storage before returning.
#[derive(Debug)]
pub struct CartStore<S> {
    storage: S,
    key: String,
    items: Vec<CartItem>,
    drawer: CartDrawer,
}

impl<S: CartStorage> CartStore<S> {
    /// Loads the cart saved under [`CART_STORAGE_KEY`].
    pub fn load(storage: S) -> Self {
        Self::load_with_key(storage, CART_STORAGE_KEY)
    }

    /// Loads the cart saved under `key`. Anything unreadable starts an empty cart.
    pub fn load_with_key(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let items = match storage.get_item(&key) {
            Ok(Some(raw)) => parse_items(&key, &raw),
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(key = %key, error = %err, "Failed to read stored cart, starting empty");
                Vec::new()
            }
        };

        Self {
            storage,
            key,
            items,
            drawer: CartDrawer::Closed,
        }
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn drawer(&self) -> CartDrawer {
        self.drawer
    }

    pub fn open_drawer(&mut self) {
        self.drawer = CartDrawer::Open;
    }

    pub fn close_drawer(&mut self) {
        self.drawer = CartDrawer::Closed;
    }

    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    pub fn total_price(&self) -> Decimal {
        // Every mutation and load rejects line sets whose total overflows.
        checked_total(&self.items).unwrap_or(Decimal::MAX)
    }

    /// Adds `item`, merging into an existing line with the same id and size.
    pub fn add_item(&mut self, item: CartItem) -> Result<(), CartError> {
        if item.quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        if item.price.is_sign_negative() && !item.price.is_zero() {
            return Err(CartError::NegativePrice);
        }

        let mut items = self.items.clone();
        match items
            .iter_mut()
            .find(|line| line.same_line(&item.id, item.size.as_deref()))
        {
            Some(line) => line.quantity = line.quantity.saturating_add(item.quantity),
            None => items.push(item),
        }

        self.replace_items(items)?;
        self.drawer = CartDrawer::Open;
        self.persist()
    }

    /// Drops the matching line. Absent lines are not an error.
    pub fn remove_item(&mut self, id: &str, size: Option<&str>) -> Result<(), CartError> {
        self.items.retain(|line| !line.same_line(id, size));
        self.persist()
    }

    /// Sets the quantity of the matching line; zero or less removes it.
    pub fn update_quantity(
        &mut self,
        id: &str,
        size: Option<&str>,
        quantity: i64,
    ) -> Result<(), CartError> {
        if quantity <= 0 {
            return self.remove_item(id, size);
        }
        let quantity = u32::try_from(quantity).map_err(|_| CartError::InvalidQuantity)?;

        let mut items = self.items.clone();
        if let Some(line) = items.iter_mut().find(|line| line.same_line(id, size)) {
            line.quantity = quantity;
        }
        self.replace_items(items)?;
        self.persist()
    }

    pub fn clear(&mut self) -> Result<(), CartError> {
        self.items.clear();
        self.persist()
    }

    pub fn view(&self) -> CartView {
        let total_price = self.total_price();
        CartView {
            items: self.items.clone(),
            total_items: self.total_items(),
            total_price,
            formatted_total: format_price(total_price),
            drawer: self.drawer,
        }
    }

    /// Installs `items` unless their total would overflow; the cart is unchanged on error.
    fn replace_items(&mut self, items: Vec<CartItem>) -> Result<(), CartError> {
        if checked_total(&items).is_none() {
            return Err(CartError::TotalOverflow);
        }
        self.items = items;
        Ok(())
    }

    fn persist(&self) -> Result<(), CartError> {
        // A Vec of plain structs always serializes.
        let raw = serde_json::to_string(&self.items).unwrap_or_else(|_| "[]".to_owned());
        self.storage.set_item(&self.key, &raw)?;
        Ok(())
    }
}

fn parse_items(key: &str, raw: &str) -> Vec<CartItem> {
    match serde_json::from_str::<Vec<CartItem>>(raw) {
        Ok(items) => {
            let before = items.len();
            let items: Vec<CartItem> = items.into_iter().filter(|i| i.quantity > 0).collect();
            if items.len() != before {
                warn!(key = %key, dropped = before - items.len(), "Dropped stored cart lines with no quantity");
            }
            if checked_total(&items).is_none() {
                warn!(key = %key, "Discarding stored cart whose total overflows");
                return Vec::new();
            }
            items
        }
        Err(err) => {
            warn!(key = %key, error = %err, "Discarding unreadable stored cart");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testresult::TestResult;

    fn ring(quantity: u32, size: Option<&str>) -> CartItem {
        CartItem {
            id: "ring-1".into(),
            name: "Anel Solitário".into(),
            price: Decimal::from(4890),
            quantity,
            size: size.map(str::to_owned),
            image_url: None,
        }
    }

    fn necklace(quantity: u32) -> CartItem {
        CartItem {
            id: "necklace-7".into(),
            name: "Colar Pérolas".into(),
            price: Decimal::new(129_950, 2),
            quantity,
            size: None,
            image_url: Some("https://cdn.example/necklace.jpg".into()),
        }
    }

    #[test]
    fn adding_same_line_merges_quantities() -> TestResult {
        let mut cart = CartStore::load(MemoryStorage::new());
        for quantity in [1, 2, 4] {
            cart.add_item(ring(quantity, Some("14")))?;
        }

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 7);
        Ok(())
    }

    #[test]
    fn different_sizes_are_distinct_lines_in_insertion_order() -> TestResult {
        let mut cart = CartStore::load(MemoryStorage::new());
        cart.add_item(ring(1, Some("14")))?;
        cart.add_item(necklace(1))?;
        cart.add_item(ring(1, Some("16")))?;
        cart.add_item(ring(1, None))?;

        let lines: Vec<_> = cart
            .items()
            .iter()
            .map(|i| (i.id.as_str(), i.size.as_deref()))
            .collect();
        assert_eq!(
            lines,
            vec![
                ("ring-1", Some("14")),
                ("necklace-7", None),
                ("ring-1", Some("16")),
                ("ring-1", None),
            ]
        );
        Ok(())
    }

    #[test]
    fn add_rejects_zero_quantity_and_negative_price() {
        let mut cart = CartStore::load(MemoryStorage::new());
        assert!(matches!(
            cart.add_item(ring(0, None)),
            Err(CartError::InvalidQuantity)
        ));

        let mut cheap = ring(1, None);
        cheap.price = Decimal::from(-1);
        assert!(matches!(cart.add_item(cheap), Err(CartError::NegativePrice)));
        assert!(cart.is_empty());
    }

    #[test]
    fn add_opens_the_drawer() -> TestResult {
        let mut cart = CartStore::load(MemoryStorage::new());
        assert_eq!(cart.drawer(), CartDrawer::Closed);

        cart.add_item(necklace(1))?;
        assert_eq!(cart.drawer(), CartDrawer::Open);

        cart.close_drawer();
        assert_eq!(cart.drawer(), CartDrawer::Closed);
        Ok(())
    }

    #[test]
    fn update_to_zero_matches_remove() -> TestResult {
        let mut updated = CartStore::load(MemoryStorage::new());
        let mut removed = CartStore::load(MemoryStorage::new());
        for cart in [&mut updated, &mut removed] {
            cart.add_item(ring(2, Some("14")))?;
            cart.add_item(necklace(1))?;
        }

        updated.update_quantity("ring-1", Some("14"), 0)?;
        removed.remove_item("ring-1", Some("14"))?;

        assert_eq!(updated.items(), removed.items());
        assert_eq!(updated.items().len(), 1);
        Ok(())
    }

    #[test]
    fn update_negative_removes_and_missing_line_is_noop() -> TestResult {
        let mut cart = CartStore::load(MemoryStorage::new());
        cart.add_item(necklace(3))?;

        cart.update_quantity("missing", None, 5)?;
        cart.remove_item("missing", None)?;
        assert_eq!(cart.items().len(), 1);

        cart.update_quantity("necklace-7", None, -2)?;
        assert!(cart.is_empty());
        Ok(())
    }

    #[test]
    fn update_replaces_quantity_in_place() -> TestResult {
        let mut cart = CartStore::load(MemoryStorage::new());
        cart.add_item(ring(1, Some("14")))?;
        cart.add_item(necklace(1))?;

        cart.update_quantity("ring-1", Some("14"), 5)?;

        assert_eq!(cart.items()[0].id, "ring-1");
        assert_eq!(cart.items()[0].quantity, 5);
        assert!(matches!(
            cart.update_quantity("ring-1", Some("14"), i64::from(u32::MAX) + 1),
            Err(CartError::InvalidQuantity)
        ));
        Ok(())
    }

    #[test]
    fn totals_follow_every_mutation() -> TestResult {
        let mut cart = CartStore::load(MemoryStorage::new());
        assert_eq!(cart.total_items(), 0);
        assert_eq!(cart.total_price(), Decimal::ZERO);

        cart.add_item(ring(2, None))?;
        cart.add_item(necklace(1))?;
        assert_eq!(cart.total_items(), 3);
        assert_eq!(cart.total_price(), Decimal::new(1_107_950, 2));

        cart.update_quantity("ring-1", None, 1)?;
        assert_eq!(cart.total_items(), 2);
        assert_eq!(cart.total_price(), Decimal::new(618_950, 2));

        cart.clear()?;
        assert_eq!(cart.total_items(), 0);
        assert_eq!(cart.total_price(), Decimal::ZERO);
        Ok(())
    }

    #[test]
    fn reload_from_same_storage_reproduces_items() -> TestResult {
        let storage = MemoryStorage::new();
        let mut cart = CartStore::load(&storage);
        cart.add_item(ring(2, Some("14")))?;
        cart.add_item(necklace(1))?;
        let saved = cart.items().to_vec();
        drop(cart);

        let reloaded = CartStore::load(&storage);
        assert_eq!(reloaded.items(), saved.as_slice());
        assert_eq!(reloaded.drawer(), CartDrawer::Closed);
        Ok(())
    }

    #[test]
    fn corrupt_storage_yields_empty_cart() -> TestResult {
        let storage = MemoryStorage::new();
        storage.set_item(CART_STORAGE_KEY, "{not json")?;

        let cart = CartStore::load(&storage);
        assert!(cart.is_empty());
        Ok(())
    }

    #[test]
    fn stored_lines_without_quantity_are_dropped() -> TestResult {
        let storage = MemoryStorage::new();
        storage.set_item(
            CART_STORAGE_KEY,
            r#"[{"id":"a","name":"A","price":10,"quantity":0},{"id":"b","name":"B","price":5,"quantity":2}]"#,
        )?;

        let cart = CartStore::load(&storage);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].id, "b");
        Ok(())
    }

    #[test]
    fn separate_keys_do_not_share_lines() -> TestResult {
        let storage = MemoryStorage::new();
        let mut first = CartStore::load_with_key(&storage, "jack-joias-cart:a");
        first.add_item(necklace(1))?;

        let second = CartStore::load_with_key(&storage, "jack-joias-cart:b");
        assert!(second.is_empty());
        Ok(())
    }

    #[test]
    fn rejects_lines_whose_total_overflows() -> TestResult {
        let mut cart = CartStore::load(MemoryStorage::new());
        let mut huge = necklace(1);
        huge.price = Decimal::MAX;
        cart.add_item(huge.clone())?;

        assert!(matches!(cart.add_item(huge), Err(CartError::TotalOverflow)));
        assert!(matches!(
            cart.update_quantity("necklace-7", None, 2),
            Err(CartError::TotalOverflow)
        ));
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 1);
        assert_eq!(cart.total_price(), Decimal::MAX);
        Ok(())
    }

    #[test]
    fn quantity_update_that_overflows_keeps_previous_quantity() -> TestResult {
        let mut cart = CartStore::load(MemoryStorage::new());
        let mut pricey = ring(1, None);
        pricey.price = Decimal::from_i128_with_scale(10_i128.pow(20), 0);
        cart.add_item(pricey)?;

        assert!(matches!(
            cart.update_quantity("ring-1", None, i64::from(u32::MAX)),
            Err(CartError::TotalOverflow)
        ));
        assert_eq!(cart.items()[0].quantity, 1);
        assert_eq!(cart.total_price(), Decimal::from_i128_with_scale(10_i128.pow(20), 0));
        Ok(())
    }

    #[test]
    fn large_totals_still_render() -> TestResult {
        let mut cart = CartStore::load(MemoryStorage::new());
        let mut pricey = ring(1, None);
        pricey.price = Decimal::from_i128_with_scale(10_i128.pow(27), 0);
        cart.add_item(pricey)?;

        let view = cart.view();
        assert!(view.formatted_total.starts_with("R$\u{a0}1.000.000"));
        assert!(view.formatted_total.ends_with(",00"));
        Ok(())
    }

    #[test]
    fn stored_cart_with_overflowing_total_loads_empty() -> TestResult {
        let storage = MemoryStorage::new();
        let max = Decimal::MAX.to_string();
        storage.set_item(
            CART_STORAGE_KEY,
            &format!(
                r#"[{{"id":"a","name":"A","price":"{max}","quantity":1}},{{"id":"b","name":"B","price":"{max}","quantity":1}}]"#
            ),
        )?;

        let cart = CartStore::load(&storage);
        assert!(cart.is_empty());
        assert_eq!(cart.total_price(), Decimal::ZERO);
        Ok(())
    }

    #[test]
    fn view_formats_total() -> TestResult {
        let mut cart = CartStore::load(MemoryStorage::new());
        cart.add_item(ring(1, None))?;

        let view = cart.view();
        assert_eq!(view.total_items, 1);
        assert_eq!(view.formatted_total, "R$\u{a0}4.890,00");
        assert_eq!(view.drawer, CartDrawer::Open);
        Ok(())
    }
}
