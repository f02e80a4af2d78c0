use std::sync::{
    Mutex, MutexGuard,
    atomic::{AtomicBool, Ordering},
};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    models::{
        CreateOrderEntity, CreateOrderItemEntity, CreateProductEntity, OrderEntity,
        OrderItemEntity, ProductEntity,
    },
    orders::OrderStatus,
};

use super::{CatalogStore, OrderStore, ProductFilter, StoreError};

#[derive(Default)]
struct Tables {
    products: Vec<ProductEntity>,
    orders: Vec<OrderEntity>,
    order_items: Vec<OrderItemEntity>,
}

/// Catalog and order tables kept in process memory.
///
/// Used for local runs without `DATABASE_URL` and by tests. The `fail_*`
/// switches make the next matching writes fail so callers can exercise their
/// store-error paths.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_order_inserts: AtomicBool,
    fail_item_inserts: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_order_inserts(&self, fail: bool) {
        self.fail_order_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_item_inserts(&self, fail: bool) {
        self.fail_item_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn order_count(&self) -> usize {
        self.tables().map(|t| t.orders.len()).unwrap_or_default()
    }

    pub fn order_item_count(&self) -> usize {
        self.tables().map(|t| t.order_items.len()).unwrap_or_default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Other(anyhow!("memory store lock poisoned")))
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn list_products(&self, filter: ProductFilter) -> Result<Vec<ProductEntity>, StoreError> {
        let tables = self.tables()?;
        let mut products: Vec<ProductEntity> = tables
            .products
            .iter()
            .filter(|p| match &filter.category {
                Some(category) => p.category.as_ref() == Some(category),
                None => true,
            })
            .cloned()
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = filter.limit {
            products.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));
        }
        Ok(products)
    }

    async fn get_product(&self, id: Uuid) -> Result<ProductEntity, StoreError> {
        let tables = self.tables()?;
        tables
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn create_product(&self, product: CreateProductEntity) -> Result<ProductEntity, StoreError> {
        let now = Utc::now();
        let product = ProductEntity {
            id: Uuid::new_v4(),
            name: product.name,
            description: product.description,
            price: product.price,
            image_url: product.image_url,
            category: product.category,
            stock: product.stock,
            sizes: product.sizes,
            created_at: now,
            updated_at: now,
        };
        self.tables()?.products.push(product.clone());
        Ok(product)
    }

    async fn update_product(
        &self,
        id: Uuid,
        product: CreateProductEntity,
    ) -> Result<ProductEntity, StoreError> {
        let mut tables = self.tables()?;
        let existing = tables
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::NotFound)?;

        existing.name = product.name;
        existing.description = product.description;
        existing.price = product.price;
        existing.image_url = product.image_url;
        existing.category = product.category;
        existing.stock = product.stock;
        existing.sizes = product.sizes;
        existing.updated_at = Utc::now();
        Ok(existing.clone())
    }

    async fn delete_product(&self, id: Uuid) -> Result<ProductEntity, StoreError> {
        let mut tables = self.tables()?;
        let index = tables
            .products
            .iter()
            .position(|p| p.id == id)
            .ok_or(StoreError::NotFound)?;
        Ok(tables.products.remove(index))
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert_order(&self, order: CreateOrderEntity) -> Result<OrderEntity, StoreError> {
        if self.fail_order_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::Other(anyhow!("orders table unavailable")));
        }

        let now = Utc::now();
        let order = OrderEntity {
            id: Uuid::new_v4(),
            customer_name: order.customer_name,
            customer_email: order.customer_email,
            customer_phone: order.customer_phone,
            address: order.address,
            city: order.city,
            state: order.state,
            zip_code: order.zip_code,
            total: order.total,
            status: order.status,
            created_at: now,
            updated_at: now,
        };
        self.tables()?.orders.push(order.clone());
        Ok(order)
    }

    async fn insert_order_items(
        &self,
        items: Vec<CreateOrderItemEntity>,
    ) -> Result<Vec<OrderItemEntity>, StoreError> {
        if self.fail_item_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::Other(anyhow!("order_items table unavailable")));
        }

        let mut tables = self.tables()?;
        if let Some(orphan) = items
            .iter()
            .find(|item| !tables.orders.iter().any(|o| o.id == item.order_id))
        {
            return Err(StoreError::Other(anyhow!(
                "order {} does not exist",
                orphan.order_id
            )));
        }

        let now = Utc::now();
        let inserted: Vec<OrderItemEntity> = items
            .into_iter()
            .map(|item| OrderItemEntity {
                id: Uuid::new_v4(),
                order_id: item.order_id,
                product_id: item.product_id,
                product_name: item.product_name,
                price: item.price,
                quantity: item.quantity,
                size: item.size,
                created_at: now,
            })
            .collect();
        tables.order_items.extend(inserted.iter().cloned());
        Ok(inserted)
    }

    async fn list_orders(&self) -> Result<Vec<OrderEntity>, StoreError> {
        let mut orders = self.tables()?.orders.clone();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn get_order(&self, id: Uuid) -> Result<OrderEntity, StoreError> {
        self.tables()?
            .orders
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list_order_items(&self, order_id: Uuid) -> Result<Vec<OrderItemEntity>, StoreError> {
        Ok(self
            .tables()?
            .order_items
            .iter()
            .filter(|item| item.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn update_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<OrderEntity, StoreError> {
        let mut tables = self.tables()?;
        let order = tables
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(StoreError::NotFound)?;
        order.status = status;
        order.updated_at = Utc::now();
        Ok(order.clone())
    }
}
