//! Remote data store seams: product catalog and orders.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use diesel::result::Error as DieselError;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    models::{
        CreateOrderEntity, CreateOrderItemEntity, CreateProductEntity, OrderEntity,
        OrderItemEntity, ProductEntity,
    },
    orders::OrderStatus,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<DieselError> for StoreError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => StoreError::NotFound,
            other => StoreError::Other(other.into()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub limit: Option<i64>,
}

#[async_trait]
pub trait CatalogStore: Send + Sync + 'static {
    /// Newest first.
    async fn list_products(&self, filter: ProductFilter) -> Result<Vec<ProductEntity>, StoreError>;
    async fn get_product(&self, id: Uuid) -> Result<ProductEntity, StoreError>;
    async fn create_product(&self, product: CreateProductEntity) -> Result<ProductEntity, StoreError>;
    async fn update_product(
        &self,
        id: Uuid,
        product: CreateProductEntity,
    ) -> Result<ProductEntity, StoreError>;
    async fn delete_product(&self, id: Uuid) -> Result<ProductEntity, StoreError>;
}

#[async_trait]
pub trait OrderStore: Send + Sync + 'static {
    async fn insert_order(&self, order: CreateOrderEntity) -> Result<OrderEntity, StoreError>;
    async fn insert_order_items(
        &self,
        items: Vec<CreateOrderItemEntity>,
    ) -> Result<Vec<OrderItemEntity>, StoreError>;
    /// Newest first.
    async fn list_orders(&self) -> Result<Vec<OrderEntity>, StoreError>;
    async fn get_order(&self, id: Uuid) -> Result<OrderEntity, StoreError>;
    async fn list_order_items(&self, order_id: Uuid) -> Result<Vec<OrderItemEntity>, StoreError>;
    async fn update_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<OrderEntity, StoreError>;
}
