use anyhow::Context;
use async_trait::async_trait;
use diesel::{ExpressionMethods, QueryDsl, SelectableHelper};
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::{
    db::DbPool,
    models::{
        CreateOrderEntity, CreateOrderItemEntity, CreateProductEntity, OrderEntity,
        OrderItemEntity, ProductEntity,
    },
    orders::OrderStatus,
    schema::{order_items, orders, products},
};

use super::{CatalogStore, OrderStore, ProductFilter, StoreError};

/// PostgreSQL-backed catalog and order tables.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

macro_rules! conn {
    ($self:ident) => {
        &mut $self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?
    };
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn list_products(&self, filter: ProductFilter) -> Result<Vec<ProductEntity>, StoreError> {
        let conn = conn!(self);

        let mut query = products::table
            .select(ProductEntity::as_select())
            .order_by(products::created_at.desc())
            .into_boxed();
        if let Some(category) = filter.category {
            query = query.filter(products::category.eq(category));
        }
        if let Some(limit) = filter.limit {
            query = query.limit(limit);
        }

        let products = query
            .load(conn)
            .await
            .context("Failed to get products")?;
        Ok(products)
    }

    async fn get_product(&self, id: Uuid) -> Result<ProductEntity, StoreError> {
        let conn = conn!(self);

        Ok(products::table
            .find(id)
            .select(ProductEntity::as_select())
            .get_result(conn)
            .await?)
    }

    async fn create_product(&self, product: CreateProductEntity) -> Result<ProductEntity, StoreError> {
        let conn = conn!(self);

        let product = diesel::insert_into(products::table)
            .values(product)
            .returning(ProductEntity::as_returning())
            .get_result(conn)
            .await
            .context("Failed to create product")?;
        Ok(product)
    }

    async fn update_product(
        &self,
        id: Uuid,
        product: CreateProductEntity,
    ) -> Result<ProductEntity, StoreError> {
        let conn = conn!(self);

        Ok(diesel::update(products::table.find(id))
            .set((&product, products::updated_at.eq(diesel::dsl::now)))
            .returning(ProductEntity::as_returning())
            .get_result(conn)
            .await?)
    }

    async fn delete_product(&self, id: Uuid) -> Result<ProductEntity, StoreError> {
        let conn = conn!(self);

        Ok(diesel::delete(products::table.find(id))
            .returning(ProductEntity::as_returning())
            .get_result(conn)
            .await?)
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn insert_order(&self, order: CreateOrderEntity) -> Result<OrderEntity, StoreError> {
        let conn = conn!(self);

        let order = diesel::insert_into(orders::table)
            .values(order)
            .returning(OrderEntity::as_returning())
            .get_result(conn)
            .await
            .context("Failed to create order")?;
        Ok(order)
    }

    async fn insert_order_items(
        &self,
        items: Vec<CreateOrderItemEntity>,
    ) -> Result<Vec<OrderItemEntity>, StoreError> {
        let conn = conn!(self);

        let items = diesel::insert_into(order_items::table)
            .values(items)
            .returning(OrderItemEntity::as_returning())
            .get_results(conn)
            .await
            .context("Failed to create order items")?;
        Ok(items)
    }

    async fn list_orders(&self) -> Result<Vec<OrderEntity>, StoreError> {
        let conn = conn!(self);

        let orders = orders::table
            .select(OrderEntity::as_select())
            .order_by(orders::created_at.desc())
            .load(conn)
            .await
            .context("Failed to get orders")?;
        Ok(orders)
    }

    async fn get_order(&self, id: Uuid) -> Result<OrderEntity, StoreError> {
        let conn = conn!(self);

        Ok(orders::table
            .find(id)
            .select(OrderEntity::as_select())
            .get_result(conn)
            .await?)
    }

    async fn list_order_items(&self, order_id: Uuid) -> Result<Vec<OrderItemEntity>, StoreError> {
        let conn = conn!(self);

        let items = order_items::table
            .filter(order_items::order_id.eq(order_id))
            .select(OrderItemEntity::as_select())
            .order_by(order_items::created_at.asc())
            .load(conn)
            .await
            .context("Failed to get order items")?;
        Ok(items)
    }

    async fn update_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<OrderEntity, StoreError> {
        let conn = conn!(self);

        Ok(diesel::update(orders::table.find(id))
            .set((
                orders::status.eq(status),
                orders::updated_at.eq(diesel::dsl::now),
            ))
            .returning(OrderEntity::as_returning())
            .get_result(conn)
            .await?)
    }
}
