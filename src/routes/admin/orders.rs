use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;
use uuid::Uuid;

use crate::{
    app_error::{AppError, StdResponse},
    app_state::AppState,
    models::{OrderEntity, OrderItemEntity},
    navigation::Route,
    orders::OrderStatus,
    price::format_price,
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    utoipa_axum::router::OpenApiRouter::new().nest(
        &Route::AdminOrders.path(),
        OpenApiRouter::new()
            .routes(utoipa_axum::routes!(get_orders))
            .routes(utoipa_axum::routes!(get_order))
            .routes(utoipa_axum::routes!(update_order_status)),
    )
}

#[derive(Serialize, ToSchema)]
struct GetOrderRes {
    pub order: OrderEntity,
    pub order_items: Vec<OrderItemEntity>,
    pub formatted_total: String,
}

#[derive(Deserialize, ToSchema)]
struct UpdateOrderStatusReq {
    status: OrderStatus,
}

/// List all orders, newest first.
#[utoipa::path(
    get,
    path = "/",
    tags = ["Admin"],
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Get orders successfully", body = StdResponse<Vec<OrderEntity>>)
    )
)]
async fn get_orders(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let orders = state.orders.list_orders().await?;
    Ok(StdResponse::ok(orders, "Get orders successfully"))
}

/// Fetch an order with its item snapshots.
#[utoipa::path(
    get,
    path = "/{id}",
    tags = ["Admin"],
    security(("bearer" = [])),
    params(
        ("id" = Uuid, Path, description = "Order ID to fetch")
    ),
    responses(
        (status = 200, description = "Get order successfully", body = StdResponse<GetOrderRes>),
        (status = 404, description = "Order not found")
    )
)]
async fn get_order(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let order = state.orders.get_order(id).await?;
    let order_items = state.orders.list_order_items(order.id).await?;
    let formatted_total = format_price(order.total);

    Ok(StdResponse::ok(
        GetOrderRes {
            order,
            order_items,
            formatted_total,
        },
        "Get order successfully",
    ))
}

/// Move an order to another status.
#[utoipa::path(
    patch,
    path = "/{id}/status",
    tags = ["Admin"],
    security(("bearer" = [])),
    params(
        ("id" = Uuid, Path, description = "Order ID to update")
    ),
    request_body = UpdateOrderStatusReq,
    responses(
        (status = 200, description = "Order status updated", body = StdResponse<OrderEntity>),
        (status = 404, description = "Order not found")
    )
)]
async fn update_order_status(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(body): Json<UpdateOrderStatusReq>,
) -> Result<impl IntoResponse, AppError> {
    let current = state.orders.get_order(id).await?;
    if !current.status.is_conventional_transition(body.status) {
        tracing::warn!(
            order_id = %id,
            from = %current.status,
            to = %body.status,
            "Unconventional order status change"
        );
    }

    let order = state.orders.update_order_status(id, body.status).await?;
    tracing::info!(order_id = %id, status = %order.status, "Order status updated");
    Ok(StdResponse::ok(order, "Order status updated"))
}
