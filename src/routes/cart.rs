use axum::{
    Extension, Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::router::OpenApiRouter;

use crate::{
    app_error::{AppError, StdResponse},
    app_state::{AppState, SessionId},
    cart::{CartItem, CartView},
    middleware::cart_session,
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    utoipa_axum::router::OpenApiRouter::new().nest(
        "/cart",
        OpenApiRouter::new()
            .routes(utoipa_axum::routes!(get_cart))
            .routes(utoipa_axum::routes!(clear_cart))
            .routes(utoipa_axum::routes!(add_cart_item))
            .routes(utoipa_axum::routes!(update_cart_item))
            .routes(utoipa_axum::routes!(remove_cart_item))
            .route_layer(axum::middleware::from_fn(cart_session)),
    )
}

#[derive(Deserialize, ToSchema)]
struct UpdateCartItemReq {
    id: String,
    #[serde(default)]
    size: Option<String>,
    /// Zero or less removes the line.
    quantity: i64,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
struct CartLineQuery {
    id: String,
    size: Option<String>,
}

/// Show the session's cart.
#[utoipa::path(
    get,
    path = "/",
    tags = ["Cart"],
    params(("x-session-id" = String, Header, description = "Shopper session")),
    responses(
        (status = 200, description = "Get cart successfully", body = StdResponse<CartView>)
    )
)]
async fn get_cart(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> Result<impl IntoResponse, AppError> {
    let cart = state.cart(&session);
    Ok(StdResponse::ok(cart.view(), "Get cart successfully"))
}

/// Empty the session's cart.
#[utoipa::path(
    delete,
    path = "/",
    tags = ["Cart"],
    params(("x-session-id" = String, Header, description = "Shopper session")),
    responses(
        (status = 200, description = "Cart cleared", body = StdResponse<CartView>)
    )
)]
async fn clear_cart(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> Result<impl IntoResponse, AppError> {
    let mut cart = state.cart(&session);
    cart.clear()?;
    Ok(StdResponse::ok(cart.view(), "Cart cleared"))
}

/// Add a product line, merging with an existing line of the same product and size.
#[utoipa::path(
    post,
    path = "/items",
    tags = ["Cart"],
    params(("x-session-id" = String, Header, description = "Shopper session")),
    request_body = CartItem,
    responses(
        (status = 200, description = "Item added to cart", body = StdResponse<CartView>),
        (status = 400, description = "Invalid quantity or price")
    )
)]
async fn add_cart_item(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Json(item): Json<CartItem>,
) -> Result<impl IntoResponse, AppError> {
    let mut cart = state.cart(&session);
    cart.add_item(item)?;
    Ok(StdResponse::ok(cart.view(), "Item added to cart"))
}

/// Change the quantity of a cart line.
#[utoipa::path(
    patch,
    path = "/items",
    tags = ["Cart"],
    params(("x-session-id" = String, Header, description = "Shopper session")),
    request_body = UpdateCartItemReq,
    responses(
        (status = 200, description = "Cart updated", body = StdResponse<CartView>)
    )
)]
async fn update_cart_item(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Json(body): Json<UpdateCartItemReq>,
) -> Result<impl IntoResponse, AppError> {
    let mut cart = state.cart(&session);
    cart.update_quantity(&body.id, body.size.as_deref(), body.quantity)?;
    Ok(StdResponse::ok(cart.view(), "Cart updated"))
}

/// Remove a cart line.
#[utoipa::path(
    delete,
    path = "/items",
    tags = ["Cart"],
    params(
        ("x-session-id" = String, Header, description = "Shopper session"),
        CartLineQuery
    ),
    responses(
        (status = 200, description = "Item removed from cart", body = StdResponse<CartView>)
    )
)]
async fn remove_cart_item(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Query(line): Query<CartLineQuery>,
) -> Result<impl IntoResponse, AppError> {
    let mut cart = state.cart(&session);
    cart.remove_item(&line.id, line.size.as_deref())?;
    Ok(StdResponse::ok(cart.view(), "Item removed from cart"))
}
