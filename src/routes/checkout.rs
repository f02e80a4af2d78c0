use axum::{
    Extension, Json,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::router::OpenApiRouter;
use uuid::Uuid;

use crate::{
    app_error::{AppError, StdResponse},
    app_state::{AppState, SessionId},
    checkout::{CheckoutForm, CheckoutReceipt},
    middleware::cart_session,
    navigation::Route,
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    utoipa_axum::router::OpenApiRouter::new().nest(
        "/checkout",
        OpenApiRouter::new()
            .routes(utoipa_axum::routes!(submit_checkout))
            .route_layer(axum::middleware::from_fn(cart_session))
            .routes(utoipa_axum::routes!(order_success)),
    )
}

/// Place an order from the session's cart.
#[utoipa::path(
    post,
    path = "/",
    tags = ["Checkout"],
    params(("x-session-id" = String, Header, description = "Shopper session")),
    request_body = CheckoutForm,
    responses(
        (status = 200, description = "Order placed successfully", body = StdResponse<CheckoutReceipt>),
        (status = 409, description = "A checkout is already running for this session"),
        (status = 422, description = "Empty cart, invalid form or the order could not be stored")
    )
)]
async fn submit_checkout(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Json(form): Json<CheckoutForm>,
) -> Result<impl IntoResponse, AppError> {
    let _in_flight = state.begin_checkout(&session).ok_or_else(|| {
        AppError::Conflict("A checkout is already in progress for this cart".into())
    })?;

    let mut cart = state.cart(&session);
    let mut submitter = state.checkout_submitter();
    let receipt = submitter.submit(&mut cart, &form).await?;

    Ok(StdResponse::ok(receipt, "Order placed successfully"))
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
struct SuccessQuery {
    /// Anything that is not a UUID counts as missing.
    order_id: Option<String>,
}

#[derive(Serialize, ToSchema)]
struct OrderConfirmation {
    order_id: Uuid,
}

/// Confirmation view for a placed order. Without a usable order id the shopper is sent home.
#[utoipa::path(
    get,
    path = "/success",
    tags = ["Checkout"],
    params(SuccessQuery),
    responses(
        (status = 200, description = "Order confirmed", body = StdResponse<OrderConfirmation>),
        (status = 303, description = "Missing or malformed order id, redirected to the home page")
    )
)]
async fn order_success(Query(query): Query<SuccessQuery>) -> Response {
    let order_id = query
        .order_id
        .and_then(|id| Uuid::parse_str(id.trim()).ok());
    match Route::order_success(order_id) {
        Route::OrderSuccess { order_id } => {
            StdResponse::ok(OrderConfirmation { order_id }, "Order confirmed").into_response()
        }
        fallback => Redirect::to(&fallback.path()).into_response(),
    }
}
