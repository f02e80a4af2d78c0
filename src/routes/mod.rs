pub mod admin;
pub mod cart;
pub mod chat;
pub mod checkout;
pub mod products;

use axum::Router;
use tower_http::trace::TraceLayer;
use utoipa::openapi::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use crate::app_state::AppState;

/// Every storefront and admin route, still carrying its OpenAPI description.
pub fn routes_with_openapi(state: &AppState) -> OpenApiRouter<AppState> {
    products::routes_with_openapi()
        .merge(cart::routes_with_openapi())
        .merge(checkout::routes_with_openapi())
        .merge(chat::routes_with_openapi())
        .merge(admin::routes_with_openapi(state.clone()))
}

/// Builds the HTTP application and the OpenAPI document describing it.
pub fn app(state: AppState) -> (Router, OpenApi) {
    let routes = routes_with_openapi(&state);
    let openapi = routes.get_openapi().clone();

    let app = Router::new()
        .merge(routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state);
    (app, openapi)
}
