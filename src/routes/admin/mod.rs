pub mod orders;
pub mod products;

use utoipa_axum::router::OpenApiRouter;

use crate::{app_state::AppState, middleware::admin_authorization};

/// Back-office routes, all behind the admin bearer token.
pub fn routes_with_openapi(state: AppState) -> OpenApiRouter<AppState> {
    products::routes_with_openapi()
        .merge(orders::routes_with_openapi())
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            admin_authorization,
        ))
}
