use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use utoipa_axum::router::OpenApiRouter;
use uuid::Uuid;

use crate::{
    app_error::{AppError, StdResponse},
    app_state::AppState,
    catalog::ProductForm,
    models::ProductEntity,
    navigation::Route,
    store::ProductFilter,
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    utoipa_axum::router::OpenApiRouter::new().nest(
        &Route::AdminProducts.path(),
        OpenApiRouter::new()
            .routes(utoipa_axum::routes!(get_products))
            .routes(utoipa_axum::routes!(create_product))
            .routes(utoipa_axum::routes!(update_product))
            .routes(utoipa_axum::routes!(delete_product)),
    )
}

/// List every product, newest first.
#[utoipa::path(
    get,
    path = "/",
    tags = ["Admin"],
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Get products successfully", body = StdResponse<Vec<ProductEntity>>)
    )
)]
async fn get_products(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let products = state
        .catalog
        .list_products(ProductFilter::default())
        .await?;
    Ok(StdResponse::ok(products, "Get products successfully"))
}

/// Create a product.
#[utoipa::path(
    post,
    path = "/",
    tags = ["Admin"],
    security(("bearer" = [])),
    request_body = ProductForm,
    responses(
        (status = 200, description = "Product created", body = StdResponse<ProductEntity>),
        (status = 400, description = "Invalid product form")
    )
)]
async fn create_product(
    State(state): State<AppState>,
    Json(form): Json<ProductForm>,
) -> Result<impl IntoResponse, AppError> {
    let product = form
        .into_product()
        .map_err(|err| AppError::BadRequest(err.to_string()))?;

    let product = state.catalog.create_product(product).await?;
    tracing::info!(product_id = %product.id, "Product created");
    Ok(StdResponse::ok(product, "Product created"))
}

/// Replace a product's details.
#[utoipa::path(
    put,
    path = "/{id}",
    tags = ["Admin"],
    security(("bearer" = [])),
    params(
        ("id" = Uuid, Path, description = "Product ID to update")
    ),
    request_body = ProductForm,
    responses(
        (status = 200, description = "Product updated", body = StdResponse<ProductEntity>),
        (status = 400, description = "Invalid product form"),
        (status = 404, description = "Product not found")
    )
)]
async fn update_product(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(form): Json<ProductForm>,
) -> Result<impl IntoResponse, AppError> {
    let product = form
        .into_product()
        .map_err(|err| AppError::BadRequest(err.to_string()))?;

    let product = state.catalog.update_product(id, product).await?;
    Ok(StdResponse::ok(product, "Product updated"))
}

/// Delete a product. Past orders keep their item snapshots.
#[utoipa::path(
    delete,
    path = "/{id}",
    tags = ["Admin"],
    security(("bearer" = [])),
    params(
        ("id" = Uuid, Path, description = "Product ID to delete")
    ),
    responses(
        (status = 200, description = "Product deleted", body = StdResponse<ProductEntity>),
        (status = 404, description = "Product not found")
    )
)]
async fn delete_product(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let product = state.catalog.delete_product(id).await?;
    tracing::info!(product_id = %product.id, "Product deleted");
    Ok(StdResponse::ok(product, "Product deleted"))
}
