use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::IntoParams;
use utoipa_axum::router::OpenApiRouter;
use uuid::Uuid;

use crate::{
    app_error::{AppError, StdResponse},
    app_state::AppState,
    models::ProductEntity,
    store::ProductFilter,
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    utoipa_axum::router::OpenApiRouter::new().nest(
        "/products",
        OpenApiRouter::new()
            .routes(utoipa_axum::routes!(get_products))
            .routes(utoipa_axum::routes!(get_product)),
    )
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
struct ProductsQuery {
    /// Maximum number of products to return.
    limit: Option<i64>,
    /// Only products in this category.
    category: Option<String>,
}

/// List the catalog, newest first.
#[utoipa::path(
    get,
    path = "/",
    tags = ["Products"],
    params(ProductsQuery),
    responses(
        (status = 200, description = "Get products successfully", body = StdResponse<Vec<ProductEntity>>),
        (status = 400, description = "Invalid limit")
    )
)]
async fn get_products(
    State(state): State<AppState>,
    Query(query): Query<ProductsQuery>,
) -> Result<impl IntoResponse, AppError> {
    if matches!(query.limit, Some(limit) if limit < 1) {
        return Err(AppError::BadRequest("limit must be at least 1".into()));
    }

    let category = query
        .category
        .map(|category| category.trim().to_owned())
        .filter(|category| !category.is_empty());
    let products = state
        .catalog
        .list_products(ProductFilter {
            category,
            limit: query.limit,
        })
        .await?;

    Ok(StdResponse::ok(products, "Get products successfully"))
}

/// Fetch a single product.
#[utoipa::path(
    get,
    path = "/{id}",
    tags = ["Products"],
    params(
        ("id" = Uuid, Path, description = "Product ID to fetch")
    ),
    responses(
        (status = 200, description = "Get product successfully", body = StdResponse<ProductEntity>),
        (status = 404, description = "Product not found")
    )
)]
async fn get_product(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let product = state.catalog.get_product(id).await?;
    Ok(StdResponse::ok(product, "Get product successfully"))
}
