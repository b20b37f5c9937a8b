//! Product catalog endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use crate::routes::{error_response, internal_error};
use printdesk_db::ProductRepository;
use printdesk_db::entities::products;
use printdesk_db::repositories::product::{
    CreateProductInput, ProductError, ProductFilter, UpdateProductInput,
};
use printdesk_shared::types::id::ProductId;
use printdesk_shared::types::pagination::{PageRequest, PageResponse};

/// Product as returned to callers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    /// Product ID.
    pub id: Uuid,
    /// Product name.
    pub name: String,
    /// Category, if any.
    pub category: Option<String>,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Pricing unit label.
    pub unit: String,
    /// Whether the product is offered.
    pub is_active: bool,
}

impl From<products::Model> for ProductResponse {
    fn from(model: products::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            category: model.category,
            unit_price: model.unit_price,
            unit: model.unit,
            is_active: model.is_active,
        }
    }
}

/// Request body for creating a product.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    /// Product name.
    pub name: String,
    /// Category.
    pub category: Option<String>,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Pricing unit label.
    pub unit: String,
}

/// Request body for updating a product.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    /// New name.
    pub name: Option<String>,
    /// New category.
    pub category: Option<String>,
    /// New unit price.
    pub unit_price: Option<Decimal>,
    /// New unit label.
    pub unit: Option<String>,
    /// Activate or retire.
    pub is_active: Option<bool>,
}

/// Query parameters for listing products.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProductsQuery {
    /// Filter by category.
    pub category: Option<String>,
    /// Only active products.
    #[serde(default)]
    pub active_only: bool,
    /// Pagination.
    #[serde(flatten)]
    pub page: PageRequest,
}

/// Creates product routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
}

/// GET /products - List products alphabetically.
async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListProductsQuery>,
) -> Response {
    let repo = ProductRepository::new((*state.db).clone());
    let filter = ProductFilter {
        category: query.category,
        active_only: query.active_only,
    };

    match repo.list_products(filter, &query.page).await {
        Ok(page) => {
            let page = PageResponse {
                data: page
                    .data
                    .into_iter()
                    .map(ProductResponse::from)
                    .collect::<Vec<_>>(),
                page: page.page,
                per_page: page.per_page,
                total: page.total,
            };
            Json(page).into_response()
        }
        Err(e) => product_error_response(&e),
    }
}

/// GET /products/{id} - Fetch one product.
async fn get_product(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let repo = ProductRepository::new((*state.db).clone());
    match repo.get_product(ProductId::from_uuid(id)).await {
        Ok(product) => Json(ProductResponse::from(product)).into_response(),
        Err(e) => product_error_response(&e),
    }
}

/// POST /products - Create a product.
async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> Response {
    let repo = ProductRepository::new((*state.db).clone());
    let input = CreateProductInput {
        name: payload.name,
        category: payload.category,
        unit_price: payload.unit_price,
        unit: payload.unit,
    };

    match repo.create_product(input).await {
        Ok(product) => (StatusCode::CREATED, Json(ProductResponse::from(product))).into_response(),
        Err(e) => product_error_response(&e),
    }
}

/// PUT /products/{id} - Update a product.
async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> Response {
    let repo = ProductRepository::new((*state.db).clone());
    let input = UpdateProductInput {
        name: payload.name,
        category: payload.category.map(Some),
        unit_price: payload.unit_price,
        unit: payload.unit,
        is_active: payload.is_active,
    };

    match repo.update_product(ProductId::from_uuid(id), input).await {
        Ok(product) => Json(ProductResponse::from(product)).into_response(),
        Err(e) => product_error_response(&e),
    }
}

/// DELETE /products/{id} - Delete a product.
async fn delete_product(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let repo = ProductRepository::new((*state.db).clone());
    match repo.delete_product(ProductId::from_uuid(id)).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => product_error_response(&e),
    }
}

fn product_error_response(err: &ProductError) -> Response {
    match err {
        ProductError::NotFound(_) => {
            error_response(StatusCode::NOT_FOUND, "product_not_found", &err.to_string())
        }
        ProductError::Database(_) => internal_error(err),
    }
}
