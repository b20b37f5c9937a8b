//! Order endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::AppState;
use crate::middleware::auth::AuthUser;
use crate::routes::{app_error_response, error_response, internal_error};
use printdesk_shared::AppError;
use printdesk_core::reconcile::OrderStatus;
use printdesk_db::OrderRepository;
use printdesk_db::entities::{order_items, orders};
use printdesk_db::repositories::order::{
    CreateOrderInput, CreateOrderItemInput, OrderError, OrderFilter, OrderWithItems,
    UpdateOrderInput,
};
use printdesk_shared::types::id::{ClientId, OrderId};
use printdesk_shared::types::pagination::{PageRequest, PageResponse};

/// Order line item as returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    /// Item ID.
    pub id: Uuid,
    /// What is being printed/copied.
    pub description: String,
    /// Number of units.
    pub quantity: i32,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Line total.
    pub total_price: Decimal,
}

impl From<order_items::Model> for OrderItemResponse {
    fn from(model: order_items::Model) -> Self {
        Self {
            id: model.id,
            description: model.description,
            quantity: model.quantity,
            unit_price: model.unit_price,
            total_price: model.total_price,
        }
    }
}

/// Order as returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    /// Order ID.
    pub id: Uuid,
    /// Human-readable order number.
    pub order_number: String,
    /// Client placing the order.
    pub client_id: Uuid,
    /// Order total.
    pub total_amount: Decimal,
    /// Paid so far.
    pub paid_amount: Decimal,
    /// Outstanding balance.
    pub balance: Decimal,
    /// Status, display form ("Partially Paid", "In Production", ...).
    pub status: String,
    /// Order date.
    pub order_date: DateTime<Utc>,
    /// Category label.
    pub category: Option<String>,
    /// Free-form notes.
    pub details: Option<String>,
    /// Page count for print jobs.
    pub pages: Option<i32>,
    /// Paper stock.
    pub paper: Option<String>,
    /// Line items; empty for item-less orders.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<OrderItemResponse>,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
}

impl OrderResponse {
    pub(crate) fn from_header(model: orders::Model) -> Self {
        let status: OrderStatus = model.status.into();
        Self {
            id: model.id,
            order_number: model.order_number,
            client_id: model.client_id,
            total_amount: model.total_amount,
            paid_amount: model.paid_amount,
            balance: model.balance,
            status: status.as_str().to_string(),
            order_date: model.order_date.with_timezone(&Utc),
            category: model.category,
            details: model.details,
            pages: model.pages,
            paper: model.paper,
            items: Vec::new(),
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<OrderWithItems> for OrderResponse {
    fn from(full: OrderWithItems) -> Self {
        let mut response = Self::from_header(full.order);
        response.items = full.items.into_iter().map(OrderItemResponse::from).collect();
        response
    }
}

/// Line item in a create/update request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    /// What is being printed/copied.
    pub description: String,
    /// Number of units.
    pub quantity: i32,
    /// Price per unit.
    pub unit_price: Decimal,
}

impl From<OrderItemRequest> for CreateOrderItemInput {
    fn from(item: OrderItemRequest) -> Self {
        Self {
            description: item.description,
            quantity: item.quantity,
            unit_price: item.unit_price,
        }
    }
}

/// Request body for creating an order.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    /// Client placing the order.
    pub client_id: Uuid,
    /// Explicit order number; generated when omitted.
    pub order_number: Option<String>,
    /// Line items.
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
    /// Explicit total for item-less orders.
    pub total_amount: Option<Decimal>,
    /// Order date; defaults to now.
    pub order_date: Option<DateTime<Utc>>,
    /// Category label.
    pub category: Option<String>,
    /// Free-form notes.
    pub details: Option<String>,
    /// Page count for print jobs.
    pub pages: Option<i32>,
    /// Paper stock.
    pub paper: Option<String>,
}

/// Request body for updating an order.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    /// Replace the line items.
    pub items: Option<Vec<OrderItemRequest>>,
    /// New explicit total.
    pub total_amount: Option<Decimal>,
    /// New order date.
    pub order_date: Option<DateTime<Utc>>,
    /// New category.
    pub category: Option<String>,
    /// New details.
    pub details: Option<String>,
    /// New page count.
    pub pages: Option<i32>,
    /// New paper stock.
    pub paper: Option<String>,
}

/// Request body for the manual status endpoint.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// Target pipeline stage ("In Production" or "Delivered").
    pub status: String,
}

/// Query parameters for listing orders.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOrdersQuery {
    /// Filter by client.
    pub client_id: Option<Uuid>,
    /// Filter by status, display form.
    pub status: Option<String>,
    /// Pagination.
    #[serde(flatten)]
    pub page: PageRequest,
}

/// Creates order routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route(
            "/orders/{id}",
            get(get_order).put(update_order).delete(delete_order),
        )
        .route("/orders/{id}/status", patch(update_status))
}

/// GET /orders - List orders, newest first.
async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> Response {
    let status = match query.status.as_deref() {
        Some(raw) => match OrderStatus::from_str(raw) {
            Ok(status) => Some(status),
            Err(_) => {
                return app_error_response(&AppError::Validation(format!(
                    "Unknown status: {raw}"
                )));
            }
        },
        None => None,
    };

    let repo = OrderRepository::new((*state.db).clone());
    let filter = OrderFilter {
        client_id: query.client_id.map(ClientId::from_uuid),
        status,
    };

    match repo.list_orders(filter, &query.page).await {
        Ok(page) => {
            let page = PageResponse {
                data: page
                    .data
                    .into_iter()
                    .map(OrderResponse::from_header)
                    .collect::<Vec<_>>(),
                page: page.page,
                per_page: page.per_page,
                total: page.total,
            };
            Json(page).into_response()
        }
        Err(e) => order_error_response(&e),
    }
}

/// GET /orders/{id} - Fetch one order with its items.
async fn get_order(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let repo = OrderRepository::new((*state.db).clone());
    match repo.get_order(OrderId::from_uuid(id)).await {
        Ok(order) => Json(OrderResponse::from(order)).into_response(),
        Err(e) => order_error_response(&e),
    }
}

/// POST /orders - Create an order.
async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> Response {
    let repo = OrderRepository::new((*state.db).clone());
    let input = CreateOrderInput {
        client_id: ClientId::from_uuid(payload.client_id),
        order_number: payload.order_number,
        items: payload.items.into_iter().map(Into::into).collect(),
        total_amount: payload.total_amount,
        order_date: payload.order_date.unwrap_or_else(Utc::now),
        category: payload.category,
        details: payload.details,
        pages: payload.pages,
        paper: payload.paper,
    };

    match repo.create_order(input).await {
        Ok(order) => (StatusCode::CREATED, Json(OrderResponse::from(order))).into_response(),
        Err(e) => order_error_response(&e),
    }
}

/// PUT /orders/{id} - Update an order.
async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderRequest>,
) -> Response {
    let repo = OrderRepository::new((*state.db).clone());
    let input = UpdateOrderInput {
        items: payload
            .items
            .map(|items| items.into_iter().map(Into::into).collect()),
        total_amount: payload.total_amount,
        order_date: payload.order_date,
        category: payload.category.map(Some),
        details: payload.details.map(Some),
        pages: payload.pages.map(Some),
        paper: payload.paper.map(Some),
    };

    match repo.update_order(OrderId::from_uuid(id), input).await {
        Ok(order) => Json(OrderResponse::from(order)).into_response(),
        Err(e) => order_error_response(&e),
    }
}

/// PATCH /orders/{id}/status - Move an order through the production pipeline.
async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Response {
    let Ok(status) = OrderStatus::from_str(&payload.status) else {
        return app_error_response(&AppError::Validation(format!(
            "Unknown status: {}",
            payload.status
        )));
    };

    let repo = OrderRepository::new((*state.db).clone());
    match repo.update_status(OrderId::from_uuid(id), status).await {
        Ok(order) => Json(OrderResponse::from_header(order)).into_response(),
        Err(e) => order_error_response(&e),
    }
}

/// DELETE /orders/{id} - Delete an order. Admin or manager only.
async fn delete_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Response {
    if auth.is_admin() || auth.role() == printdesk_shared::auth::ROLE_MANAGER {
        let repo = OrderRepository::new((*state.db).clone());
        match repo.delete_order(OrderId::from_uuid(id)).await {
            Ok(()) => StatusCode::NO_CONTENT.into_response(),
            Err(e) => order_error_response(&e),
        }
    } else {
        error_response(
            StatusCode::FORBIDDEN,
            "forbidden",
            "Deleting orders requires the admin or manager role",
        )
    }
}

fn order_error_response(err: &OrderError) -> Response {
    match err {
        OrderError::NotFound(_) | OrderError::ClientNotFound(_) => {
            error_response(StatusCode::NOT_FOUND, "not_found", &err.to_string())
        }
        OrderError::DuplicateOrderNumber(_) | OrderError::HasPayments(_) => {
            error_response(StatusCode::CONFLICT, "conflict", &err.to_string())
        }
        OrderError::InvalidTotal(_)
        | OrderError::TotalBelowPaid { .. }
        | OrderError::ManualStatusNotAllowed(_) => {
            error_response(StatusCode::BAD_REQUEST, "validation_error", &err.to_string())
        }
        OrderError::Database(_) => internal_error(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use printdesk_db::entities::sea_orm_active_enums;
    use rust_decimal_macros::dec;

    fn order_model() -> orders::Model {
        let at = Utc
            .with_ymd_and_hms(2026, 8, 30, 10, 0, 0)
            .unwrap()
            .fixed_offset();
        orders::Model {
            id: Uuid::new_v4(),
            order_number: "ORD-20260830-AB12CD".to_string(),
            client_id: Uuid::new_v4(),
            total_amount: dec!(1000),
            paid_amount: dec!(400),
            balance: dec!(600),
            status: sea_orm_active_enums::OrderStatus::PartiallyPaid,
            order_date: at,
            category: Some("exam papers".to_string()),
            details: None,
            pages: Some(120),
            paper: Some("A4 80gsm".to_string()),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_order_response_wire_shape() {
        let value = serde_json::to_value(OrderResponse::from_header(order_model())).unwrap();
        assert_eq!(value["orderNumber"], "ORD-20260830-AB12CD");
        assert_eq!(value["status"], "Partially Paid");
        assert_eq!(value["pages"], 120);
        assert_eq!(value["paper"], "A4 80gsm");
        assert!(value.get("paidAmount").is_some());
        // Item-less orders omit the items key entirely.
        assert!(value.get("items").is_none());
    }
}
