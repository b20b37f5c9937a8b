//! Payment endpoints.
//!
//! Enum strings cross the wire in display form ("Bank Transfer", "UPI",
//! "Partially Paid"); parsing is case- and separator-insensitive so older
//! clients sending "bank_transfer" keep working.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::AppState;
use crate::middleware::auth::AuthUser;
use crate::routes::orders::OrderResponse;
use crate::routes::{app_error_response, error_response, reconcile_error_response};
use printdesk_core::reconcile::{PaymentMode, PaymentStatus};
use printdesk_db::PaymentRepository;
use printdesk_db::entities::payments;
use printdesk_db::repositories::payment::{
    CreatePaymentInput, PaymentFilter, PaymentWithOrder, UpdatePaymentInput,
};
use printdesk_shared::AppError;
use printdesk_shared::types::id::{ClientId, OrderId, PaymentId};
use printdesk_shared::types::pagination::{PageRequest, PageResponse};

/// Payment as returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    /// Payment ID.
    pub id: Uuid,
    /// Paying client.
    pub client_id: Uuid,
    /// Linked order, if any.
    pub order_id: Option<Uuid>,
    /// Amount received.
    pub amount: Decimal,
    /// Payment mode, display form.
    pub mode: String,
    /// Settlement status, display form.
    pub status: String,
    /// Reference number, if any.
    pub reference_number: Option<String>,
    /// Date the payment was received.
    pub payment_date: DateTime<Utc>,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
    /// Recomputed order snapshot, present on create/update of an
    /// order-linked payment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderResponse>,
}

impl From<payments::Model> for PaymentResponse {
    fn from(model: payments::Model) -> Self {
        let mode: PaymentMode = model.mode.into();
        let status: PaymentStatus = model.status.into();
        Self {
            id: model.id,
            client_id: model.client_id,
            order_id: model.order_id,
            amount: model.amount,
            mode: mode.as_str().to_string(),
            status: status.as_str().to_string(),
            reference_number: model.reference_number,
            payment_date: model.payment_date.with_timezone(&Utc),
            created_at: model.created_at.with_timezone(&Utc),
            order: None,
        }
    }
}

impl From<PaymentWithOrder> for PaymentResponse {
    fn from(result: PaymentWithOrder) -> Self {
        let mut response = Self::from(result.payment);
        response.order = result.order.map(OrderResponse::from_header);
        response
    }
}

/// Request body for recording a payment.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    /// Paying client.
    pub client_id: Uuid,
    /// Order the payment settles; omit for an unallocated credit.
    pub order_id: Option<Uuid>,
    /// Amount received.
    pub amount: Decimal,
    /// Payment mode string.
    pub mode: String,
    /// Settlement status string; defaults to "Completed".
    pub status: Option<String>,
    /// Reference number.
    pub reference_number: Option<String>,
    /// Date received; defaults to now.
    pub payment_date: Option<DateTime<Utc>>,
}

/// Request body for updating a payment. `clientId`/`orderId` are not
/// accepted: re-pointing a payment is delete + re-create.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentRequest {
    /// New amount.
    pub amount: Option<Decimal>,
    /// New mode string.
    pub mode: Option<String>,
    /// New settlement status string.
    pub status: Option<String>,
    /// New reference number; explicit `null` clears it.
    #[serde(default, with = "double_option")]
    pub reference_number: Option<Option<String>>,
    /// New payment date.
    pub payment_date: Option<DateTime<Utc>>,
}

/// Distinguishes an absent field from an explicit `null`.
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(de).map(Some)
    }
}

/// Query parameters for listing payments.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPaymentsQuery {
    /// Filter by client.
    pub client_id: Option<Uuid>,
    /// Filter by order.
    pub order_id: Option<Uuid>,
    /// Pagination.
    #[serde(flatten)]
    pub page: PageRequest,
}

/// Creates payment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payments", get(list_payments).post(create_payment))
        .route(
            "/payments/{id}",
            get(get_payment).put(update_payment).delete(delete_payment),
        )
}

/// GET /payments - List payments, newest first.
async fn list_payments(
    State(state): State<AppState>,
    Query(query): Query<ListPaymentsQuery>,
) -> Response {
    let repo = PaymentRepository::new((*state.db).clone());
    let filter = PaymentFilter {
        client_id: query.client_id.map(ClientId::from_uuid),
        order_id: query.order_id.map(OrderId::from_uuid),
    };

    match repo.list_payments(filter, &query.page).await {
        Ok(page) => {
            let page = PageResponse {
                data: page.data.into_iter().map(PaymentResponse::from).collect(),
                page: page.page,
                per_page: page.per_page,
                total: page.total,
            };
            Json(page).into_response()
        }
        Err(e) => reconcile_error_response(&e),
    }
}

/// GET /payments/{id} - Fetch one payment.
async fn get_payment(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let repo = PaymentRepository::new((*state.db).clone());
    match repo.get_payment(PaymentId::from_uuid(id)).await {
        Ok(payment) => Json(PaymentResponse::from(payment)).into_response(),
        Err(e) => reconcile_error_response(&e),
    }
}

/// POST /payments - Record a payment.
async fn create_payment(
    State(state): State<AppState>,
    Json(payload): Json<CreatePaymentRequest>,
) -> Response {
    let Ok(mode) = PaymentMode::from_str(&payload.mode) else {
        return invalid_enum("mode", &payload.mode);
    };
    let status = match payload.status.as_deref() {
        Some(raw) => match PaymentStatus::from_str(raw) {
            Ok(status) => Some(status),
            Err(_) => return invalid_enum("status", raw),
        },
        None => None,
    };

    let repo = PaymentRepository::new((*state.db).clone());
    let input = CreatePaymentInput {
        client_id: ClientId::from_uuid(payload.client_id),
        order_id: payload.order_id.map(OrderId::from_uuid),
        amount: payload.amount,
        mode,
        status,
        reference_number: payload.reference_number,
        payment_date: payload.payment_date.unwrap_or_else(Utc::now),
    };

    match repo.create_payment(input).await {
        Ok(payment) => {
            (StatusCode::CREATED, Json(PaymentResponse::from(payment))).into_response()
        }
        Err(e) => reconcile_error_response(&e),
    }
}

/// PUT /payments/{id} - Update a payment's mutable fields.
async fn update_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePaymentRequest>,
) -> Response {
    let mode = match payload.mode.as_deref() {
        Some(raw) => match PaymentMode::from_str(raw) {
            Ok(mode) => Some(mode),
            Err(_) => return invalid_enum("mode", raw),
        },
        None => None,
    };
    let status = match payload.status.as_deref() {
        Some(raw) => match PaymentStatus::from_str(raw) {
            Ok(status) => Some(status),
            Err(_) => return invalid_enum("status", raw),
        },
        None => None,
    };

    let repo = PaymentRepository::new((*state.db).clone());
    let input = UpdatePaymentInput {
        amount: payload.amount,
        mode,
        status,
        reference_number: payload.reference_number,
        payment_date: payload.payment_date,
    };

    match repo.update_payment(PaymentId::from_uuid(id), input).await {
        Ok(payment) => Json(PaymentResponse::from(payment)).into_response(),
        Err(e) => reconcile_error_response(&e),
    }
}

/// DELETE /payments/{id} - Delete a payment, reversing its effect on the
/// linked order. Admin only.
async fn delete_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Response {
    if !auth.is_admin() {
        return error_response(
            StatusCode::FORBIDDEN,
            "forbidden",
            "Deleting payments requires the admin role",
        );
    }

    let repo = PaymentRepository::new((*state.db).clone());
    match repo.delete_payment(PaymentId::from_uuid(id)).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => reconcile_error_response(&e),
    }
}

fn invalid_enum(field: &str, value: &str) -> Response {
    app_error_response(&AppError::Validation(format!("Unknown {field}: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use printdesk_db::entities::{orders, sea_orm_active_enums};
    use rust_decimal_macros::dec;

    fn payment_model(order_id: Option<Uuid>) -> payments::Model {
        let at = Utc
            .with_ymd_and_hms(2026, 8, 30, 10, 0, 0)
            .unwrap()
            .fixed_offset();
        payments::Model {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            order_id,
            amount: dec!(400),
            mode: sea_orm_active_enums::PaymentMode::BankTransfer,
            status: sea_orm_active_enums::PaymentStatus::Completed,
            reference_number: Some("CHQ-1042".to_string()),
            payment_date: at,
            created_at: at,
            updated_at: at,
        }
    }

    fn order_model(id: Uuid) -> orders::Model {
        let at = Utc
            .with_ymd_and_hms(2026, 8, 30, 10, 0, 0)
            .unwrap()
            .fixed_offset();
        orders::Model {
            id,
            order_number: "ORD-20260830-AB12CD".to_string(),
            client_id: Uuid::new_v4(),
            total_amount: dec!(1000),
            paid_amount: dec!(400),
            balance: dec!(600),
            status: sea_orm_active_enums::OrderStatus::PartiallyPaid,
            order_date: at,
            category: None,
            details: None,
            pages: None,
            paper: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_linked_payment_response_embeds_order_snapshot() {
        let order_id = Uuid::new_v4();
        let result = PaymentWithOrder {
            payment: payment_model(Some(order_id)),
            order: Some(order_model(order_id)),
        };

        let value = serde_json::to_value(PaymentResponse::from(result)).unwrap();
        assert_eq!(value["mode"], "Bank Transfer");
        assert_eq!(value["order"]["status"], "Partially Paid");
        assert!(value["order"].get("paidAmount").is_some());
        assert!(value["order"].get("balance").is_some());
    }

    #[test]
    fn test_unlinked_payment_response_omits_order() {
        let result = PaymentWithOrder {
            payment: payment_model(None),
            order: None,
        };
        let value = serde_json::to_value(PaymentResponse::from(result)).unwrap();
        assert!(value.get("order").is_none());
    }
}
