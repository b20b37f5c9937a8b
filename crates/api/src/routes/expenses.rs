//! Expense endpoints.

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
use crate::routes::{app_error_response, error_response, internal_error};
use printdesk_shared::AppError;
use printdesk_core::reconcile::PaymentMode;
use printdesk_db::ExpenseRepository;
use printdesk_db::entities::expenses;
use printdesk_db::repositories::expense::{
    CreateExpenseInput, ExpenseError, ExpenseFilter, UpdateExpenseInput,
};
use printdesk_shared::types::id::ExpenseId;
use printdesk_shared::types::pagination::{PageRequest, PageResponse};

/// Expense as returned to callers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseResponse {
    /// Expense ID.
    pub id: Uuid,
    /// Expense category.
    pub category: String,
    /// Amount spent.
    pub amount: Decimal,
    /// What it was for.
    pub description: Option<String>,
    /// Payment method, display form.
    pub payment_method: String,
    /// Receipt/bill reference.
    pub reference_number: Option<String>,
    /// Date of the expense.
    pub expense_date: DateTime<Utc>,
}

impl From<expenses::Model> for ExpenseResponse {
    fn from(model: expenses::Model) -> Self {
        let method: PaymentMode = model.payment_method.into();
        Self {
            id: model.id,
            category: model.category,
            amount: model.amount,
            description: model.description,
            payment_method: method.as_str().to_string(),
            reference_number: model.reference_number,
            expense_date: model.expense_date.with_timezone(&Utc),
        }
    }
}

/// Request body for recording an expense.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseRequest {
    /// Expense category.
    pub category: String,
    /// Amount spent.
    pub amount: Decimal,
    /// What it was for.
    pub description: Option<String>,
    /// Payment method string.
    pub payment_method: String,
    /// Receipt/bill reference.
    pub reference_number: Option<String>,
    /// Date of the expense; defaults to now.
    pub expense_date: Option<DateTime<Utc>>,
}

/// Request body for updating an expense.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExpenseRequest {
    /// New category.
    pub category: Option<String>,
    /// New amount.
    pub amount: Option<Decimal>,
    /// New description.
    pub description: Option<String>,
    /// New payment method string.
    pub payment_method: Option<String>,
    /// New reference number.
    pub reference_number: Option<String>,
    /// New expense date.
    pub expense_date: Option<DateTime<Utc>>,
}

/// Query parameters for listing expenses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListExpensesQuery {
    /// Filter by category.
    pub category: Option<String>,
    /// Expenses on or after this date.
    pub date_from: Option<DateTime<Utc>>,
    /// Expenses on or before this date.
    pub date_to: Option<DateTime<Utc>>,
    /// Pagination.
    #[serde(flatten)]
    pub page: PageRequest,
}

/// Creates expense routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses).post(create_expense))
        .route(
            "/expenses/{id}",
            get(get_expense).put(update_expense).delete(delete_expense),
        )
}

/// GET /expenses - List expenses, newest first.
async fn list_expenses(
    State(state): State<AppState>,
    Query(query): Query<ListExpensesQuery>,
) -> Response {
    let repo = ExpenseRepository::new((*state.db).clone());
    let filter = ExpenseFilter {
        category: query.category,
        date_from: query.date_from,
        date_to: query.date_to,
    };

    match repo.list_expenses(filter, &query.page).await {
        Ok(page) => {
            let page = PageResponse {
                data: page
                    .data
                    .into_iter()
                    .map(ExpenseResponse::from)
                    .collect::<Vec<_>>(),
                page: page.page,
                per_page: page.per_page,
                total: page.total,
            };
            Json(page).into_response()
        }
        Err(e) => expense_error_response(&e),
    }
}

/// GET /expenses/{id} - Fetch one expense.
async fn get_expense(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let repo = ExpenseRepository::new((*state.db).clone());
    match repo.get_expense(ExpenseId::from_uuid(id)).await {
        Ok(expense) => Json(ExpenseResponse::from(expense)).into_response(),
        Err(e) => expense_error_response(&e),
    }
}

/// POST /expenses - Record an expense.
async fn create_expense(
    State(state): State<AppState>,
    Json(payload): Json<CreateExpenseRequest>,
) -> Response {
    let Ok(payment_method) = PaymentMode::from_str(&payload.payment_method) else {
        return invalid_method(&payload.payment_method);
    };

    let repo = ExpenseRepository::new((*state.db).clone());
    let input = CreateExpenseInput {
        category: payload.category,
        amount: payload.amount,
        description: payload.description,
        payment_method,
        reference_number: payload.reference_number,
        expense_date: payload.expense_date.unwrap_or_else(Utc::now),
    };

    match repo.create_expense(input).await {
        Ok(expense) => (StatusCode::CREATED, Json(ExpenseResponse::from(expense))).into_response(),
        Err(e) => expense_error_response(&e),
    }
}

/// PUT /expenses/{id} - Update an expense.
async fn update_expense(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateExpenseRequest>,
) -> Response {
    let payment_method = match payload.payment_method.as_deref() {
        Some(raw) => match PaymentMode::from_str(raw) {
            Ok(method) => Some(method),
            Err(_) => return invalid_method(raw),
        },
        None => None,
    };

    let repo = ExpenseRepository::new((*state.db).clone());
    let input = UpdateExpenseInput {
        category: payload.category,
        amount: payload.amount,
        description: payload.description.map(Some),
        payment_method,
        reference_number: payload.reference_number.map(Some),
        expense_date: payload.expense_date,
    };

    match repo.update_expense(ExpenseId::from_uuid(id), input).await {
        Ok(expense) => Json(ExpenseResponse::from(expense)).into_response(),
        Err(e) => expense_error_response(&e),
    }
}

/// DELETE /expenses/{id} - Delete an expense.
async fn delete_expense(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let repo = ExpenseRepository::new((*state.db).clone());
    match repo.delete_expense(ExpenseId::from_uuid(id)).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => expense_error_response(&e),
    }
}

fn invalid_method(raw: &str) -> Response {
    app_error_response(&AppError::Validation(format!(
        "Unknown payment method: {raw}"
    )))
}

fn expense_error_response(err: &ExpenseError) -> Response {
    match err {
        ExpenseError::NotFound(_) => {
            error_response(StatusCode::NOT_FOUND, "expense_not_found", &err.to_string())
        }
        ExpenseError::InvalidAmount(_) => {
            error_response(StatusCode::BAD_REQUEST, "validation_error", &err.to_string())
        }
        ExpenseError::Database(_) => internal_error(err),
    }
}
