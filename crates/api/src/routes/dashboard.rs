//! Dashboard endpoint: read-only aggregates for the overview screen.

use axum::{Json, Router, extract::State, response::{IntoResponse, Response}, routing::get};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::AppState;
use crate::routes::internal_error;
use crate::routes::orders::OrderResponse;
use crate::routes::payments::PaymentResponse;
use printdesk_db::DashboardRepository;

/// Dashboard response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    /// Company display name, from configuration.
    pub company_name: String,
    /// Currency symbol, from configuration.
    pub currency_symbol: String,
    /// Total number of orders.
    pub total_orders: u64,
    /// Sum of all order totals.
    pub total_revenue: Decimal,
    /// Sum of all payments received.
    pub total_received: Decimal,
    /// Sum of all expenses.
    pub total_expenses: Decimal,
    /// Cash-basis profit: received minus expenses.
    pub net_profit: Decimal,
    /// Orders awaiting full payment.
    pub pending_orders: u64,
    /// Sum of outstanding order balances.
    pub outstanding_balance: Decimal,
    /// Most recent orders.
    pub recent_orders: Vec<OrderResponse>,
    /// Most recent payments.
    pub recent_payments: Vec<PaymentResponse>,
}

/// Creates dashboard routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard))
}

/// GET /dashboard - Aggregated shop figures.
async fn dashboard(State(state): State<AppState>) -> Response {
    let repo = DashboardRepository::new((*state.db).clone());
    match repo.stats().await {
        Ok(stats) => Json(DashboardResponse {
            company_name: state.company.name.clone(),
            currency_symbol: state.company.currency_symbol.clone(),
            total_orders: stats.total_orders,
            total_revenue: stats.total_revenue,
            total_received: stats.total_received,
            total_expenses: stats.total_expenses,
            net_profit: stats.net_profit,
            pending_orders: stats.pending_orders,
            outstanding_balance: stats.outstanding_balance,
            recent_orders: stats
                .recent_orders
                .into_iter()
                .map(OrderResponse::from_header)
                .collect(),
            recent_payments: stats
                .recent_payments
                .into_iter()
                .map(PaymentResponse::from)
                .collect(),
        })
        .into_response(),
        Err(e) => internal_error(&e),
    }
}
