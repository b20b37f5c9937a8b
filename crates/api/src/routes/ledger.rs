//! Client ledger statement endpoint.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::AppState;
use crate::routes::{error_response, internal_error};
use printdesk_core::statement::{LineKind, StatementLine};
use printdesk_db::LedgerRepository;
use printdesk_db::repositories::ledger::LedgerError;
use printdesk_shared::types::id::ClientId;

/// One statement line on the wire.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerLineResponse {
    /// Source entity ID; nil for the opening-balance line.
    pub entity_id: Uuid,
    /// "Opening Balance", "Order", or "Payment".
    pub entry_type: &'static str,
    /// Human-readable reference.
    pub reference: String,
    /// Entry date.
    pub date: DateTime<Utc>,
    /// Debit amount, if a debit.
    pub debit: Option<Decimal>,
    /// Credit amount, if a credit.
    pub credit: Option<Decimal>,
    /// Running balance after this line (debit-positive).
    pub balance: Decimal,
}

impl From<StatementLine> for LedgerLineResponse {
    fn from(line: StatementLine) -> Self {
        Self {
            entity_id: line.entity_id,
            entry_type: match line.kind {
                LineKind::OpeningBalance => "Opening Balance",
                LineKind::OrderDebit => "Order",
                LineKind::PaymentCredit => "Payment",
            },
            reference: line.reference,
            date: line.entry_date,
            debit: line.debit,
            credit: line.credit,
            balance: line.running_balance,
        }
    }
}

/// Full statement response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerResponse {
    /// Client ID.
    pub client_id: Uuid,
    /// Client name.
    pub client_name: String,
    /// Opening balance the running balance starts from.
    pub opening_balance: Decimal,
    /// Chronological lines.
    pub entries: Vec<LedgerLineResponse>,
    /// Sum of all order debits.
    pub total_orders: Decimal,
    /// Sum of all payment credits.
    pub total_paid: Decimal,
    /// Closing balance.
    pub outstanding: Decimal,
}

/// Creates ledger routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/clients/{id}/ledger", get(client_ledger))
}

/// GET /clients/{id}/ledger - The client's full statement.
async fn client_ledger(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let repo = LedgerRepository::new((*state.db).clone());
    match repo.client_statement(ClientId::from_uuid(id)).await {
        Ok(result) => {
            let summary = result.statement.summary;
            Json(LedgerResponse {
                client_id: result.client.id,
                client_name: result.client.name,
                opening_balance: result.client.opening_balance,
                entries: result
                    .statement
                    .lines
                    .into_iter()
                    .map(LedgerLineResponse::from)
                    .collect(),
                total_orders: summary.total_orders,
                total_paid: summary.total_paid,
                outstanding: summary.outstanding,
            })
            .into_response()
        }
        Err(LedgerError::ClientNotFound(_)) => error_response(
            StatusCode::NOT_FOUND,
            "client_not_found",
            "Client not found",
        ),
        Err(e) => internal_error(&e),
    }
}
