//! Ledger repository: feeds the pure statement builder.
//!
//! Fetches the client's opening balance, orders, and payments, and delegates
//! the ordering and running-balance arithmetic to
//! [`printdesk_core::statement::build_statement`]. Strictly read-only.

use chrono::Utc;
use printdesk_core::statement::{build_statement, OrderDebit, PaymentCredit, Statement};
use printdesk_shared::types::id::ClientId;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::entities::{clients, orders, payments};

/// Error types for ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Client not found.
    #[error("Client not found: {0}")]
    ClientNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// A client's full statement with its header row.
#[derive(Debug, Clone)]
pub struct ClientStatement {
    /// The client the statement belongs to.
    pub client: clients::Model,
    /// Chronological lines and summary totals.
    pub statement: Statement,
}

/// Ledger repository, read-only.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Builds the statement for one client.
    ///
    /// Unallocated payments (no `order_id`) appear as credits here even
    /// though they never touched any order.
    ///
    /// # Errors
    ///
    /// Returns `ClientNotFound` if the client does not exist.
    pub async fn client_statement(
        &self,
        client_id: ClientId,
    ) -> Result<ClientStatement, LedgerError> {
        let id = client_id.into_inner();
        let client = clients::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(LedgerError::ClientNotFound(id))?;

        let debits: Vec<OrderDebit> = orders::Entity::find()
            .filter(orders::Column::ClientId.eq(id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|order| OrderDebit {
                id: order.id,
                order_number: order.order_number,
                amount: order.total_amount,
                entry_date: order.order_date.with_timezone(&Utc),
                created_at: order.created_at.with_timezone(&Utc),
            })
            .collect();

        let credits: Vec<PaymentCredit> = payments::Entity::find()
            .filter(payments::Column::ClientId.eq(id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|payment| PaymentCredit {
                id: payment.id,
                reference: payment.reference_number,
                amount: payment.amount,
                entry_date: payment.payment_date.with_timezone(&Utc),
                created_at: payment.created_at.with_timezone(&Utc),
            })
            .collect();

        let statement = build_statement(client.opening_balance, &debits, &credits);

        Ok(ClientStatement { client, statement })
    }
}
