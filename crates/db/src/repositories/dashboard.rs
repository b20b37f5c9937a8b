//! Dashboard repository: read-only aggregates for the overview screen.
//!
//! Reporting only reads the stored order columns; it never recomputes or
//! writes them.

use printdesk_core::reconcile::OrderStatus;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

use crate::entities::{expenses, orders, payments, sea_orm_active_enums};

/// Aggregated figures for the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardStats {
    /// Total number of orders on the books.
    pub total_orders: u64,
    /// Sum of all order totals (billed revenue).
    pub total_revenue: Decimal,
    /// Sum of all payments received (including unallocated).
    pub total_received: Decimal,
    /// Sum of all expenses.
    pub total_expenses: Decimal,
    /// Cash-basis profit: received minus expenses.
    pub net_profit: Decimal,
    /// Orders awaiting full payment (`Pending` or `Partially Paid`).
    pub pending_orders: u64,
    /// Sum of outstanding order balances.
    pub outstanding_balance: Decimal,
    /// Most recent orders.
    pub recent_orders: Vec<orders::Model>,
    /// Most recent payments.
    pub recent_payments: Vec<payments::Model>,
}

#[derive(Debug, FromQueryResult)]
struct SumRow {
    total: Option<Decimal>,
}

/// How many recent rows the overview shows.
const RECENT_LIMIT: u64 = 5;

/// Dashboard repository, read-only.
#[derive(Debug, Clone)]
pub struct DashboardRepository {
    db: DatabaseConnection,
}

impl DashboardRepository {
    /// Creates a new dashboard repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Computes the dashboard aggregates.
    ///
    /// # Errors
    ///
    /// Returns an error if any query fails.
    pub async fn stats(&self) -> Result<DashboardStats, DbErr> {
        let total_orders = orders::Entity::find().count(&self.db).await?;

        let total_revenue = self
            .sum(orders::Entity::find()
                .select_only()
                .column_as(orders::Column::TotalAmount.sum(), "total"))
            .await?;

        let outstanding_balance = self
            .sum(orders::Entity::find()
                .select_only()
                .column_as(orders::Column::Balance.sum(), "total"))
            .await?;

        let total_received = self
            .sum(payments::Entity::find()
                .select_only()
                .column_as(payments::Column::Amount.sum(), "total"))
            .await?;

        let total_expenses = self
            .sum(expenses::Entity::find()
                .select_only()
                .column_as(expenses::Column::Amount.sum(), "total"))
            .await?;

        let pending_statuses: Vec<sea_orm_active_enums::OrderStatus> = vec![
            OrderStatus::Pending.into(),
            OrderStatus::PartiallyPaid.into(),
        ];
        let pending_orders = orders::Entity::find()
            .filter(orders::Column::Status.is_in(pending_statuses))
            .count(&self.db)
            .await?;

        let recent_orders = orders::Entity::find()
            .order_by_desc(orders::Column::CreatedAt)
            .limit(RECENT_LIMIT)
            .all(&self.db)
            .await?;

        let recent_payments = payments::Entity::find()
            .order_by_desc(payments::Column::CreatedAt)
            .limit(RECENT_LIMIT)
            .all(&self.db)
            .await?;

        Ok(DashboardStats {
            total_orders,
            total_revenue,
            total_received,
            total_expenses,
            net_profit: total_received - total_expenses,
            pending_orders,
            outstanding_balance,
            recent_orders,
            recent_payments,
        })
    }

    async fn sum<E: EntityTrait>(
        &self,
        query: sea_orm::Select<E>,
    ) -> Result<Decimal, DbErr> {
        Ok(query
            .into_model::<SumRow>()
            .one(&self.db)
            .await?
            .and_then(|row| row.total)
            .unwrap_or_default())
    }
}
