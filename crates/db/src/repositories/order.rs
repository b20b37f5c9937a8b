//! Order repository for order and line-item database operations.

use chrono::{DateTime, Utc};
use printdesk_core::reconcile::{derive_status, OrderLedger, OrderStatus};
use printdesk_shared::types::id::{ClientId, OrderId, OrderItemId};
use printdesk_shared::types::money::round_money;
use printdesk_shared::types::pagination::{PageRequest, PageResponse};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{clients, order_items, orders, payments};

/// Error types for order operations.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    /// Order not found.
    #[error("Order not found: {0}")]
    NotFound(Uuid),

    /// Client not found.
    #[error("Client not found: {0}")]
    ClientNotFound(Uuid),

    /// Order number already in use.
    #[error("Order number already in use: {0}")]
    DuplicateOrderNumber(String),

    /// Order total must be positive.
    #[error("Order total must be positive, got {0}")]
    InvalidTotal(Decimal),

    /// New total would drop below what has already been paid.
    #[error("New total {new_total} is below the paid amount {paid_amount}")]
    TotalBelowPaid {
        /// The requested total.
        new_total: Decimal,
        /// What the client has already paid.
        paid_amount: Decimal,
    },

    /// Only production pipeline stages can be set by hand.
    #[error("Status '{0}' cannot be set manually")]
    ManualStatusNotAllowed(OrderStatus),

    /// Orders with recorded payments cannot be deleted.
    #[error("Order {0} has recorded payments")]
    HasPayments(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for a single order line item.
#[derive(Debug, Clone)]
pub struct CreateOrderItemInput {
    /// What is being printed/copied.
    pub description: String,
    /// Number of units.
    pub quantity: i32,
    /// Price per unit.
    pub unit_price: Decimal,
}

/// Input for creating an order.
#[derive(Debug, Clone)]
pub struct CreateOrderInput {
    /// Client placing the order.
    pub client_id: ClientId,
    /// Explicit order number; auto-generated when `None`.
    pub order_number: Option<String>,
    /// Line items; when non-empty the order total is their sum.
    pub items: Vec<CreateOrderItemInput>,
    /// Explicit total for item-less orders; ignored when items are given.
    pub total_amount: Option<Decimal>,
    /// Order date.
    pub order_date: DateTime<Utc>,
    /// Optional category label (e.g. "exam papers", "binding").
    pub category: Option<String>,
    /// Free-form notes.
    pub details: Option<String>,
    /// Page count for print jobs.
    pub pages: Option<i32>,
    /// Paper stock (e.g. "A4 80gsm").
    pub paper: Option<String>,
}

/// Input for updating an order's non-financial fields and total.
#[derive(Debug, Clone, Default)]
pub struct UpdateOrderInput {
    /// Replace the line items (and recompute the total).
    pub items: Option<Vec<CreateOrderItemInput>>,
    /// New explicit total; rejected when items are also given.
    pub total_amount: Option<Decimal>,
    /// New order date.
    pub order_date: Option<DateTime<Utc>>,
    /// New category.
    pub category: Option<Option<String>>,
    /// New details.
    pub details: Option<Option<String>>,
    /// New page count.
    pub pages: Option<Option<i32>>,
    /// New paper stock.
    pub paper: Option<Option<String>>,
}

/// Filter options for listing orders.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderFilter {
    /// Filter by client.
    pub client_id: Option<ClientId>,
    /// Filter by status.
    pub status: Option<OrderStatus>,
}

/// An order together with its line items.
#[derive(Debug, Clone)]
pub struct OrderWithItems {
    /// Order header.
    pub order: orders::Model,
    /// Line items in entry order.
    pub items: Vec<order_items::Model>,
}

/// Order repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    db: DatabaseConnection,
}

impl OrderRepository {
    /// Creates a new order repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an order with its line items.
    ///
    /// New orders start with `paid_amount = 0`, `balance = total_amount`,
    /// status `Pending`. When items are given the total is the sum of the
    /// per-line totals, each rounded to 2dp.
    ///
    /// # Errors
    ///
    /// Returns `ClientNotFound`, `InvalidTotal` for a non-positive total,
    /// `DuplicateOrderNumber` when an explicit number collides.
    pub async fn create_order(
        &self,
        input: CreateOrderInput,
    ) -> Result<OrderWithItems, OrderError> {
        let client_id = input.client_id.into_inner();
        clients::Entity::find_by_id(client_id)
            .one(&self.db)
            .await?
            .ok_or(OrderError::ClientNotFound(client_id))?;

        let total = if input.items.is_empty() {
            round_money(input.total_amount.unwrap_or_default())
        } else {
            items_total(&input.items)
        };
        if total <= Decimal::ZERO {
            return Err(OrderError::InvalidTotal(total));
        }

        let order_number = match input.order_number {
            Some(number) => {
                self.ensure_number_free(&number).await?;
                number
            }
            None => generate_order_number(input.order_date),
        };

        let txn = self.db.begin().await?;

        let now: DateTime<Utc> = Utc::now();
        let ledger = OrderLedger::new(total);
        let order = orders::ActiveModel {
            id: Set(OrderId::new().into_inner()),
            order_number: Set(order_number),
            client_id: Set(client_id),
            total_amount: Set(ledger.total_amount),
            paid_amount: Set(ledger.paid_amount),
            balance: Set(ledger.balance),
            status: Set(ledger.status.into()),
            order_date: Set(input.order_date.into()),
            category: Set(input.category),
            details: Set(input.details),
            pages: Set(input.pages),
            paper: Set(input.paper),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        let order = order.insert(&txn).await?;

        let items = insert_items(&txn, order.id, &input.items).await?;

        txn.commit().await?;

        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            total = %order.total_amount,
            "order created"
        );
        Ok(OrderWithItems { order, items })
    }

    /// Fetches one order with its items.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order does not exist.
    pub async fn get_order(&self, order_id: OrderId) -> Result<OrderWithItems, OrderError> {
        let id = order_id.into_inner();
        let order = orders::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(OrderError::NotFound(id))?;

        let items = order_items::Entity::find()
            .filter(order_items::Column::OrderId.eq(id))
            .order_by_asc(order_items::Column::SortOrder)
            .all(&self.db)
            .await?;

        Ok(OrderWithItems { order, items })
    }

    /// Lists orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `Database` on query failure.
    pub async fn list_orders(
        &self,
        filter: OrderFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<orders::Model>, OrderError> {
        let mut query = orders::Entity::find();
        if let Some(client_id) = filter.client_id {
            query = query.filter(orders::Column::ClientId.eq(client_id.into_inner()));
        }
        if let Some(status) = filter.status {
            let db_status: crate::entities::sea_orm_active_enums::OrderStatus = status.into();
            query = query.filter(orders::Column::Status.eq(db_status));
        }

        let total = query.clone().count(&self.db).await?;
        let data = query
            .order_by_desc(orders::Column::OrderDate)
            .order_by_desc(orders::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(data, page, total))
    }

    /// Updates an order's metadata, items, or total.
    ///
    /// A total change re-derives `balance` and `status` against the recorded
    /// `paid_amount`; dropping the total below what is already paid is
    /// rejected rather than producing a negative balance.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `InvalidTotal`, or `TotalBelowPaid`.
    pub async fn update_order(
        &self,
        order_id: OrderId,
        input: UpdateOrderInput,
    ) -> Result<OrderWithItems, OrderError> {
        let id = order_id.into_inner();
        let txn = self.db.begin().await?;

        let order = orders::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(OrderError::NotFound(id))?;

        let new_total = match (&input.items, input.total_amount) {
            (Some(items), _) => Some(items_total(items)),
            (None, Some(total)) => Some(round_money(total)),
            (None, None) => None,
        };

        if let Some(total) = new_total {
            if total <= Decimal::ZERO {
                return Err(OrderError::InvalidTotal(total));
            }
            if total < order.paid_amount {
                return Err(OrderError::TotalBelowPaid {
                    new_total: total,
                    paid_amount: order.paid_amount,
                });
            }
        }

        if let Some(items) = &input.items {
            order_items::Entity::delete_many()
                .filter(order_items::Column::OrderId.eq(id))
                .exec(&txn)
                .await?;
            insert_items(&txn, id, items).await?;
        }

        let paid = order.paid_amount;
        let current_status = order.status.clone().into();
        let mut active: orders::ActiveModel = order.into();
        if let Some(total) = new_total {
            active.total_amount = Set(total);
            active.balance = Set(round_money(total - paid).max(Decimal::ZERO));
            active.status = Set(derive_status(paid, total, current_status).into());
        }
        if let Some(date) = input.order_date {
            active.order_date = Set(date.into());
        }
        if let Some(category) = input.category {
            active.category = Set(category);
        }
        if let Some(details) = input.details {
            active.details = Set(details);
        }
        if let Some(pages) = input.pages {
            active.pages = Set(pages);
        }
        if let Some(paper) = input.paper {
            active.paper = Set(paper);
        }
        active.updated_at = Set(Utc::now().into());
        let order = active.update(&txn).await?;

        txn.commit().await?;

        self.get_order(OrderId::from_uuid(order.id)).await
    }

    /// Manually moves an order into a production pipeline stage.
    ///
    /// Only `InProduction` and `Delivered` can be set by hand; the
    /// payment-derived states are owned by the payment paths. A fully paid
    /// order stays `Paid`.
    ///
    /// # Errors
    ///
    /// Returns `ManualStatusNotAllowed` for payment-derived states,
    /// `NotFound` if the order does not exist.
    pub async fn update_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<orders::Model, OrderError> {
        if !status.is_pipeline_stage() {
            return Err(OrderError::ManualStatusNotAllowed(status));
        }

        let id = order_id.into_inner();
        let txn = self.db.begin().await?;

        // Locked read: a payment committing between an unlocked read and this
        // write could settle the order, and the stage write would clobber
        // `Paid`. The guard runs against the status seen under the lock.
        let order = orders::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(OrderError::NotFound(id))?;

        ensure_stage_settable(order.status.clone().into(), status)?;

        let mut active: orders::ActiveModel = order.into();
        active.status = Set(status.into());
        active.updated_at = Set(Utc::now().into());
        let order = active.update(&txn).await?;
        txn.commit().await?;
        Ok(order)
    }

    /// Deletes an order and its items.
    ///
    /// Refused while payments reference the order; delete those first (which
    /// reverses their effect) or keep the order for the books.
    ///
    /// # Errors
    ///
    /// Returns `HasPayments` or `NotFound`.
    pub async fn delete_order(&self, order_id: OrderId) -> Result<(), OrderError> {
        let id = order_id.into_inner();

        let payment_count = payments::Entity::find()
            .filter(payments::Column::OrderId.eq(id))
            .count(&self.db)
            .await?;
        if payment_count > 0 {
            return Err(OrderError::HasPayments(id));
        }

        let txn = self.db.begin().await?;
        order_items::Entity::delete_many()
            .filter(order_items::Column::OrderId.eq(id))
            .exec(&txn)
            .await?;
        let result = orders::Entity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(OrderError::NotFound(id));
        }
        txn.commit().await?;

        tracing::info!(order_id = %id, "order deleted");
        Ok(())
    }

    async fn ensure_number_free(&self, number: &str) -> Result<(), OrderError> {
        let existing = orders::Entity::find()
            .filter(orders::Column::OrderNumber.eq(number))
            .count(&self.db)
            .await?;
        if existing > 0 {
            return Err(OrderError::DuplicateOrderNumber(number.to_string()));
        }
        Ok(())
    }
}

/// A pipeline stage may be set by hand only while the order is not fully
/// paid; `Paid` is owned by the payment paths and never overwritten.
fn ensure_stage_settable(current: OrderStatus, requested: OrderStatus) -> Result<(), OrderError> {
    if !requested.is_pipeline_stage() || current == OrderStatus::Paid {
        return Err(OrderError::ManualStatusNotAllowed(requested));
    }
    Ok(())
}

/// Sum of per-line totals, each rounded at 2dp like the stored column.
fn items_total(items: &[CreateOrderItemInput]) -> Decimal {
    items
        .iter()
        .map(|item| round_money(item.unit_price * Decimal::from(item.quantity)))
        .sum()
}

/// Order numbers are date-prefixed with a random suffix, unique without a
/// counter table: `ORD-20260830-1A2B3C`.
fn generate_order_number(order_date: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "ORD-{}-{}",
        order_date.format("%Y%m%d"),
        suffix[..6].to_uppercase()
    )
}

async fn insert_items(
    txn: &DatabaseTransaction,
    order_id: Uuid,
    items: &[CreateOrderItemInput],
) -> Result<Vec<order_items::Model>, OrderError> {
    let now: DateTime<Utc> = Utc::now();
    let mut inserted = Vec::with_capacity(items.len());
    for (position, item) in items.iter().enumerate() {
        let model = order_items::ActiveModel {
            id: Set(OrderItemId::new().into_inner()),
            order_id: Set(order_id),
            sort_order: Set(i32::try_from(position).unwrap_or(i32::MAX)),
            description: Set(item.description.clone()),
            quantity: Set(item.quantity),
            unit_price: Set(item.unit_price),
            total_price: Set(round_money(item.unit_price * Decimal::from(item.quantity))),
            created_at: Set(now.into()),
        };
        inserted.push(model.insert(txn).await?);
    }
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn item(quantity: i32, unit_price: Decimal) -> CreateOrderItemInput {
        CreateOrderItemInput {
            description: "A4 copies".to_string(),
            quantity,
            unit_price,
        }
    }

    #[test]
    fn test_items_total_sums_rounded_lines() {
        // Each line rounds before the sum, matching the stored columns.
        let items = [item(3, dec!(0.335)), item(2, dec!(1.25))];
        // 3 * 0.335 = 1.005 -> 1.01 (half-up); 2 * 1.25 = 2.50
        assert_eq!(items_total(&items), dec!(3.51));
    }

    #[test]
    fn test_stage_settable_while_unpaid() {
        assert!(ensure_stage_settable(OrderStatus::Pending, OrderStatus::InProduction).is_ok());
        assert!(
            ensure_stage_settable(OrderStatus::PartiallyPaid, OrderStatus::Delivered).is_ok()
        );
    }

    #[test]
    fn test_stage_not_settable_on_paid_order() {
        // The same check runs against the row status read under the lock, so
        // an order settled by a concurrent payment keeps its Paid status.
        assert!(matches!(
            ensure_stage_settable(OrderStatus::Paid, OrderStatus::InProduction),
            Err(OrderError::ManualStatusNotAllowed(OrderStatus::InProduction))
        ));
    }

    #[test]
    fn test_payment_derived_states_not_settable() {
        assert!(matches!(
            ensure_stage_settable(OrderStatus::Pending, OrderStatus::Paid),
            Err(OrderError::ManualStatusNotAllowed(OrderStatus::Paid))
        ));
        assert!(matches!(
            ensure_stage_settable(OrderStatus::Pending, OrderStatus::PartiallyPaid),
            Err(OrderError::ManualStatusNotAllowed(OrderStatus::PartiallyPaid))
        ));
    }

    #[test]
    fn test_generate_order_number_shape() {
        let date = Utc.with_ymd_and_hms(2026, 8, 30, 12, 0, 0).unwrap();
        let number = generate_order_number(date);
        assert!(number.starts_with("ORD-20260830-"));
        assert_eq!(number.len(), "ORD-20260830-".len() + 6);
    }
}
