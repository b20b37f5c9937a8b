//! Payment repository: the only write path for order ledger columns.
//!
//! Every payment create/update/delete runs in one database transaction that
//! locks the linked order row (`SELECT ... FOR UPDATE`), validates against the
//! locked balance, and writes the payment together with the recomputed order
//! columns. Validation failures abort before any write.

use chrono::{DateTime, Utc};
use printdesk_core::reconcile::{OrderLedger, PaymentMode, PaymentStatus, ReconcileError};
use printdesk_shared::types::id::{ClientId, OrderId, PaymentId};
use printdesk_shared::types::money::{round_money, validate_amount};
use printdesk_shared::types::pagination::{PageRequest, PageResponse};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{clients, orders, payments};

/// Input for recording a payment.
#[derive(Debug, Clone)]
pub struct CreatePaymentInput {
    /// Paying client.
    pub client_id: ClientId,
    /// Order the payment settles; `None` records an unallocated credit.
    pub order_id: Option<OrderId>,
    /// Amount received, must be positive.
    pub amount: Decimal,
    /// Payment mode.
    pub mode: PaymentMode,
    /// Settlement status; defaults to `Completed`.
    pub status: Option<PaymentStatus>,
    /// Optional reference (cheque number, UPI transaction ID, ...).
    pub reference_number: Option<String>,
    /// Date the payment was received.
    pub payment_date: DateTime<Utc>,
}

/// Input for updating a payment.
///
/// `client_id` and `order_id` are immutable by construction: re-pointing a
/// payment would mean reversing one order and applying to another, which the
/// front desk handles as delete + re-create.
#[derive(Debug, Clone, Default)]
pub struct UpdatePaymentInput {
    /// New amount, if changing.
    pub amount: Option<Decimal>,
    /// New mode, if changing.
    pub mode: Option<PaymentMode>,
    /// New settlement status, if changing.
    pub status: Option<PaymentStatus>,
    /// New reference number, if changing.
    pub reference_number: Option<Option<String>>,
    /// New payment date, if changing.
    pub payment_date: Option<DateTime<Utc>>,
}

/// A persisted payment together with the recomputed order snapshot.
///
/// `order` is `Some` exactly when the payment is order-linked, so callers see
/// the adjusted `paid_amount`/`balance`/`status` without a second read.
#[derive(Debug, Clone)]
pub struct PaymentWithOrder {
    /// The payment as persisted.
    pub payment: payments::Model,
    /// The linked order after reconciliation, if any.
    pub order: Option<orders::Model>,
}

/// Filter options for listing payments.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaymentFilter {
    /// Filter by client.
    pub client_id: Option<ClientId>,
    /// Filter by order.
    pub order_id: Option<OrderId>,
}

/// Payment repository.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    db: DatabaseConnection,
}

impl PaymentRepository {
    /// Creates a new payment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a payment.
    ///
    /// For an order-linked payment, the order row is locked for the duration
    /// of the transaction; the amount is validated against the balance read
    /// under the lock, so two concurrent payments on the same order serialize
    /// and the second sees the already-adjusted balance.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` for a non-positive amount, `ClientNotFound` /
    /// `OrderNotFound` for dangling references, `Overpayment` when the amount
    /// exceeds the order balance, `ConcurrentModification` on lock conflicts.
    pub async fn create_payment(
        &self,
        input: CreatePaymentInput,
    ) -> Result<PaymentWithOrder, ReconcileError> {
        // Rounded first so a sub-cent amount that rounds to zero is rejected.
        let amount = validate_amount(round_money(input.amount))?;

        let txn = self.db.begin().await.map_err(map_db_err)?;

        let client_id = input.client_id.into_inner();
        clients::Entity::find_by_id(client_id)
            .one(&txn)
            .await
            .map_err(map_db_err)?
            .ok_or(ReconcileError::ClientNotFound(client_id))?;

        let mut order_snapshot = None;
        if let Some(order_id) = input.order_id {
            let order = self.lock_order(&txn, order_id.into_inner()).await?;
            // A payment on an order must come from that order's client.
            if order.client_id != client_id {
                return Err(ReconcileError::OrderNotFound(order_id.into_inner()));
            }

            let ledger = ledger_of(&order);
            ledger.validate_incoming_payment(amount)?;
            let updated = ledger.apply_payment(amount);
            order_snapshot = Some(write_order(&txn, order, updated).await?);
        }

        let now: DateTime<Utc> = Utc::now();
        let payment = payments::ActiveModel {
            id: Set(PaymentId::new().into_inner()),
            client_id: Set(client_id),
            order_id: Set(input.order_id.map(OrderId::into_inner)),
            amount: Set(amount),
            mode: Set(input.mode.into()),
            status: Set(input.status.unwrap_or(PaymentStatus::Completed).into()),
            reference_number: Set(input.reference_number),
            payment_date: Set(input.payment_date.into()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let inserted = payment.insert(&txn).await.map_err(map_db_err)?;
        txn.commit().await.map_err(map_db_err)?;

        tracing::info!(
            payment_id = %inserted.id,
            client_id = %inserted.client_id,
            order_id = ?inserted.order_id,
            amount = %inserted.amount,
            "payment recorded"
        );
        Ok(PaymentWithOrder {
            payment: inserted,
            order: order_snapshot,
        })
    }

    /// Updates a payment's mutable fields.
    ///
    /// An amount change on an order-linked payment is validated as a delta:
    /// the new amount may consume the current balance plus what this payment
    /// already contributed, so shrinking a payment always succeeds and growing
    /// it is bounded by `balance + old_amount`.
    ///
    /// # Errors
    ///
    /// Returns `PaymentNotFound` if the payment does not exist, plus the same
    /// errors as [`Self::create_payment`] for the re-validation.
    pub async fn update_payment(
        &self,
        payment_id: PaymentId,
        input: UpdatePaymentInput,
    ) -> Result<PaymentWithOrder, ReconcileError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let payment = payments::Entity::find_by_id(payment_id.into_inner())
            .one(&txn)
            .await
            .map_err(map_db_err)?
            .ok_or(ReconcileError::PaymentNotFound(payment_id.into_inner()))?;

        let new_amount = match input.amount {
            Some(amount) => Some(validate_amount(round_money(amount))?),
            None => None,
        };

        let mut order_snapshot = None;
        if let Some(order_id) = payment.order_id {
            match new_amount {
                Some(new_amount) if new_amount != payment.amount => {
                    let order = self.lock_order(&txn, order_id).await?;
                    let ledger = ledger_of(&order);
                    ledger.validate_amount_change(payment.amount, new_amount)?;
                    let updated = ledger.apply_delta(new_amount - payment.amount);
                    order_snapshot = Some(write_order(&txn, order, updated).await?);
                }
                _ => {
                    order_snapshot = orders::Entity::find_by_id(order_id)
                        .one(&txn)
                        .await
                        .map_err(map_db_err)?;
                }
            }
        }

        let mut active: payments::ActiveModel = payment.into();
        if let Some(amount) = new_amount {
            active.amount = Set(amount);
        }
        if let Some(mode) = input.mode {
            active.mode = Set(mode.into());
        }
        if let Some(status) = input.status {
            active.status = Set(status.into());
        }
        if let Some(reference) = input.reference_number {
            active.reference_number = Set(reference);
        }
        if let Some(date) = input.payment_date {
            active.payment_date = Set(date.into());
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&txn).await.map_err(map_db_err)?;
        txn.commit().await.map_err(map_db_err)?;

        Ok(PaymentWithOrder {
            payment: updated,
            order: order_snapshot,
        })
    }

    /// Deletes a payment, reversing its effect on the linked order.
    ///
    /// Role enforcement (admin only) happens at the API layer.
    ///
    /// # Errors
    ///
    /// Returns `PaymentNotFound` if the payment does not exist,
    /// `ConcurrentModification` on lock conflicts.
    pub async fn delete_payment(&self, payment_id: PaymentId) -> Result<(), ReconcileError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let payment = payments::Entity::find_by_id(payment_id.into_inner())
            .one(&txn)
            .await
            .map_err(map_db_err)?
            .ok_or(ReconcileError::PaymentNotFound(payment_id.into_inner()))?;

        if let Some(order_id) = payment.order_id {
            let order = self.lock_order(&txn, order_id).await?;
            let ledger = ledger_of(&order);
            let reversal = ledger.reverse_payment(payment.amount);
            if let Some(shortfall) = reversal.shortfall {
                // Should be unreachable when all writes go through this
                // repository; clamped to zero, flagged for investigation.
                tracing::warn!(
                    payment_id = %payment.id,
                    order_id = %order_id,
                    %shortfall,
                    "payment reversal exceeded recorded paid amount"
                );
            }
            write_order(&txn, order, reversal.ledger).await?;
        }

        let id = payment.id;
        payment.delete(&txn).await.map_err(map_db_err)?;
        txn.commit().await.map_err(map_db_err)?;

        tracing::info!(payment_id = %id, "payment deleted");
        Ok(())
    }

    /// Fetches one payment.
    ///
    /// # Errors
    ///
    /// Returns `PaymentNotFound` if the payment does not exist.
    pub async fn get_payment(
        &self,
        payment_id: PaymentId,
    ) -> Result<payments::Model, ReconcileError> {
        payments::Entity::find_by_id(payment_id.into_inner())
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or(ReconcileError::PaymentNotFound(payment_id.into_inner()))
    }

    /// Lists payments, newest first.
    ///
    /// # Errors
    ///
    /// Returns `Database` on query failure.
    pub async fn list_payments(
        &self,
        filter: PaymentFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<payments::Model>, ReconcileError> {
        let mut query = payments::Entity::find();
        if let Some(client_id) = filter.client_id {
            query = query.filter(payments::Column::ClientId.eq(client_id.into_inner()));
        }
        if let Some(order_id) = filter.order_id {
            query = query.filter(payments::Column::OrderId.eq(order_id.into_inner()));
        }

        let total = query.clone().count(&self.db).await.map_err(map_db_err)?;
        let data = query
            .order_by_desc(payments::Column::PaymentDate)
            .order_by_desc(payments::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(PageResponse::new(data, page, total))
    }

    /// Reads the order row under an exclusive lock.
    async fn lock_order(
        &self,
        txn: &DatabaseTransaction,
        order_id: Uuid,
    ) -> Result<orders::Model, ReconcileError> {
        orders::Entity::find_by_id(order_id)
            .lock_exclusive()
            .one(txn)
            .await
            .map_err(|e| map_lock_err(order_id, &e))?
            .ok_or(ReconcileError::OrderNotFound(order_id))
    }
}

/// Snapshot of an order's financial columns as a pure ledger value.
fn ledger_of(order: &orders::Model) -> OrderLedger {
    OrderLedger {
        total_amount: order.total_amount,
        paid_amount: order.paid_amount,
        balance: order.balance,
        status: order.status.clone().into(),
    }
}

/// Writes a recomputed ledger back to the locked order row.
async fn write_order(
    txn: &DatabaseTransaction,
    order: orders::Model,
    ledger: OrderLedger,
) -> Result<orders::Model, ReconcileError> {
    debug_assert!(ledger.is_consistent(), "refusing to persist {ledger:?}");

    let mut active: orders::ActiveModel = order.into();
    active.paid_amount = Set(ledger.paid_amount);
    active.balance = Set(ledger.balance);
    active.status = Set(ledger.status.into());
    active.updated_at = Set(Utc::now().into());
    active.update(txn).await.map_err(map_db_err)
}

fn map_db_err(err: DbErr) -> ReconcileError {
    ReconcileError::Database(err.to_string())
}

/// Lock acquisition can fail with a serialization or deadlock error under
/// contention; those surface as a retryable conflict rather than a 500.
fn map_lock_err(order_id: Uuid, err: &DbErr) -> ReconcileError {
    let message = err.to_string();
    if message.contains("could not serialize") || message.contains("deadlock") {
        ReconcileError::ConcurrentModification(order_id)
    } else {
        ReconcileError::Database(message)
    }
}
