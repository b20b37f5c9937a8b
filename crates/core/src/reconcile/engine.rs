//! Pure reconciliation rules.
//!
//! Everything here operates on an [`OrderLedger`] snapshot and returns a new
//! snapshot; persistence and locking are the repository's job. Amounts are
//! rounded with the 2dp half-up rule only when a new snapshot is produced,
//! since that is what gets persisted.

use printdesk_shared::types::money::{round_money, validate_amount};
use rust_decimal::Decimal;

use super::error::ReconcileError;
use super::types::{OrderLedger, OrderStatus};

/// Derives the canonical order status from payment state.
///
/// `Paid` if `paid >= total`; otherwise a manually-set pipeline stage
/// (`InProduction`/`Delivered`) is preserved; otherwise `PartiallyPaid` when
/// any payment exists, else `Pending`. Reaching full payment always overrides
/// a pipeline stage. Pure function: same inputs, same output.
#[must_use]
pub fn derive_status(paid_amount: Decimal, total_amount: Decimal, current: OrderStatus) -> OrderStatus {
    if paid_amount >= total_amount {
        return OrderStatus::Paid;
    }
    if current.is_pipeline_stage() {
        return current;
    }
    if paid_amount > Decimal::ZERO {
        OrderStatus::PartiallyPaid
    } else {
        OrderStatus::Pending
    }
}

/// Outcome of reversing a payment's effect on an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reversal {
    /// The adjusted ledger state.
    pub ledger: OrderLedger,
    /// Set when the reversal exceeded the recorded `paid_amount` and the
    /// result was clamped to zero. Inconsistent history; the caller logs it.
    pub shortfall: Option<Decimal>,
}

impl OrderLedger {
    /// Validates a new payment against the remaining balance.
    ///
    /// Paying off exactly the balance is valid; exceeding it is not.
    ///
    /// # Errors
    ///
    /// `InvalidAmount` for non-positive amounts, `Overpayment` when the
    /// amount exceeds `balance`.
    pub fn validate_incoming_payment(&self, amount: Decimal) -> Result<(), ReconcileError> {
        validate_amount(amount)?;
        if amount > self.balance {
            return Err(ReconcileError::Overpayment {
                attempted: amount,
                max_allowed: self.balance,
            });
        }
        Ok(())
    }

    /// Validates changing an existing payment's amount from `old_amount` to
    /// `new_amount`.
    ///
    /// The overpayment check runs against the hypothetical new total: the
    /// order can absorb its current balance plus whatever the old amount
    /// releases.
    ///
    /// # Errors
    ///
    /// `InvalidAmount` for non-positive new amounts, `Overpayment` when
    /// `paid_amount - old_amount + new_amount` would exceed `total_amount`.
    pub fn validate_amount_change(
        &self,
        old_amount: Decimal,
        new_amount: Decimal,
    ) -> Result<(), ReconcileError> {
        validate_amount(new_amount)?;
        let max_allowed = self.balance + old_amount;
        if new_amount > max_allowed {
            return Err(ReconcileError::Overpayment {
                attempted: new_amount,
                max_allowed,
            });
        }
        Ok(())
    }

    /// Applies a validated payment to the order.
    ///
    /// Callers must run [`Self::validate_incoming_payment`] first; a real
    /// shortfall never reaches this point. The balance is clamped at zero
    /// only against rounding noise.
    #[must_use]
    pub fn apply_payment(&self, amount: Decimal) -> Self {
        self.adjust_paid(self.paid_amount + amount)
    }

    /// Adjusts `paid_amount` by a signed delta (used for payment updates).
    ///
    /// Callers must run [`Self::validate_amount_change`] first.
    #[must_use]
    pub fn apply_delta(&self, delta: Decimal) -> Self {
        self.adjust_paid(self.paid_amount + delta)
    }

    /// Reverses a payment's effect (payment deletion).
    ///
    /// If subtracting would drive `paid_amount` negative, the result is
    /// clamped to zero and the clamped difference reported so the caller can
    /// flag the inconsistent history.
    #[must_use]
    pub fn reverse_payment(&self, amount: Decimal) -> Reversal {
        let raw = self.paid_amount - amount;
        let shortfall = if raw < Decimal::ZERO { Some(-raw) } else { None };
        Reversal {
            ledger: self.adjust_paid(raw.max(Decimal::ZERO)),
            shortfall,
        }
    }

    /// Returns true if the persisted-state invariant holds.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.balance == round_money(self.total_amount - self.paid_amount)
            && self.paid_amount >= Decimal::ZERO
            && self.paid_amount <= self.total_amount
    }

    fn adjust_paid(&self, new_paid: Decimal) -> Self {
        let paid_amount = round_money(new_paid);
        let balance = round_money(self.total_amount - paid_amount).max(Decimal::ZERO);
        Self {
            total_amount: self.total_amount,
            paid_amount,
            balance,
            status: derive_status(paid_amount, self.total_amount, self.status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn ledger(total: Decimal, paid: Decimal, status: OrderStatus) -> OrderLedger {
        OrderLedger {
            total_amount: total,
            paid_amount: paid,
            balance: total - paid,
            status,
        }
    }

    // ========================================================================
    // Status derivation
    // ========================================================================

    #[rstest]
    #[case(dec!(0), OrderStatus::Pending, OrderStatus::Pending)]
    #[case(dec!(400), OrderStatus::Pending, OrderStatus::PartiallyPaid)]
    #[case(dec!(1000), OrderStatus::PartiallyPaid, OrderStatus::Paid)]
    #[case(dec!(1200), OrderStatus::Pending, OrderStatus::Paid)]
    fn test_derive_status_payment_states(
        #[case] paid: Decimal,
        #[case] current: OrderStatus,
        #[case] expected: OrderStatus,
    ) {
        assert_eq!(derive_status(paid, dec!(1000), current), expected);
    }

    #[test]
    fn test_derive_status_preserves_pipeline_stage() {
        assert_eq!(
            derive_status(dec!(400), dec!(1000), OrderStatus::InProduction),
            OrderStatus::InProduction
        );
        assert_eq!(
            derive_status(dec!(0), dec!(1000), OrderStatus::Delivered),
            OrderStatus::Delivered
        );
    }

    #[test]
    fn test_derive_status_full_payment_overrides_pipeline_stage() {
        assert_eq!(
            derive_status(dec!(1000), dec!(1000), OrderStatus::InProduction),
            OrderStatus::Paid
        );
        assert_eq!(
            derive_status(dec!(1000), dec!(1000), OrderStatus::Delivered),
            OrderStatus::Paid
        );
    }

    #[test]
    fn test_derive_status_is_idempotent() {
        let first = derive_status(dec!(400), dec!(1000), OrderStatus::Pending);
        let second = derive_status(dec!(400), dec!(1000), OrderStatus::Pending);
        assert_eq!(first, second);
    }

    // ========================================================================
    // Validation
    // ========================================================================

    #[test]
    fn test_validate_exact_balance_is_allowed() {
        let order = ledger(dec!(1000), dec!(400), OrderStatus::PartiallyPaid);
        assert!(order.validate_incoming_payment(dec!(600)).is_ok());
    }

    #[test]
    fn test_validate_overpayment_rejected() {
        let order = ledger(dec!(1000), dec!(400), OrderStatus::PartiallyPaid);
        let err = order.validate_incoming_payment(dec!(600.01)).unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::Overpayment {
                attempted,
                max_allowed,
            } if attempted == dec!(600.01) && max_allowed == dec!(600)
        ));
    }

    #[test]
    fn test_validate_non_positive_amounts() {
        let order = ledger(dec!(1000), dec!(0), OrderStatus::Pending);
        assert!(matches!(
            order.validate_incoming_payment(dec!(0)),
            Err(ReconcileError::InvalidAmount(amount)) if amount == dec!(0)
        ));
        assert!(matches!(
            order.validate_incoming_payment(dec!(-50)),
            Err(ReconcileError::InvalidAmount(amount)) if amount == dec!(-50)
        ));
        assert!(matches!(
            order.validate_amount_change(dec!(100), dec!(-1)),
            Err(ReconcileError::InvalidAmount(amount)) if amount == dec!(-1)
        ));
    }

    #[test]
    fn test_validate_amount_change_within_released_headroom() {
        // Total 1000, paid 400 via one payment; raising it to 1000 is fine,
        // 1000.01 is not.
        let order = ledger(dec!(1000), dec!(400), OrderStatus::PartiallyPaid);
        assert!(order.validate_amount_change(dec!(400), dec!(700)).is_ok());
        assert!(order.validate_amount_change(dec!(400), dec!(1000)).is_ok());
        assert!(matches!(
            order.validate_amount_change(dec!(400), dec!(1000.01)),
            Err(ReconcileError::Overpayment { .. })
        ));
    }

    // ========================================================================
    // Apply / reverse
    // ========================================================================

    #[test]
    fn test_apply_payment_updates_all_fields() {
        let order = ledger(dec!(1000), dec!(0), OrderStatus::Pending);
        let after = order.apply_payment(dec!(400));
        assert_eq!(after.paid_amount, dec!(400));
        assert_eq!(after.balance, dec!(600));
        assert_eq!(after.status, OrderStatus::PartiallyPaid);
        assert!(after.is_consistent());
    }

    #[test]
    fn test_apply_payment_to_full_settlement() {
        let order = ledger(dec!(1000), dec!(400), OrderStatus::InProduction);
        let after = order.apply_payment(dec!(600));
        assert_eq!(after.paid_amount, dec!(1000));
        assert_eq!(after.balance, dec!(0));
        assert_eq!(after.status, OrderStatus::Paid);
    }

    #[test]
    fn test_round_trip_apply_then_reverse() {
        let order = ledger(dec!(1000), dec!(250), OrderStatus::PartiallyPaid);
        let applied = order.apply_payment(dec!(300));
        let reversal = applied.reverse_payment(dec!(300));
        assert_eq!(reversal.ledger.balance, order.balance);
        assert_eq!(reversal.ledger.paid_amount, order.paid_amount);
        assert!(reversal.shortfall.is_none());
    }

    #[test]
    fn test_update_delta_walkthrough() {
        // Order total 1000, one payment of 400.
        let order = ledger(dec!(1000), dec!(400), OrderStatus::PartiallyPaid);

        // Update the payment to 700: paid 700, balance 300, still partial.
        order.validate_amount_change(dec!(400), dec!(700)).unwrap();
        let order = order.apply_delta(dec!(700) - dec!(400));
        assert_eq!(order.paid_amount, dec!(700));
        assert_eq!(order.balance, dec!(300));
        assert_eq!(order.status, OrderStatus::PartiallyPaid);

        // Update it again to 1000: fully paid.
        order.validate_amount_change(dec!(700), dec!(1000)).unwrap();
        let order = order.apply_delta(dec!(1000) - dec!(700));
        assert_eq!(order.paid_amount, dec!(1000));
        assert_eq!(order.balance, dec!(0));
        assert_eq!(order.status, OrderStatus::Paid);
    }

    #[test]
    fn test_delete_reversal_keeps_partially_paid() {
        // Order total 5000, payments of 2000 and 1500 applied.
        let order = ledger(dec!(5000), dec!(0), OrderStatus::Pending)
            .apply_payment(dec!(2000))
            .apply_payment(dec!(1500));
        assert_eq!(order.paid_amount, dec!(3500));
        assert_eq!(order.balance, dec!(1500));

        // Delete the 2000 payment.
        let reversal = order.reverse_payment(dec!(2000));
        assert_eq!(reversal.ledger.paid_amount, dec!(1500));
        assert_eq!(reversal.ledger.balance, dec!(3500));
        assert_eq!(reversal.ledger.status, OrderStatus::PartiallyPaid);
        assert!(reversal.shortfall.is_none());
    }

    #[test]
    fn test_reverse_to_zero_returns_pending() {
        let order = ledger(dec!(1000), dec!(0), OrderStatus::Pending).apply_payment(dec!(400));
        let reversal = order.reverse_payment(dec!(400));
        assert_eq!(reversal.ledger.paid_amount, dec!(0));
        assert_eq!(reversal.ledger.status, OrderStatus::Pending);
    }

    #[test]
    fn test_reverse_clamps_inconsistent_history() {
        let order = ledger(dec!(1000), dec!(300), OrderStatus::PartiallyPaid);
        let reversal = order.reverse_payment(dec!(500));
        assert_eq!(reversal.ledger.paid_amount, dec!(0));
        assert_eq!(reversal.ledger.balance, dec!(1000));
        assert_eq!(reversal.shortfall, Some(dec!(200)));
    }

    #[test]
    fn test_reverse_from_paid_derives_partial() {
        let order = ledger(dec!(1000), dec!(0), OrderStatus::Pending)
            .apply_payment(dec!(400))
            .apply_payment(dec!(600));
        assert_eq!(order.status, OrderStatus::Paid);

        let reversal = order.reverse_payment(dec!(600));
        assert_eq!(reversal.ledger.status, OrderStatus::PartiallyPaid);
        assert_eq!(reversal.ledger.balance, dec!(600));
    }
}
