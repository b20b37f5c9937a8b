//! Property-based tests for the reconciliation engine.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::engine::derive_status;
use super::error::ReconcileError;
use super::types::{OrderLedger, OrderStatus};

/// Strategy for generating 2dp monetary amounts in (0, 10_000].
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for generating order totals in [1, 10_000].
fn total_strategy() -> impl Strategy<Value = Decimal> {
    (100i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn status_strategy() -> impl Strategy<Value = OrderStatus> {
    prop_oneof![
        Just(OrderStatus::Pending),
        Just(OrderStatus::PartiallyPaid),
        Just(OrderStatus::InProduction),
        Just(OrderStatus::Delivered),
        Just(OrderStatus::Paid),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// For any sequence of validated payments, the ledger invariant holds:
    /// `balance == total - paid` and `0 <= paid <= total`.
    #[test]
    fn prop_invariant_after_payment_sequence(
        total in total_strategy(),
        amounts in proptest::collection::vec(amount_strategy(), 0..8),
    ) {
        let mut ledger = OrderLedger::new(total);
        for amount in amounts {
            if ledger.validate_incoming_payment(amount).is_ok() {
                ledger = ledger.apply_payment(amount);
            }
            prop_assert!(ledger.is_consistent(), "inconsistent ledger: {ledger:?}");
        }
    }

    /// Applying then reversing the same amount restores the exact balance.
    #[test]
    fn prop_apply_reverse_round_trip(
        total in total_strategy(),
        amount in amount_strategy(),
    ) {
        let ledger = OrderLedger::new(total);
        prop_assume!(ledger.validate_incoming_payment(amount).is_ok());

        let applied = ledger.apply_payment(amount);
        let reversed = applied.reverse_payment(amount);

        prop_assert_eq!(reversed.ledger.balance, ledger.balance);
        prop_assert_eq!(reversed.ledger.paid_amount, ledger.paid_amount);
        prop_assert!(reversed.shortfall.is_none());
    }

    /// A payment exceeding the balance always fails validation, and
    /// validation alone never changes the snapshot.
    #[test]
    fn prop_overpayment_always_rejected(
        total in total_strategy(),
        excess in amount_strategy(),
    ) {
        let ledger = OrderLedger::new(total);
        let before = ledger;
        let attempted = total + excess;

        let result = ledger.validate_incoming_payment(attempted);
        prop_assert!(
            matches!(result, Err(ReconcileError::Overpayment { .. })),
            "expected Overpayment error, got {result:?}"
        );
        prop_assert_eq!(ledger, before);
    }

    /// Status derivation is a pure function of its inputs.
    #[test]
    fn prop_derive_status_idempotent(
        total in total_strategy(),
        paid in amount_strategy(),
        status in status_strategy(),
    ) {
        prop_assert_eq!(
            derive_status(paid, total, status),
            derive_status(paid, total, status)
        );
    }

    /// Full payment always yields `Paid`, whatever the current status.
    #[test]
    fn prop_full_payment_is_paid(
        total in total_strategy(),
        status in status_strategy(),
    ) {
        prop_assert_eq!(derive_status(total, total, status), OrderStatus::Paid);
    }

    /// Below full payment, pipeline stages are never clobbered.
    #[test]
    fn prop_pipeline_stage_preserved_below_full(
        total in total_strategy(),
        paid in amount_strategy(),
    ) {
        prop_assume!(paid < total);
        prop_assert_eq!(
            derive_status(paid, total, OrderStatus::InProduction),
            OrderStatus::InProduction
        );
        prop_assert_eq!(
            derive_status(paid, total, OrderStatus::Delivered),
            OrderStatus::Delivered
        );
    }

    /// Reversal never produces a negative paid_amount.
    #[test]
    fn prop_reverse_never_negative(
        total in total_strategy(),
        paid in amount_strategy(),
        reverse in amount_strategy(),
    ) {
        prop_assume!(paid <= total);
        let ledger = OrderLedger::new(total).apply_payment(paid);
        let reversal = ledger.reverse_payment(reverse);
        prop_assert!(reversal.ledger.paid_amount >= Decimal::ZERO);
        prop_assert!(reversal.ledger.is_consistent());
    }
}
