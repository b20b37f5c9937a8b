//! Client ledger statement builder.
//!
//! Reconstructs a chronological statement for one client: opening balance,
//! one debit per order, one credit per payment, with a running balance
//! computed left-to-right. Read-only; never mutates orders or payments.

use chrono::{DateTime, Utc};
use printdesk_shared::types::money::round_money;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// A debit source line: an order charged to the client.
#[derive(Debug, Clone)]
pub struct OrderDebit {
    /// The order ID.
    pub id: Uuid,
    /// Order number shown as the line reference.
    pub order_number: String,
    /// Amount debited (the order's `total_amount`).
    pub amount: Decimal,
    /// Date the entry takes effect (order date).
    pub entry_date: DateTime<Utc>,
    /// Row creation time, the stable tie-break for same-date entries.
    pub created_at: DateTime<Utc>,
}

/// A credit source line: a payment received from the client.
#[derive(Debug, Clone)]
pub struct PaymentCredit {
    /// The payment ID.
    pub id: Uuid,
    /// Reference number, if any.
    pub reference: Option<String>,
    /// Amount credited.
    pub amount: Decimal,
    /// Date the entry takes effect (payment date).
    pub entry_date: DateTime<Utc>,
    /// Row creation time, the stable tie-break for same-date entries.
    pub created_at: DateTime<Utc>,
}

/// The kind of a statement line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    /// Carried-forward opening balance.
    OpeningBalance,
    /// Order charged to the client.
    OrderDebit,
    /// Payment received (order-linked or unallocated).
    PaymentCredit,
}

/// One line of the statement.
#[derive(Debug, Clone, Serialize)]
pub struct StatementLine {
    /// Source entity ID (nil for the opening-balance line).
    pub entity_id: Uuid,
    /// Line kind.
    pub kind: LineKind,
    /// Human-readable reference (order number, payment reference, ...).
    pub reference: String,
    /// Entry date.
    pub entry_date: DateTime<Utc>,
    /// Debit amount, if this line is a debit.
    pub debit: Option<Decimal>,
    /// Credit amount, if this line is a credit.
    pub credit: Option<Decimal>,
    /// Running balance after this line (debit-positive).
    pub running_balance: Decimal,
}

/// Summary totals for the statement.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatementSummary {
    /// Sum of all order debits.
    pub total_orders: Decimal,
    /// Sum of all payment credits.
    pub total_paid: Decimal,
    /// Closing balance: opening + debits - credits.
    pub outstanding: Decimal,
}

/// A complete client statement.
#[derive(Debug, Clone, Serialize)]
pub struct Statement {
    /// Chronological lines with running balance.
    pub lines: Vec<StatementLine>,
    /// Summary totals.
    pub summary: StatementSummary,
}

/// Builds the statement for one client.
///
/// Entries sort ascending by `entry_date`, ties broken by `created_at` (row
/// insertion order) and then debits before credits, so the running balance is
/// deterministic across repeated calls. The opening-balance line, when
/// nonzero, always comes first.
#[must_use]
pub fn build_statement(
    opening_balance: Decimal,
    orders: &[OrderDebit],
    payments: &[PaymentCredit],
) -> Statement {
    // (date, created_at, debit-before-credit) is the total order over lines.
    let mut entries: Vec<(DateTime<Utc>, DateTime<Utc>, u8, StatementLine)> = Vec::new();

    for order in orders {
        entries.push((
            order.entry_date,
            order.created_at,
            0,
            StatementLine {
                entity_id: order.id,
                kind: LineKind::OrderDebit,
                reference: order.order_number.clone(),
                entry_date: order.entry_date,
                debit: Some(order.amount),
                credit: None,
                running_balance: Decimal::ZERO,
            },
        ));
    }

    for payment in payments {
        entries.push((
            payment.entry_date,
            payment.created_at,
            1,
            StatementLine {
                entity_id: payment.id,
                kind: LineKind::PaymentCredit,
                reference: payment
                    .reference
                    .clone()
                    .unwrap_or_else(|| "Payment".to_string()),
                entry_date: payment.entry_date,
                debit: None,
                credit: Some(payment.amount),
                running_balance: Decimal::ZERO,
            },
        ));
    }

    entries.sort_by(|a, b| (a.0, a.1, a.2).cmp(&(b.0, b.1, b.2)));

    let mut lines = Vec::with_capacity(entries.len() + 1);
    let mut running = opening_balance;
    let mut total_orders = Decimal::ZERO;
    let mut total_paid = Decimal::ZERO;

    if opening_balance != Decimal::ZERO {
        let first_date = entries
            .first()
            .map_or_else(Utc::now, |(date, _, _, _)| *date);
        lines.push(StatementLine {
            entity_id: Uuid::nil(),
            kind: LineKind::OpeningBalance,
            reference: "Opening balance".to_string(),
            entry_date: first_date,
            debit: None,
            credit: None,
            running_balance: round_money(opening_balance),
        });
    }

    for (_, _, _, mut line) in entries {
        match line.kind {
            LineKind::OrderDebit => {
                let amount = line.debit.unwrap_or_default();
                running += amount;
                total_orders += amount;
            }
            LineKind::PaymentCredit => {
                let amount = line.credit.unwrap_or_default();
                running -= amount;
                total_paid += amount;
            }
            LineKind::OpeningBalance => {}
        }
        line.running_balance = round_money(running);
        lines.push(line);
    }

    Statement {
        lines,
        summary: StatementSummary {
            total_orders: round_money(total_orders),
            total_paid: round_money(total_paid),
            outstanding: round_money(running),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn at(day: u32, seq: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, 10, 0, seq).unwrap()
    }

    fn debit(number: &str, amount: Decimal, day: u32, seq: u32) -> OrderDebit {
        OrderDebit {
            id: Uuid::new_v4(),
            order_number: number.to_string(),
            amount,
            entry_date: at(day, 0),
            created_at: at(day, seq),
        }
    }

    fn credit(amount: Decimal, day: u32, seq: u32) -> PaymentCredit {
        PaymentCredit {
            id: Uuid::new_v4(),
            reference: None,
            amount,
            entry_date: at(day, 0),
            created_at: at(day, seq),
        }
    }

    #[test]
    fn test_running_balance_from_opening() {
        let statement = build_statement(
            dec!(500),
            &[debit("ORD-1", dec!(2000), 2, 1)],
            &[credit(dec!(1500), 3, 1)],
        );

        assert_eq!(statement.lines.len(), 3);
        assert_eq!(statement.lines[0].kind, LineKind::OpeningBalance);
        assert_eq!(statement.lines[0].running_balance, dec!(500));
        assert_eq!(statement.lines[1].running_balance, dec!(2500));
        assert_eq!(statement.lines[2].running_balance, dec!(1000));
        assert_eq!(statement.summary.outstanding, dec!(1000));
        assert_eq!(statement.summary.total_orders, dec!(2000));
        assert_eq!(statement.summary.total_paid, dec!(1500));
    }

    #[test]
    fn test_zero_opening_balance_has_no_line() {
        let statement = build_statement(dec!(0), &[debit("ORD-1", dec!(100), 1, 1)], &[]);
        assert_eq!(statement.lines.len(), 1);
        assert_eq!(statement.lines[0].kind, LineKind::OrderDebit);
    }

    #[test]
    fn test_sorted_by_date_across_kinds() {
        let statement = build_statement(
            dec!(0),
            &[debit("ORD-2", dec!(300), 5, 1), debit("ORD-1", dec!(200), 1, 1)],
            &[credit(dec!(200), 3, 1)],
        );

        let refs: Vec<&str> = statement.lines.iter().map(|l| l.reference.as_str()).collect();
        assert_eq!(refs, vec!["ORD-1", "Payment", "ORD-2"]);
        assert_eq!(statement.lines[1].running_balance, dec!(0));
        assert_eq!(statement.summary.outstanding, dec!(300));
    }

    #[test]
    fn test_same_date_debit_sorts_before_credit() {
        // Same entry date and creation time: the order debit comes first so
        // the running balance never dips negative transiently.
        let statement = build_statement(
            dec!(0),
            &[debit("ORD-1", dec!(1000), 4, 1)],
            &[credit(dec!(1000), 4, 1)],
        );

        assert_eq!(statement.lines[0].kind, LineKind::OrderDebit);
        assert_eq!(statement.lines[0].running_balance, dec!(1000));
        assert_eq!(statement.lines[1].kind, LineKind::PaymentCredit);
        assert_eq!(statement.lines[1].running_balance, dec!(0));
    }

    #[test]
    fn test_tie_break_is_deterministic() {
        let orders = [debit("ORD-A", dec!(100), 2, 1), debit("ORD-B", dec!(150), 2, 2)];
        let payments = [credit(dec!(50), 2, 3)];

        let first = build_statement(dec!(0), &orders, &payments);
        let second = build_statement(dec!(0), &orders, &payments);

        let refs = |s: &Statement| -> Vec<String> {
            s.lines.iter().map(|l| l.reference.clone()).collect()
        };
        assert_eq!(refs(&first), refs(&second));
        assert_eq!(refs(&first), vec!["ORD-A", "ORD-B", "Payment"]);
    }

    #[test]
    fn test_unallocated_payment_appears_as_credit() {
        // A payment with no order still credits the client's ledger.
        let statement = build_statement(dec!(1000), &[], &[credit(dec!(400), 1, 1)]);
        assert_eq!(statement.lines.len(), 2);
        assert_eq!(statement.lines[1].kind, LineKind::PaymentCredit);
        assert_eq!(statement.summary.outstanding, dec!(600));
    }

    #[test]
    fn test_negative_opening_balance_credit_side() {
        // Debit-positive convention: a negative opening balance is a credit
        // the client carries forward.
        let statement = build_statement(dec!(-200), &[debit("ORD-1", dec!(100), 1, 1)], &[]);
        assert_eq!(statement.lines[0].running_balance, dec!(-200));
        assert_eq!(statement.summary.outstanding, dec!(-100));
    }
}
