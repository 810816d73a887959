//! Per-category totals derived from a user's transactions. Nothing here is
//! cached; callers pass the full transaction list on each call.

use chrono::{DateTime, Datelike, TimeZone};
use std::collections::BTreeMap;

use crate::store::{Transaction, TransactionKind};

/// Expense totals per category for the calendar month containing `now`.
pub fn monthly_summary<Tz: TimeZone>(
    transactions: &[Transaction],
    now: &DateTime<Tz>,
) -> BTreeMap<String, u64> {
    sum_by_category(
        transactions
            .iter()
            .filter(|t| t.kind == TransactionKind::Expense && in_month(t, now)),
    )
}

/// Expense totals per category across the whole ledger.
pub fn overall_summary(transactions: &[Transaction]) -> BTreeMap<String, u64> {
    sum_by_category(
        transactions
            .iter()
            .filter(|t| t.kind == TransactionKind::Expense),
    )
}

/// This month's expenses, newest first.
pub fn monthly_expenses<Tz: TimeZone>(
    transactions: &[Transaction],
    now: &DateTime<Tz>,
) -> Vec<Transaction> {
    transactions
        .iter()
        .rev()
        .filter(|t| t.kind == TransactionKind::Expense && in_month(t, now))
        .cloned()
        .collect()
}

fn in_month<Tz: TimeZone>(txn: &Transaction, now: &DateTime<Tz>) -> bool {
    let local = txn.timestamp.with_timezone(&now.timezone());
    local.year() == now.year() && local.month() == now.month()
}

fn sum_by_category<'a>(transactions: impl Iterator<Item = &'a Transaction>) -> BTreeMap<String, u64> {
    let mut totals = BTreeMap::new();
    for txn in transactions {
        let total = totals.entry(txn.category.clone()).or_insert(0u64);
        *total = total.saturating_add(txn.amount);
    }
    totals
}
