//! Totals and category rankings for the dashboard.
//!
//! Every figure is kept per currency, amounts in different currencies are
//! never added together.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::{
    Error,
    dashboard::entry::DashboardEntry,
    money::{add_amounts, subtract_amounts},
    transaction::TransactionKind,
};

/// The label used for expenses without a category.
pub(super) const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// The number of categories shown in the top expenses list.
pub(super) const TOP_CATEGORY_COUNT: usize = 6;

/// Income, expenses and their difference for one currency.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(super) struct CurrencyTotals {
    pub income: Decimal,
    pub expense: Decimal,
    /// Income minus expenses.
    pub net: Decimal,
}

/// The total spent in one category and currency.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct CategorySpending {
    pub name: String,
    pub currency: String,
    pub total: Decimal,
}

/// Sums income and expenses per currency, ordered by currency code.
///
/// # Errors
///
/// Returns [Error::AmountOverflow] if a sum leaves the range of [Decimal].
pub(super) fn totals_by_currency(
    entries: &[DashboardEntry],
) -> Result<BTreeMap<String, CurrencyTotals>, Error> {
    let mut totals: BTreeMap<String, CurrencyTotals> = BTreeMap::new();

    for entry in entries {
        let currency_totals = totals.entry(entry.currency.clone()).or_default();

        match entry.kind {
            TransactionKind::Income => {
                currency_totals.income = add_amounts(currency_totals.income, entry.amount)?;
            }
            TransactionKind::Expense => {
                currency_totals.expense = add_amounts(currency_totals.expense, entry.amount)?;
            }
        }
    }

    for currency_totals in totals.values_mut() {
        currency_totals.net = subtract_amounts(currency_totals.income, currency_totals.expense)?;
    }

    Ok(totals)
}

/// Ranks expense categories by the amount spent.
///
/// Expenses without a category are grouped under [UNCATEGORIZED_LABEL].
/// Larger totals come first, equal totals are ordered by category name and
/// then currency. At most `limit` categories are returned.
///
/// # Errors
///
/// Returns [Error::AmountOverflow] if a category total leaves the range of [Decimal].
pub(super) fn top_expense_categories(
    entries: &[DashboardEntry],
    limit: usize,
) -> Result<Vec<CategorySpending>, Error> {
    let mut totals: BTreeMap<(&str, &str), Decimal> = BTreeMap::new();

    for entry in entries {
        if entry.kind != TransactionKind::Expense {
            continue;
        }

        let name = entry.category_name.as_deref().unwrap_or(UNCATEGORIZED_LABEL);
        let total = totals.entry((name, entry.currency.as_str())).or_default();
        *total = add_amounts(*total, entry.amount)?;
    }

    let mut ranked: Vec<CategorySpending> = totals
        .into_iter()
        .map(|((name, currency), total)| CategorySpending {
            name: name.to_owned(),
            currency: currency.to_owned(),
            total,
        })
        .collect();

    // Stable sort keeps the (name, currency) order of the map for ties.
    ranked.sort_by(|a, b| b.total.cmp(&a.total));
    ranked.truncate(limit);
    Ok(ranked)
}
