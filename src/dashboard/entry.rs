//! Database queries for the ledger entries summarised on the dashboard.

use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::{
    Error, auth::UserID, money::get_decimal, period::DateRange, transaction::TransactionKind,
};

/// A ledger entry reduced to what the dashboard aggregates.
///
/// This is separate from [crate::transaction::Transaction] since the
/// dashboard only needs the kind, amount, currency and category name.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct DashboardEntry {
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub currency: String,
    pub category_name: Option<String>,
}

/// Gets the user's entries dated within `range`, leaving out both halves of
/// every transfer.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub(super) fn get_dashboard_entries(
    user_id: UserID,
    range: DateRange,
    connection: &Connection,
) -> Result<Vec<DashboardEntry>, Error> {
    connection
        .prepare(
            "SELECT t.kind, t.amount, t.currency, category.name
            FROM \"transaction\" t
            LEFT JOIN category ON category.id = t.category_id
            WHERE t.user_id = ?1
                AND t.is_transfer = 0
                AND t.date BETWEEN ?2 AND ?3",
        )?
        .query_map((user_id.as_i64(), range.start, range.end), |row| {
            Ok(DashboardEntry {
                kind: row.get(0)?,
                amount: get_decimal(row, 1)?,
                currency: row.get(2)?,
                category_name: row.get(3)?,
            })
        })?
        .map(|entry| entry.map_err(Error::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use time::{Date, macros::date};

    use crate::{
        period::DateRange,
        test_utils::{create_test_account, create_test_category, get_test_connection},
        transaction::{NewTransaction, TransactionKind, insert_transaction},
    };

    use super::get_dashboard_entries;

    #[test]
    fn skips_transfers_and_entries_outside_range() {
        let (conn, user) = get_test_connection();
        let account = create_test_account(user.id, "Wallet", "PEN", &conn);
        let food = create_test_category(user.id, "Food", TransactionKind::Expense, &conn);
        let insert = |amount: Decimal, date: Date, category_id: Option<i64>, is_transfer: bool| {
            insert_transaction(
                user.id,
                &NewTransaction {
                    kind: TransactionKind::Expense,
                    amount,
                    currency: "PEN".to_owned(),
                    date,
                    note: None,
                    account_id: account.id,
                    category_id,
                    is_transfer,
                },
                &conn,
            )
            .unwrap();
        };
        insert(dec!(12.5), date!(2025 - 04 - 02), Some(food.id), false);
        insert(dec!(7), date!(2025 - 04 - 30), None, false);
        insert(dec!(300), date!(2025 - 04 - 10), None, true);
        insert(dec!(9), date!(2025 - 05 - 01), Some(food.id), false);

        let range = DateRange {
            start: date!(2025 - 04 - 01),
            end: date!(2025 - 04 - 30),
        };
        let mut entries = get_dashboard_entries(user.id, range, &conn).unwrap();
        entries.sort_by(|a, b| a.amount.cmp(&b.amount));

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].amount, dec!(7));
        assert_eq!(entries[0].category_name, None);
        assert_eq!(entries[1].amount, dec!(12.5));
        assert_eq!(entries[1].category_name.as_deref(), Some("Food"));
    }
}
