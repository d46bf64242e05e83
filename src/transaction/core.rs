//! The ledger: income and expense entries against accounts.

use std::fmt::Display;

use rusqlite::{
    Connection, OptionalExtension, Row, ToSql, named_params,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error, auth::UserID, database_id::DatabaseId, money::get_decimal, period::DateRange,
};

pub type TransactionId = DatabaseId;

/// The most rows a single ledger query returns.
pub const MAX_TRANSACTIONS: u32 = 200;

/// Whether money came into or went out of an account.
///
/// Categories carry a kind too, and a transaction may only use a category of
/// the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(FromSqlError::Other(
                format!("unknown transaction kind \"{other}\"").into(),
            )),
        }
    }
}

/// A ledger entry joined with the names of its account and category.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: TransactionId,
    pub kind: TransactionKind,
    /// Always greater than zero, the kind gives the direction.
    pub amount: Decimal,
    pub currency: String,
    pub date: Date,
    pub note: Option<String>,
    pub account_id: DatabaseId,
    pub account_name: String,
    pub category_id: Option<DatabaseId>,
    pub category_name: Option<String>,
    /// Set for the two entries written by a transfer.
    pub is_transfer: bool,
}

/// A validated ledger entry that is ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub currency: String,
    pub date: Date,
    pub note: Option<String>,
    pub account_id: DatabaseId,
    pub category_id: Option<DatabaseId>,
    pub is_transfer: bool,
}

/// Which ledger entries to list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransactionFilter {
    pub range: DateRange,
    /// Entries written by transfers are hidden unless this is set.
    pub include_transfers: bool,
}

pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
            amount TEXT NOT NULL,
            currency TEXT NOT NULL,
            date TEXT NOT NULL,
            note TEXT,
            account_id INTEGER NOT NULL REFERENCES account(id) ON DELETE RESTRICT,
            category_id INTEGER REFERENCES category(id) ON DELETE SET NULL,
            is_transfer INTEGER NOT NULL DEFAULT 0
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date)",
        (),
    )?;

    Ok(())
}

/// Trim `note` and turn an empty note into `None`.
pub fn normalize_note(note: &str) -> Option<String> {
    let note = note.trim();

    (!note.is_empty()).then(|| note.to_owned())
}

/// Insert `transaction` for `user_id` and return its ID.
///
/// The caller is responsible for checking that the account and category
/// belong to `user_id`.
pub fn insert_transaction(
    user_id: UserID,
    transaction: &NewTransaction,
    connection: &Connection,
) -> Result<TransactionId, Error> {
    connection.execute(
        "INSERT INTO \"transaction\"
            (user_id, kind, amount, currency, date, note, account_id, category_id, is_transfer)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        (
            user_id.as_i64(),
            transaction.kind,
            transaction.amount.to_string(),
            &transaction.currency,
            transaction.date,
            &transaction.note,
            transaction.account_id,
            transaction.category_id,
            transaction.is_transfer,
        ),
    )?;

    Ok(connection.last_insert_rowid())
}

fn map_row_to_transaction(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        kind: row.get(1)?,
        amount: get_decimal(row, 2)?,
        currency: row.get(3)?,
        date: row.get(4)?,
        note: row.get(5)?,
        account_id: row.get(6)?,
        account_name: row.get(7)?,
        category_id: row.get(8)?,
        category_name: row.get(9)?,
        is_transfer: row.get(10)?,
    })
}

/// List the user's ledger entries in `filter`'s date range, newest first.
///
/// At most [MAX_TRANSACTIONS] entries are returned.
pub fn get_transactions(
    user_id: UserID,
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    query_transactions(user_id, filter, i64::from(MAX_TRANSACTIONS), connection)
}

/// Like [get_transactions], but without the row limit.
pub fn get_all_transactions(
    user_id: UserID,
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    // A negative limit means no limit in SQLite.
    query_transactions(user_id, filter, -1, connection)
}

fn query_transactions(
    user_id: UserID,
    filter: &TransactionFilter,
    limit: i64,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT t.id, t.kind, t.amount, t.currency, t.date, t.note,
                t.account_id, account.name, t.category_id, category.name, t.is_transfer
            FROM \"transaction\" t
            INNER JOIN account ON account.id = t.account_id
            LEFT JOIN category ON category.id = t.category_id
            WHERE t.user_id = :user_id
                AND t.date BETWEEN :start AND :end
                AND (:include_transfers OR t.is_transfer = 0)
            ORDER BY t.date DESC, t.id DESC
            LIMIT :limit",
        )?
        .query_map(
            named_params! {
                ":user_id": user_id.as_i64(),
                ":start": filter.range.start,
                ":end": filter.range.end,
                ":include_transfers": filter.include_transfers,
                ":limit": limit,
            },
            map_row_to_transaction,
        )?
        .map(|transaction| transaction.map_err(Error::from))
        .collect()
}

/// The kind, amount and account of every ledger entry of the user, transfers included.
pub fn get_ledger_amounts(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<(DatabaseId, TransactionKind, Decimal)>, Error> {
    connection
        .prepare("SELECT account_id, kind, amount FROM \"transaction\" WHERE user_id = ?1")?
        .query_map([user_id.as_i64()], |row| {
            Ok((row.get(0)?, row.get(1)?, get_decimal(row, 2)?))
        })?
        .map(|entry| entry.map_err(Error::from))
        .collect()
}

type RowsAffected = usize;

/// Delete one of the user's ledger entries.
///
/// Returns the number of rows deleted, zero if the entry does not exist or
/// belongs to another user.
///
/// # Errors
///
/// Returns [Error::DeleteTransferTransaction] if the entry was written by a
/// transfer, the two halves of a transfer cannot be removed separately.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    let is_transfer: Option<bool> = connection
        .query_row(
            "SELECT is_transfer FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
            (id, user_id.as_i64()),
            |row| row.get(0),
        )
        .optional()?;

    match is_transfer {
        None => Ok(0),
        Some(true) => Err(Error::DeleteTransferTransaction),
        Some(false) => connection
            .execute(
                "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
                (id, user_id.as_i64()),
            )
            .map_err(Error::from),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        Error,
        period::DateRange,
        test_utils::{create_test_account, create_test_category, get_test_connection},
    };

    use super::{
        MAX_TRANSACTIONS, NewTransaction, TransactionFilter, TransactionKind, delete_transaction,
        get_all_transactions, get_transactions, insert_transaction, normalize_note,
    };

    fn new_expense(account_id: i64, date: time::Date) -> NewTransaction {
        NewTransaction {
            kind: TransactionKind::Expense,
            amount: dec!(12.50),
            currency: "PEN".to_owned(),
            date,
            note: Some("lunch".to_owned()),
            account_id,
            category_id: None,
            is_transfer: false,
        }
    }

    fn march(include_transfers: bool) -> TransactionFilter {
        TransactionFilter {
            range: DateRange {
                start: date!(2025 - 03 - 01),
                end: date!(2025 - 03 - 31),
            },
            include_transfers,
        }
    }

    #[test]
    fn note_is_trimmed_and_empty_becomes_none() {
        assert_eq!(normalize_note("  rent  "), Some("rent".to_owned()));
        assert_eq!(normalize_note("   "), None);
    }

    #[test]
    fn inserted_transaction_is_listed_with_names() {
        let (conn, user) = get_test_connection();
        let account = create_test_account(user.id, "Wallet", "PEN", &conn);
        let category = create_test_category(user.id, "Food", TransactionKind::Expense, &conn);
        let mut transaction = new_expense(account.id, date!(2025 - 03 - 10));
        transaction.category_id = Some(category.id);

        let id = insert_transaction(user.id, &transaction, &conn).unwrap();
        let got = get_transactions(user.id, &march(false), &conn).unwrap();

        assert_eq!(got.len(), 1);
        assert_eq!(got[0].id, id);
        assert_eq!(got[0].amount, dec!(12.50));
        assert_eq!(got[0].account_name, "Wallet");
        assert_eq!(got[0].category_name.as_deref(), Some("Food"));
        assert_eq!(got[0].note.as_deref(), Some("lunch"));
    }

    #[test]
    fn listing_is_newest_first_and_bounded_by_range() {
        let (conn, user) = get_test_connection();
        let account = create_test_account(user.id, "Wallet", "PEN", &conn);
        for date in [
            date!(2025 - 02 - 28),
            date!(2025 - 03 - 01),
            date!(2025 - 03 - 31),
            date!(2025 - 03 - 15),
            date!(2025 - 04 - 01),
        ] {
            insert_transaction(user.id, &new_expense(account.id, date), &conn).unwrap();
        }

        let dates = get_transactions(user.id, &march(false), &conn)
            .unwrap()
            .into_iter()
            .map(|transaction| transaction.date)
            .collect::<Vec<_>>();

        assert_eq!(
            dates,
            vec![
                date!(2025 - 03 - 31),
                date!(2025 - 03 - 15),
                date!(2025 - 03 - 01)
            ]
        );
    }

    #[test]
    fn same_day_entries_are_ordered_by_id_descending() {
        let (conn, user) = get_test_connection();
        let account = create_test_account(user.id, "Wallet", "PEN", &conn);
        let first = insert_transaction(
            user.id,
            &new_expense(account.id, date!(2025 - 03 - 05)),
            &conn,
        )
        .unwrap();
        let second = insert_transaction(
            user.id,
            &new_expense(account.id, date!(2025 - 03 - 05)),
            &conn,
        )
        .unwrap();

        let ids = get_transactions(user.id, &march(false), &conn)
            .unwrap()
            .into_iter()
            .map(|transaction| transaction.id)
            .collect::<Vec<_>>();

        assert_eq!(ids, vec![second, first]);
    }

    #[test]
    fn transfers_are_hidden_unless_requested() {
        let (conn, user) = get_test_connection();
        let account = create_test_account(user.id, "Wallet", "PEN", &conn);
        insert_transaction(
            user.id,
            &new_expense(account.id, date!(2025 - 03 - 05)),
            &conn,
        )
        .unwrap();
        let mut transfer_half = new_expense(account.id, date!(2025 - 03 - 06));
        transfer_half.is_transfer = true;
        insert_transaction(user.id, &transfer_half, &conn).unwrap();

        assert_eq!(get_transactions(user.id, &march(false), &conn).unwrap().len(), 1);
        assert_eq!(get_transactions(user.id, &march(true), &conn).unwrap().len(), 2);
    }

    #[test]
    fn listing_is_capped() {
        let (conn, user) = get_test_connection();
        let account = create_test_account(user.id, "Wallet", "PEN", &conn);
        for _ in 0..MAX_TRANSACTIONS + 5 {
            insert_transaction(
                user.id,
                &new_expense(account.id, date!(2025 - 03 - 05)),
                &conn,
            )
            .unwrap();
        }

        let got = get_transactions(user.id, &march(false), &conn).unwrap();

        assert_eq!(got.len(), MAX_TRANSACTIONS as usize);
        assert_eq!(
            get_all_transactions(user.id, &march(false), &conn)
                .unwrap()
                .len(),
            MAX_TRANSACTIONS as usize + 5
        );
    }

    #[test]
    fn other_users_entries_are_not_listed() {
        let (conn, user) = get_test_connection();
        let other = crate::auth::get_or_create_user("other@example.com", &conn).unwrap();
        let account = create_test_account(other.id, "Theirs", "PEN", &conn);
        insert_transaction(
            other.id,
            &new_expense(account.id, date!(2025 - 03 - 05)),
            &conn,
        )
        .unwrap();

        assert!(get_transactions(user.id, &march(true), &conn).unwrap().is_empty());
    }

    #[test]
    fn delete_removes_entry() {
        let (conn, user) = get_test_connection();
        let account = create_test_account(user.id, "Wallet", "PEN", &conn);
        let id = insert_transaction(
            user.id,
            &new_expense(account.id, date!(2025 - 03 - 05)),
            &conn,
        )
        .unwrap();

        assert_eq!(delete_transaction(id, user.id, &conn), Ok(1));
        assert_eq!(delete_transaction(id, user.id, &conn), Ok(0));
    }

    #[test]
    fn delete_refuses_transfer_entries() {
        let (conn, user) = get_test_connection();
        let account = create_test_account(user.id, "Wallet", "PEN", &conn);
        let mut transfer_half = new_expense(account.id, date!(2025 - 03 - 06));
        transfer_half.is_transfer = true;
        let id = insert_transaction(user.id, &transfer_half, &conn).unwrap();

        assert_eq!(
            delete_transaction(id, user.id, &conn),
            Err(Error::DeleteTransferTransaction)
        );
    }

    #[test]
    fn delete_ignores_other_users_entries() {
        let (conn, user) = get_test_connection();
        let other = crate::auth::get_or_create_user("other@example.com", &conn).unwrap();
        let account = create_test_account(other.id, "Theirs", "PEN", &conn);
        let id = insert_transaction(
            other.id,
            &new_expense(account.id, date!(2025 - 03 - 05)),
            &conn,
        )
        .unwrap();

        assert_eq!(delete_transaction(id, user.id, &conn), Ok(0));
    }
}
