//! Moving money between two of the user's accounts.
//!
//! A transfer writes an expense on the source account, an income on the
//! destination account, and a record in the transfer history. The ledger
//! entries are flagged so reports can leave them out.

use rusqlite::{Connection, Row};
use rust_decimal::Decimal;
use time::Date;

use crate::{
    Error,
    account::{Account, get_account},
    auth::UserID,
    database_id::DatabaseId,
    money::{get_decimal, parse_positive_amount},
    transaction::{NewTransaction, TransactionKind, insert_transaction, normalize_note},
};

pub type TransferId = DatabaseId;

/// The most transfers shown in the history.
pub const MAX_TRANSFERS: u32 = 200;

/// A row of the transfer history joined with the account names.
#[derive(Debug, Clone, PartialEq)]
pub struct Transfer {
    pub id: TransferId,
    pub from_account_name: String,
    pub to_account_name: String,
    pub amount: Decimal,
    pub currency: String,
    pub date: Date,
    pub note: Option<String>,
}

/// A transfer that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransfer {
    pub from: Account,
    pub to: Account,
    pub amount: Decimal,
    pub date: Date,
    pub note: Option<String>,
}

/// The raw values entered in the transfer form.
#[derive(Debug, Clone, Copy)]
pub struct TransferInput<'a> {
    pub from_account_id: Option<DatabaseId>,
    pub to_account_id: Option<DatabaseId>,
    pub amount: &'a str,
    pub date: Date,
    pub note: &'a str,
}

pub fn create_transfer_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transfer (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            from_account_id INTEGER NOT NULL REFERENCES account(id) ON DELETE RESTRICT,
            to_account_id INTEGER NOT NULL REFERENCES account(id) ON DELETE RESTRICT,
            amount TEXT NOT NULL,
            currency TEXT NOT NULL,
            date TEXT NOT NULL,
            note TEXT
        )",
        (),
    )?;

    Ok(())
}

fn get_owned_account(id: DatabaseId, user_id: UserID, connection: &Connection) -> Result<Account, Error> {
    get_account(id, user_id, connection).map_err(|error| match error {
        Error::NotFound => Error::InvalidAccount,
        error => error,
    })
}

/// Check a transfer request against the user's accounts.
///
/// Checks run in this order: both accounts selected, different accounts,
/// positive amount, both owned by the user, same currency. Only the last two
/// read the database.
pub fn validate_transfer(
    input: TransferInput,
    user_id: UserID,
    connection: &Connection,
) -> Result<NewTransfer, Error> {
    let (Some(from_id), Some(to_id)) = (input.from_account_id, input.to_account_id) else {
        return Err(Error::TransferAccountsRequired);
    };

    if from_id == to_id {
        return Err(Error::SameTransferAccount);
    }

    let amount = parse_positive_amount(input.amount)?;

    let from = get_owned_account(from_id, user_id, connection)?;
    let to = get_owned_account(to_id, user_id, connection)?;

    if from.currency != to.currency {
        return Err(Error::TransferCurrencyMismatch {
            from: from.currency,
            to: to.currency,
        });
    }

    Ok(NewTransfer {
        from,
        to,
        amount,
        date: input.date,
        note: normalize_note(input.note),
    })
}

fn ledger_note(prefix: &str, note: Option<&str>) -> String {
    match note {
        Some(note) => format!("{prefix}: {note}"),
        None => prefix.to_owned(),
    }
}

/// Write both ledger entries and the history record of `transfer`.
///
/// All three rows are written in one database transaction, so either all of
/// them are stored or none are.
pub fn create_transfer(
    user_id: UserID,
    transfer: &NewTransfer,
    connection: &Connection,
) -> Result<TransferId, Error> {
    let tx = connection.unchecked_transaction()?;
    let note = transfer.note.as_deref();

    let outgoing = NewTransaction {
        kind: TransactionKind::Expense,
        amount: transfer.amount,
        currency: transfer.from.currency.clone(),
        date: transfer.date,
        note: Some(ledger_note(&format!("Transfer to {}", transfer.to.name), note)),
        account_id: transfer.from.id,
        category_id: None,
        is_transfer: true,
    };
    let incoming = NewTransaction {
        kind: TransactionKind::Income,
        account_id: transfer.to.id,
        note: Some(ledger_note(
            &format!("Transfer from {}", transfer.from.name),
            note,
        )),
        ..outgoing.clone()
    };

    insert_transaction(user_id, &outgoing, &tx)?;
    insert_transaction(user_id, &incoming, &tx)?;

    tx.execute(
        "INSERT INTO transfer (user_id, from_account_id, to_account_id, amount, currency, date, note)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        (
            user_id.as_i64(),
            transfer.from.id,
            transfer.to.id,
            transfer.amount.to_string(),
            &transfer.from.currency,
            transfer.date,
            &transfer.note,
        ),
    )?;
    let id = tx.last_insert_rowid();

    tx.commit()?;

    Ok(id)
}

fn map_row_to_transfer(row: &Row) -> Result<Transfer, rusqlite::Error> {
    Ok(Transfer {
        id: row.get(0)?,
        from_account_name: row.get(1)?,
        to_account_name: row.get(2)?,
        amount: get_decimal(row, 3)?,
        currency: row.get(4)?,
        date: row.get(5)?,
        note: row.get(6)?,
    })
}

/// The user's transfer history, newest first, at most [MAX_TRANSFERS] rows.
pub fn get_transfers(user_id: UserID, connection: &Connection) -> Result<Vec<Transfer>, Error> {
    connection
        .prepare(
            "SELECT transfer.id, source.name, destination.name, transfer.amount,
                transfer.currency, transfer.date, transfer.note
            FROM transfer
            INNER JOIN account source ON source.id = transfer.from_account_id
            INNER JOIN account destination ON destination.id = transfer.to_account_id
            WHERE transfer.user_id = ?1
            ORDER BY transfer.date DESC, transfer.id DESC
            LIMIT ?2",
        )?
        .query_map((user_id.as_i64(), MAX_TRANSFERS), map_row_to_transfer)?
        .map(|transfer| transfer.map_err(Error::from))
        .collect()
}
