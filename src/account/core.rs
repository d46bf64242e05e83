//! Accounts and the queries used to read them.

use rusqlite::{Connection, Row};
use rust_decimal::Decimal;

use crate::{
    Error,
    auth::UserID,
    database_id::DatabaseId,
    money::{get_decimal, parse_amount, parse_currency_code},
};

pub type AccountId = DatabaseId;

/// A place money is kept, e.g. a bank account or a wallet.
///
/// The current balance is never stored, see [crate::balance].
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    /// Three letter currency code, e.g. "PEN".
    pub currency: String,
    /// The balance before any ledger entries. May be negative, e.g. for credit cards.
    pub starting_balance: Decimal,
}

/// A validated account that is ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub name: String,
    pub currency: String,
    pub starting_balance: Decimal,
}

impl NewAccount {
    /// Validate the raw values entered by the user.
    ///
    /// # Errors
    ///
    /// - [Error::EmptyAccountName] if the name is blank.
    /// - [Error::InvalidCurrency] if the currency is not a three letter code.
    /// - [Error::InvalidAmount] if the starting balance is not a number.
    pub fn parse(name: &str, currency: &str, starting_balance: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            return Err(Error::EmptyAccountName);
        }

        Ok(Self {
            name: name.to_owned(),
            currency: parse_currency_code(currency)?,
            starting_balance: parse_amount(starting_balance)?,
        })
    }
}

pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            currency TEXT NOT NULL,
            starting_balance TEXT NOT NULL,
            UNIQUE(user_id, name)
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_account(row: &Row) -> Result<Account, rusqlite::Error> {
    Ok(Account {
        id: row.get(0)?,
        name: row.get(1)?,
        currency: row.get(2)?,
        starting_balance: get_decimal(row, 3)?,
    })
}

/// Insert `account` for `user_id`.
///
/// # Errors
///
/// Returns [Error::DuplicateAccountName] if the user already has an account with the same name.
pub fn create_account(
    user_id: UserID,
    account: &NewAccount,
    connection: &Connection,
) -> Result<Account, Error> {
    connection
        .execute(
            "INSERT INTO account (user_id, name, currency, starting_balance)
            VALUES (?1, ?2, ?3, ?4)",
            (
                user_id.as_i64(),
                &account.name,
                &account.currency,
                account.starting_balance.to_string(),
            ),
        )
        .map_err(|error| match error {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(error, Some(_)) if error.extended_code == 2067 => {
                Error::DuplicateAccountName(account.name.clone())
            }
            error => error.into(),
        })?;

    Ok(Account {
        id: connection.last_insert_rowid(),
        name: account.name.clone(),
        currency: account.currency.clone(),
        starting_balance: account.starting_balance,
    })
}

/// All of the user's accounts, ordered by name.
pub fn get_accounts(user_id: UserID, connection: &Connection) -> Result<Vec<Account>, Error> {
    connection
        .prepare(
            "SELECT id, name, currency, starting_balance FROM account
            WHERE user_id = ?1 ORDER BY name ASC",
        )?
        .query_map([user_id.as_i64()], map_row_to_account)?
        .map(|account| account.map_err(Error::from))
        .collect()
}

/// Get one of the user's accounts.
///
/// # Errors
///
/// Returns [Error::NotFound] if the account does not exist or belongs to someone else.
pub fn get_account(
    id: AccountId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Account, Error> {
    connection
        .query_row(
            "SELECT id, name, currency, starting_balance FROM account
            WHERE id = ?1 AND user_id = ?2",
            (id, user_id.as_i64()),
            map_row_to_account,
        )
        .map_err(Error::from)
}
