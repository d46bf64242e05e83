//! Monthly spending limits per expense category.

use rusqlite::{Connection, Row};
use rust_decimal::Decimal;
use time::Month;

use crate::{
    Error,
    auth::UserID,
    category::{CategoryId, get_category_of_kind},
    database_id::DatabaseId,
    money::{get_decimal, parse_amount, parse_currency_code},
    period::{DateRange, month_from_number},
    transaction::TransactionKind,
};

pub type BudgetId = DatabaseId;

/// A stored limit for one category in one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    pub id: BudgetId,
    pub category_id: CategoryId,
    pub month: Month,
    pub year: i32,
    pub limit: Decimal,
    pub currency: String,
}

/// A validated budget ready to be upserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    pub category_id: CategoryId,
    pub month: Month,
    pub year: i32,
    pub limit: Decimal,
    pub currency: String,
}

/// The raw values entered in the budget form.
#[derive(Debug, Clone, Copy)]
pub struct BudgetInput<'a> {
    pub category_id: Option<CategoryId>,
    pub limit: &'a str,
    pub month: u8,
    pub year: i32,
    /// Falls back to the configured budget currency when empty.
    pub currency: Option<&'a str>,
}

/// One non-transfer expense, the input to budget evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseEntry {
    pub category_id: Option<CategoryId>,
    pub amount: Decimal,
    pub currency: String,
}

pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            category_id INTEGER NOT NULL REFERENCES category(id) ON DELETE CASCADE,
            month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
            year INTEGER NOT NULL,
            limit_amount TEXT NOT NULL,
            currency TEXT NOT NULL,
            UNIQUE(user_id, category_id, month, year)
        )",
        (),
    )?;

    Ok(())
}

/// Check the budget form against the user's categories.
///
/// # Errors
///
/// - [Error::CategoryRequired] if no category was selected.
/// - [Error::InvalidCategory] if the category is not one of the user's expense categories.
/// - [Error::InvalidAmount] or [Error::NegativeBudgetLimit] for a bad limit.
/// - [Error::InvalidMonth] for a month outside 1 to 12.
/// - [Error::InvalidCurrency] for a malformed currency code.
pub fn validate_budget(
    input: BudgetInput,
    default_currency: &str,
    user_id: UserID,
    connection: &Connection,
) -> Result<NewBudget, Error> {
    let category_id = input.category_id.ok_or(Error::CategoryRequired)?;
    let category =
        get_category_of_kind(category_id, TransactionKind::Expense, user_id, connection)?;

    let limit = parse_amount(input.limit)?;
    if limit < Decimal::ZERO {
        return Err(Error::NegativeBudgetLimit);
    }

    let month = month_from_number(input.month)?;

    let currency = match input.currency.map(str::trim) {
        None | Some("") => parse_currency_code(default_currency)?,
        Some(currency) => parse_currency_code(currency)?,
    };

    Ok(NewBudget {
        category_id: category.id,
        month,
        year: input.year,
        limit,
        currency,
    })
}

/// Insert `budget`, or replace the limit and currency of the existing budget
/// for the same category and month.
pub fn upsert_budget(
    user_id: UserID,
    budget: &NewBudget,
    connection: &Connection,
) -> Result<BudgetId, Error> {
    connection
        .query_row(
            "INSERT INTO budget (user_id, category_id, month, year, limit_amount, currency)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(user_id, category_id, month, year)
            DO UPDATE SET limit_amount = excluded.limit_amount, currency = excluded.currency
            RETURNING id",
            (
                user_id.as_i64(),
                budget.category_id,
                budget.month as u8,
                budget.year,
                budget.limit.to_string(),
                &budget.currency,
            ),
            |row| row.get(0),
        )
        .map_err(Error::from)
}

fn map_row_to_budget(row: &Row) -> Result<Budget, rusqlite::Error> {
    let month_number: u8 = row.get(2)?;
    let month = Month::try_from(month_number).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Integer, Box::new(error))
    })?;

    Ok(Budget {
        id: row.get(0)?,
        category_id: row.get(1)?,
        month,
        year: row.get(3)?,
        limit: get_decimal(row, 4)?,
        currency: row.get(5)?,
    })
}

/// The user's budgets for `month` of `year`.
pub fn get_budgets(
    user_id: UserID,
    year: i32,
    month: Month,
    connection: &Connection,
) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(
            "SELECT id, category_id, month, year, limit_amount, currency FROM budget
            WHERE user_id = ?1 AND year = ?2 AND month = ?3",
        )?
        .query_map((user_id.as_i64(), year, month as u8), map_row_to_budget)?
        .map(|budget| budget.map_err(Error::from))
        .collect()
}

/// The user's expenses in `range`, transfers excluded.
pub fn get_expenses(
    user_id: UserID,
    range: DateRange,
    connection: &Connection,
) -> Result<Vec<ExpenseEntry>, Error> {
    connection
        .prepare(
            "SELECT category_id, amount, currency FROM \"transaction\"
            WHERE user_id = ?1
                AND kind = 'expense'
                AND is_transfer = 0
                AND date BETWEEN ?2 AND ?3",
        )?
        .query_map((user_id.as_i64(), range.start, range.end), |row| {
            Ok(ExpenseEntry {
                category_id: row.get(0)?,
                amount: get_decimal(row, 1)?,
                currency: row.get(2)?,
            })
        })?
        .map(|entry| entry.map_err(Error::from))
        .collect()
}
