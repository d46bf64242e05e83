//! Income and expense categories.

use rusqlite::{Connection, Row};

use crate::{Error, auth::UserID, database_id::DatabaseId, transaction::TransactionKind};

pub type CategoryId = DatabaseId;

/// The categories every user starts with.
pub const DEFAULT_INCOME_CATEGORIES: [&str; 3] = ["Salary", "Extra income", "Transfers"];
pub const DEFAULT_EXPENSE_CATEGORIES: [&str; 10] = [
    "Food",
    "Transport",
    "Family",
    "Outings",
    "Rent",
    "Utilities",
    "Health",
    "Education",
    "Shopping",
    "Unexpected",
];

/// A label for grouping transactions of one kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub kind: TransactionKind,
}

pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
            UNIQUE(user_id, name, kind)
        )",
        (),
    )?;

    Ok(())
}

fn map_row_to_category(row: &Row) -> Result<Category, rusqlite::Error> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: row.get(2)?,
    })
}

/// The user's categories ordered by name, optionally only those of `kind`.
pub fn get_categories(
    user_id: UserID,
    kind: Option<TransactionKind>,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, name, kind FROM category
            WHERE user_id = ?1 AND (?2 IS NULL OR kind = ?2)
            ORDER BY name ASC",
        )?
        .query_map((user_id.as_i64(), kind), map_row_to_category)?
        .map(|category| category.map_err(Error::from))
        .collect()
}

/// Get one of the user's categories.
///
/// # Errors
///
/// Returns [Error::NotFound] if the category does not exist or belongs to someone else.
pub fn get_category(
    id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .query_row(
            "SELECT id, name, kind FROM category WHERE id = ?1 AND user_id = ?2",
            (id, user_id.as_i64()),
            map_row_to_category,
        )
        .map_err(Error::from)
}

/// Check that `id` is one of the user's categories of `kind`.
///
/// # Errors
///
/// Returns [Error::InvalidCategory] if it is not.
pub fn get_category_of_kind(
    id: CategoryId,
    kind: TransactionKind,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    match get_category(id, user_id, connection) {
        Ok(category) if category.kind == kind => Ok(category),
        Ok(_) | Err(Error::NotFound) => Err(Error::InvalidCategory),
        Err(error) => Err(error),
    }
}

/// Add the default categories the user does not have yet.
///
/// Seeding is idempotent. Returns how many categories were added.
pub fn seed_default_categories(user_id: UserID, connection: &Connection) -> Result<usize, Error> {
    let mut statement = connection.prepare(
        "INSERT INTO category (user_id, name, kind) VALUES (?1, ?2, ?3)
        ON CONFLICT(user_id, name, kind) DO NOTHING",
    )?;

    let defaults = DEFAULT_INCOME_CATEGORIES
        .iter()
        .map(|name| (*name, TransactionKind::Income))
        .chain(
            DEFAULT_EXPENSE_CATEGORIES
                .iter()
                .map(|name| (*name, TransactionKind::Expense)),
        );

    let mut inserted = 0;
    for (name, kind) in defaults {
        inserted += statement.execute((user_id.as_i64(), name, kind))?;
    }

    Ok(inserted)
}
