//! Code for creating the user table and finding users by email.

use std::fmt::Display;

use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::Error;

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application, identified by their email address.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserID,
    pub email: String,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                email TEXT NOT NULL UNIQUE
                )",
        (),
    )?;

    Ok(())
}

/// Normalize and validate a user-entered email address.
///
/// # Errors
///
/// Returns [Error::InvalidEmail] if `raw_email` is not a valid address.
pub fn parse_email(raw_email: &str) -> Result<String, Error> {
    let email = raw_email.trim().to_lowercase();

    if email_address::EmailAddress::is_valid(&email) {
        Ok(email)
    } else {
        Err(Error::InvalidEmail(raw_email.trim().to_owned()))
    }
}

/// Get the user with `email`, creating them on their first sign-in.
///
/// `email` should already be normalized with [parse_email].
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn get_or_create_user(email: &str, connection: &Connection) -> Result<User, Error> {
    connection.execute(
        "INSERT INTO user (email) VALUES (?1) ON CONFLICT(email) DO NOTHING",
        (email,),
    )?;

    connection
        .query_row(
            "SELECT id, email FROM user WHERE email = ?1",
            (email,),
            |row| {
                Ok(User {
                    id: UserID::new(row.get(0)?),
                    email: row.get(1)?,
                })
            },
        )
        .map_err(Error::from)
}

/// Get the user from the database with an ID equal to `user_id`, if any.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn find_user_by_id(user_id: UserID, connection: &Connection) -> Result<Option<User>, Error> {
    connection
        .query_row(
            "SELECT id, email FROM user WHERE id = :id",
            &[(":id", &user_id.as_i64())],
            |row| {
                Ok(User {
                    id: UserID::new(row.get(0)?),
                    email: row.get(1)?,
                })
            },
        )
        .optional()
        .map_err(Error::from)
}
