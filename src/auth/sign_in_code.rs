//! One-time codes carried by emailed sign-in links.
//!
//! Only a SHA-256 digest of each code is stored. A code can be redeemed once,
//! and only before it expires.

use rusqlite::{Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};

use crate::{Error, auth::UserID};

/// How long a sign-in link stays valid after it is sent.
pub const SIGN_IN_CODE_DURATION: Duration = Duration::minutes(15);

/// The result of redeeming a sign-in code.
#[derive(Debug, PartialEq)]
pub struct RedeemedCode {
    pub user_id: UserID,
    /// The page the user was trying to reach when they requested the link.
    pub redirect_url: Option<String>,
}

pub fn create_sign_in_code_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS sign_in_code (
            id INTEGER PRIMARY KEY,
            code_hash TEXT NOT NULL UNIQUE,
            user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            expires_at INTEGER NOT NULL,
            used_at INTEGER,
            redirect_url TEXT
        )",
        (),
    )?;

    Ok(())
}

fn hash_code(code: &str) -> String {
    format!("{:x}", Sha256::digest(code.as_bytes()))
}

/// Create a new sign-in code for `user_id` and return the plain code.
///
/// The plain code is never stored and must be sent to the user straight away.
pub fn create_sign_in_code(
    user_id: UserID,
    redirect_url: Option<&str>,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<String, Error> {
    let code = uuid::Uuid::new_v4().simple().to_string();
    let expires_at = now + SIGN_IN_CODE_DURATION;

    connection.execute(
        "INSERT INTO sign_in_code (code_hash, user_id, expires_at, redirect_url)
         VALUES (?1, ?2, ?3, ?4)",
        (
            hash_code(&code),
            user_id.as_i64(),
            expires_at.unix_timestamp(),
            redirect_url,
        ),
    )?;

    Ok(code)
}

/// Mark `code` as used and return who it belongs to.
///
/// # Errors
///
/// Returns [Error::InvalidSignInCode] if the code does not exist, has already
/// been used, or expired before `now`.
pub fn redeem_sign_in_code(
    code: &str,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<RedeemedCode, Error> {
    let now = now.unix_timestamp();

    connection
        .query_row(
            "UPDATE sign_in_code SET used_at = ?1
             WHERE code_hash = ?2 AND used_at IS NULL AND expires_at > ?1
             RETURNING user_id, redirect_url",
            (now, hash_code(code.trim())),
            |row| {
                Ok(RedeemedCode {
                    user_id: UserID::new(row.get(0)?),
                    redirect_url: row.get(1)?,
                })
            },
        )
        .optional()?
        .ok_or(Error::InvalidSignInCode)
}
