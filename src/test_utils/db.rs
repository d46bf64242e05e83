use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::{
    account::{Account, NewAccount, create_account},
    auth::{User, UserID, get_or_create_user},
    category::Category,
    db::initialize,
    transaction::TransactionKind,
};

/// An initialized in-memory database with one signed-up user.
pub(crate) fn get_test_connection() -> (Connection, User) {
    let connection = Connection::open_in_memory().expect("Could not open in-memory database");
    initialize(&connection).expect("Could not initialize database");
    let user = get_or_create_user("test@example.com", &connection).expect("Could not create user");

    (connection, user)
}

#[track_caller]
pub(crate) fn create_test_account(
    user_id: UserID,
    name: &str,
    currency: &str,
    connection: &Connection,
) -> Account {
    create_account(
        user_id,
        &NewAccount {
            name: name.to_owned(),
            currency: currency.to_owned(),
            starting_balance: Decimal::ZERO,
        },
        connection,
    )
    .expect("Could not create test account")
}

#[track_caller]
pub(crate) fn create_test_category(
    user_id: UserID,
    name: &str,
    kind: TransactionKind,
    connection: &Connection,
) -> Category {
    connection
        .execute(
            "INSERT INTO category (user_id, name, kind) VALUES (?1, ?2, ?3)",
            (user_id.as_i64(), name, kind),
        )
        .expect("Could not create test category");

    Category {
        id: connection.last_insert_rowid(),
        name: name.to_owned(),
        kind,
    }
}
