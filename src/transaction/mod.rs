//! The transaction ledger.
//!
//! This module contains everything related to income and expense entries:
//! - The `Transaction` model and `NewTransaction` for creating entries
//! - Database functions for storing, querying, and deleting entries
//! - The transactions page, its endpoints, and the CSV export

mod core;
mod create_endpoint;
mod delete_endpoint;
mod export;
mod query;
mod transactions_page;

pub use core::{
    MAX_TRANSACTIONS, NewTransaction, Transaction, TransactionFilter, TransactionId,
    TransactionKind, create_transaction_table, get_ledger_amounts, get_transactions,
    insert_transaction, normalize_note,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use export::export_transactions_endpoint;
pub use transactions_page::get_transactions_page;

use core::{delete_transaction, get_all_transactions};
