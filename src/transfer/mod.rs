//! Transfers between the user's own accounts.

mod core;
mod create_endpoint;
mod transfers_page;

pub use core::{
    Transfer, TransferInput, create_transfer, create_transfer_table, get_transfers,
    validate_transfer,
};
pub use create_endpoint::create_transfer_endpoint;
pub use transfers_page::get_transfers_page;
