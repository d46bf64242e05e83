mod accounts_page;
mod core;
mod create_endpoint;
mod delete_endpoint;

pub use accounts_page::get_accounts_page;
pub use core::{
    Account, AccountId, NewAccount, create_account, create_account_table, get_account,
    get_accounts,
};
pub use create_endpoint::create_account_endpoint;
pub use delete_endpoint::delete_account_endpoint;
