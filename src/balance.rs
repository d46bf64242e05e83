//! Account balances derived from the ledger.
//!
//! Balances are never stored. Every read sums the account's ledger entries
//! again so a balance cannot drift from the entries it is made of.

use std::collections::HashMap;

use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::{
    Error,
    account::{Account, get_accounts},
    auth::UserID,
    money::{add_amounts, subtract_amounts},
    transaction::{TransactionKind, get_ledger_amounts},
};

/// An account with its current balance.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountBalance {
    pub account: Account,
    pub balance: Decimal,
}

/// The starting balance plus income minus expenses.
///
/// Transfer entries count like any other entry. No currency conversion
/// happens, every entry is assumed to be in the account's currency.
///
/// # Errors
///
/// Returns [Error::AmountOverflow] if the running balance leaves the range of [Decimal].
pub fn compute_balance<I>(starting_balance: Decimal, entries: I) -> Result<Decimal, Error>
where
    I: IntoIterator<Item = (TransactionKind, Decimal)>,
{
    entries
        .into_iter()
        .try_fold(starting_balance, |balance, (kind, amount)| match kind {
            TransactionKind::Income => add_amounts(balance, amount),
            TransactionKind::Expense => subtract_amounts(balance, amount),
        })
}

/// Every account of the user with its derived balance, ordered by account name.
pub fn get_account_balances(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<AccountBalance>, Error> {
    let accounts = get_accounts(user_id, connection)?;

    let mut entries_by_account: HashMap<_, Vec<_>> = HashMap::new();
    for (account_id, kind, amount) in get_ledger_amounts(user_id, connection)? {
        entries_by_account
            .entry(account_id)
            .or_default()
            .push((kind, amount));
    }

    accounts
        .into_iter()
        .map(|account| {
            let entries = entries_by_account.remove(&account.id).unwrap_or_default();
            let balance = compute_balance(account.starting_balance, entries)?;

            Ok(AccountBalance { account, balance })
        })
        .collect()
}


#[cfg(test)]
mod get_account_balances_tests {
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        test_utils::{create_test_account, get_test_connection},
        transaction::{NewTransaction, TransactionKind, insert_transaction},
    };

    use super::get_account_balances;

    #[test]
    fn includes_transfer_entries_and_accounts_without_entries() {
        let (conn, user) = get_test_connection();
        let wallet = create_test_account(user.id, "Wallet", "PEN", &conn);
        create_test_account(user.id, "Savings", "PEN", &conn);
        for (kind, amount, is_transfer) in [
            (TransactionKind::Income, dec!(500), false),
            (TransactionKind::Expense, dec!(120.50), false),
            (TransactionKind::Expense, dec!(100), true),
        ] {
            insert_transaction(
                user.id,
                &NewTransaction {
                    kind,
                    amount,
                    currency: "PEN".to_owned(),
                    date: date!(2025 - 03 - 01),
                    note: None,
                    account_id: wallet.id,
                    category_id: None,
                    is_transfer,
                },
                &conn,
            )
            .unwrap();
        }

        let balances = get_account_balances(user.id, &conn).unwrap();

        let summary = balances
            .iter()
            .map(|balance| (balance.account.name.as_str(), balance.balance))
            .collect::<Vec<_>>();
        assert_eq!(summary, vec![("Savings", dec!(0)), ("Wallet", dec!(279.50))]);
    }
}
