//! Table views for the dashboard figures.

use std::collections::BTreeMap;

use maud::{Markup, html};
use rust_decimal::Decimal;

use crate::{
    balance::AccountBalance,
    dashboard::aggregation::{CategorySpending, CurrencyTotals},
    html::{TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE},
    money::format_money,
};

const TABLE_STYLE: &str = "w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400";
const TABLE_AMOUNT_CELL_STYLE: &str = "px-6 py-4 text-right whitespace-nowrap";
const TABLE_ROW_HEADER_STYLE: &str =
    "px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white";
const AMOUNT_GREEN_STYLE: &str = "text-green-600 dark:text-green-400";
const AMOUNT_RED_STYLE: &str = "text-red-600 dark:text-red-400";

/// Gets the CSS class for coloring amounts (green for positive, red for negative).
fn amount_color_class(amount: Decimal) -> &'static str {
    if amount.is_sign_negative() && !amount.is_zero() {
        AMOUNT_RED_STYLE
    } else {
        AMOUNT_GREEN_STYLE
    }
}

fn empty_row(colspan: u8, message: &str) -> Markup {
    html! {
        tr
        {
            td
                colspan=(colspan)
                class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
            {
                (message)
            }
        }
    }
}

/// Income, expenses and net per currency.
pub(super) fn totals_table(totals: &BTreeMap<String, CurrencyTotals>) -> Markup {
    html! {
        section class="w-full overflow-x-auto dark:bg-gray-800"
        {
            h2 class="text-lg font-semibold mb-2" { "Totals" }

            table id="totals" class=(TABLE_STYLE)
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Currency" }
                        th scope="col" class="px-6 py-3 text-right" { "Income" }
                        th scope="col" class="px-6 py-3 text-right" { "Expenses" }
                        th scope="col" class="px-6 py-3 text-right" { "Net" }
                    }
                }

                tbody
                {
                    @for (currency, currency_totals) in totals {
                        @let net = currency_totals.net;

                        tr class=(TABLE_ROW_STYLE) data-currency=(currency)
                        {
                            th scope="row" class=(TABLE_ROW_HEADER_STYLE) { (currency) }
                            td class=(TABLE_AMOUNT_CELL_STYLE) data-income=(currency_totals.income.to_string())
                            {
                                (format_money(currency_totals.income, currency))
                            }
                            td class=(TABLE_AMOUNT_CELL_STYLE) data-expense=(currency_totals.expense.to_string())
                            {
                                (format_money(currency_totals.expense, currency))
                            }
                            td
                                class={ (TABLE_AMOUNT_CELL_STYLE) " " (amount_color_class(net)) }
                                data-net=(net.to_string())
                            {
                                (format_money(net, currency))
                            }
                        }
                    }

                    @if totals.is_empty() {
                        (empty_row(4, "No income or expenses in this period."))
                    }
                }
            }
        }
    }
}

/// The categories with the most spending.
pub(super) fn top_categories_table(categories: &[CategorySpending]) -> Markup {
    html! {
        section class="w-full overflow-x-auto dark:bg-gray-800"
        {
            h2 class="text-lg font-semibold mb-2" { "Top Expense Categories" }

            table id="top-categories" class=(TABLE_STYLE)
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class="px-6 py-3 text-right" { "Spent" }
                    }
                }

                tbody
                {
                    @for category in categories {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            th scope="row" class=(TABLE_ROW_HEADER_STYLE) { (category.name) }
                            td class=(TABLE_AMOUNT_CELL_STYLE)
                            {
                                (format_money(category.total, &category.currency))
                            }
                        }
                    }

                    @if categories.is_empty() {
                        (empty_row(2, "No expenses in this period."))
                    }
                }
            }
        }
    }
}

/// Every account with its current balance.
pub(super) fn balances_table(balances: &[AccountBalance]) -> Markup {
    html! {
        section class="w-full overflow-x-auto dark:bg-gray-800"
        {
            h2 class="text-lg font-semibold mb-2" { "Account Balances" }

            table id="balances" class=(TABLE_STYLE)
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Account" }
                        th scope="col" class="px-6 py-3 text-right" { "Balance" }
                    }
                }

                tbody
                {
                    @for account_balance in balances {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            th scope="row" class=(TABLE_ROW_HEADER_STYLE)
                            {
                                (account_balance.account.name)
                            }
                            td
                                class={ (TABLE_AMOUNT_CELL_STYLE) " " (amount_color_class(account_balance.balance)) }
                            {
                                (format_money(account_balance.balance, &account_balance.account.currency))
                            }
                        }
                    }

                    @if balances.is_empty() {
                        (empty_row(2, "No accounts yet."))
                    }
                }
            }
        }
    }
}
