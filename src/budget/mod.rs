//! Monthly budgets per expense category and their evaluation against the ledger.

mod budgets_page;
mod core;
mod evaluator;
mod upsert_endpoint;

pub use budgets_page::get_budgets_page;
pub use core::{
    Budget, BudgetInput, ExpenseEntry, create_budget_table, get_budgets, get_expenses,
    upsert_budget, validate_budget,
};
pub use evaluator::{BudgetStatus, ZeroBudgetPolicy, evaluate_budgets};
pub use upsert_endpoint::upsert_budget_endpoint;
