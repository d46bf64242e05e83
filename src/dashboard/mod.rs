//! Dashboard module
//!
//! Provides an overview page with income and expense totals per currency, the
//! top expense categories, account balances and charts for a chosen period.

mod aggregation;
mod charts;
mod entry;
mod handlers;
mod tables;

pub use handlers::get_dashboard_page;
