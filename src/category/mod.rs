mod core;
mod setup;

pub use core::{
    Category, CategoryId, DEFAULT_EXPENSE_CATEGORIES, DEFAULT_INCOME_CATEGORIES,
    create_category_table, get_categories, get_category_of_kind, seed_default_categories,
};
pub use setup::{get_setup_page, seed_categories_endpoint};
