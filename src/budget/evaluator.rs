//! Spent versus limit per expense category for one month.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::{
    Error,
    budget::{Budget, ExpenseEntry},
    category::{Category, CategoryId},
    money::{add_amounts, subtract_amounts},
};

/// What a budget limit of zero means.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ZeroBudgetPolicy {
    /// A limit of zero is the same as having no budget and is never exceeded.
    #[default]
    Unset,
    /// A stored limit of zero is exceeded by any spending.
    NoSpending,
}

/// The budget state of one expense category.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetStatus {
    pub category: Category,
    /// Zero when no budget is stored for the month.
    pub limit: Decimal,
    pub currency: String,
    pub spent: Decimal,
    /// May be negative once the limit is overspent.
    pub remaining: Decimal,
    pub exceeded: bool,
    pub has_budget: bool,
}

/// Whether `spent` is over `limit`.
///
/// A positive limit is exceeded only when strictly overspent. A limit of zero
/// is never exceeded unless it was stored explicitly and `policy` is
/// [ZeroBudgetPolicy::NoSpending].
pub fn is_exceeded(
    limit: Decimal,
    spent: Decimal,
    has_budget: bool,
    policy: ZeroBudgetPolicy,
) -> bool {
    if limit > Decimal::ZERO {
        return spent > limit;
    }

    has_budget && policy == ZeroBudgetPolicy::NoSpending && spent > Decimal::ZERO
}

/// Evaluate every category in `categories` against its budget.
///
/// Spending only counts towards a category when it is in the budget's
/// currency, or `default_currency` for categories without a budget. The
/// result keeps the order of `categories`.
///
/// # Errors
///
/// Returns [Error::AmountOverflow] if a category's spending cannot be summed.
pub fn evaluate_budgets(
    categories: &[Category],
    budgets: &[Budget],
    expenses: &[ExpenseEntry],
    default_currency: &str,
    policy: ZeroBudgetPolicy,
) -> Result<Vec<BudgetStatus>, Error> {
    let budgets_by_category: HashMap<CategoryId, &Budget> = budgets
        .iter()
        .map(|budget| (budget.category_id, budget))
        .collect();

    let mut spent_by_category: HashMap<(CategoryId, &str), Decimal> = HashMap::new();
    for expense in expenses {
        let Some(category_id) = expense.category_id else {
            continue;
        };

        let spent = spent_by_category
            .entry((category_id, expense.currency.as_str()))
            .or_default();
        *spent = add_amounts(*spent, expense.amount)?;
    }

    categories
        .iter()
        .map(|category| {
            let budget = budgets_by_category.get(&category.id);
            let (limit, currency) = match budget {
                Some(budget) => (budget.limit, budget.currency.as_str()),
                None => (Decimal::ZERO, default_currency),
            };
            let spent = spent_by_category
                .get(&(category.id, currency))
                .copied()
                .unwrap_or_default();
            let has_budget = budget.is_some();

            Ok(BudgetStatus {
                category: category.clone(),
                limit,
                currency: currency.to_owned(),
                spent,
                remaining: subtract_amounts(limit, spent)?,
                exceeded: is_exceeded(limit, spent, has_budget, policy),
                has_budget,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use time::Month;

    use crate::{
        Error,
        budget::{Budget, ExpenseEntry},
        category::Category,
        transaction::TransactionKind,
    };

    use super::{ZeroBudgetPolicy, evaluate_budgets, is_exceeded};

    fn category(id: i64, name: &str) -> Category {
        Category {
            id,
            name: name.to_owned(),
            kind: TransactionKind::Expense,
        }
    }

    fn budget(category_id: i64, limit: rust_decimal::Decimal) -> Budget {
        Budget {
            id: category_id,
            category_id,
            month: Month::March,
            year: 2025,
            limit,
            currency: "PEN".to_owned(),
        }
    }

    fn expense(category_id: Option<i64>, amount: rust_decimal::Decimal, currency: &str) -> ExpenseEntry {
        ExpenseEntry {
            category_id,
            amount,
            currency: currency.to_owned(),
        }
    }

    #[test]
    fn exceeded_only_when_strictly_over_limit() {
        assert!(!is_exceeded(dec!(100.00), dec!(100.00), true, ZeroBudgetPolicy::Unset));
        assert!(is_exceeded(dec!(100.00), dec!(100.01), true, ZeroBudgetPolicy::Unset));
    }

    #[test]
    fn zero_limit_depends_on_policy() {
        assert!(!is_exceeded(dec!(0), dec!(5), true, ZeroBudgetPolicy::Unset));
        assert!(is_exceeded(dec!(0), dec!(5), true, ZeroBudgetPolicy::NoSpending));
        assert!(!is_exceeded(dec!(0), dec!(0), true, ZeroBudgetPolicy::NoSpending));
        assert!(!is_exceeded(dec!(0), dec!(5), false, ZeroBudgetPolicy::NoSpending));
    }

    #[test]
    fn spent_and_remaining_per_category() {
        let categories = [category(1, "Food"), category(2, "Rent"), category(3, "Fun")];
        let budgets = [budget(1, dec!(200)), budget(2, dec!(1000))];
        let expenses = [
            expense(Some(1), dec!(120.50), "PEN"),
            expense(Some(1), dec!(100), "PEN"),
            expense(Some(2), dec!(1000), "PEN"),
            expense(Some(3), dec!(30), "PEN"),
            expense(None, dec!(999), "PEN"),
        ];

        let statuses = evaluate_budgets(
            &categories,
            &budgets,
            &expenses,
            "PEN",
            ZeroBudgetPolicy::Unset,
        )
        .unwrap();

        assert_eq!(statuses.len(), 3);
        assert_eq!(statuses[0].spent, dec!(220.50));
        assert_eq!(statuses[0].remaining, dec!(-20.50));
        assert!(statuses[0].exceeded);
        assert_eq!(statuses[1].spent, dec!(1000));
        assert!(!statuses[1].exceeded);
        assert!(!statuses[2].has_budget);
        assert_eq!(statuses[2].limit, dec!(0));
        assert_eq!(statuses[2].remaining, dec!(-30));
        assert!(!statuses[2].exceeded);
    }

    #[test]
    fn other_currencies_do_not_count() {
        let categories = [category(1, "Food")];
        let budgets = [budget(1, dec!(50))];
        let expenses = [
            expense(Some(1), dec!(40), "PEN"),
            expense(Some(1), dec!(40), "USD"),
        ];

        let statuses = evaluate_budgets(
            &categories,
            &budgets,
            &expenses,
            "PEN",
            ZeroBudgetPolicy::Unset,
        )
        .unwrap();

        assert_eq!(statuses[0].spent, dec!(40));
        assert!(!statuses[0].exceeded);
    }

    #[test]
    fn overflowing_spending_is_an_error() {
        let categories = [category(1, "Food")];
        let budgets = [budget(1, dec!(50))];
        let expenses = [
            expense(Some(1), rust_decimal::Decimal::MAX, "PEN"),
            expense(Some(1), rust_decimal::Decimal::MAX, "PEN"),
        ];

        let result = evaluate_budgets(
            &categories,
            &budgets,
            &expenses,
            "PEN",
            ZeroBudgetPolicy::Unset,
        );

        assert_eq!(result, Err(Error::AmountOverflow));
    }
}
