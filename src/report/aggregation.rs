//! Aggregates transactions into totals.
//!
//! Income is any positive amount and an expense is any negative amount. Zero amounts are
//! neither.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::transaction::Transaction;

/// Totals of income and expenses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// The sum of all positive amounts.
    pub total_income: f64,
    /// The sum of all negative amounts, zero or negative.
    pub total_expenses: f64,
    /// Income plus expenses.
    pub net_balance: f64,
}

/// The sum of the amounts of all transactions in a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    /// The category name.
    pub category: String,
    /// The sum of the amounts in the category.
    pub total: f64,
}

/// The net amount for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    /// The month formatted as YYYY-MM.
    pub month: String,
    /// The sum of the amounts in the month.
    pub total: f64,
}

/// Monthly net totals split by sign.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTrends {
    /// Months that earned more than they spent, oldest first.
    pub income_trends: Vec<MonthlyTotal>,
    /// Months that spent more than they earned, oldest first.
    pub expense_trends: Vec<MonthlyTotal>,
}

/// Calculate the total income, total expenses and net balance of `transactions`.
pub fn summarize(transactions: &[Transaction]) -> Summary {
    let mut total_income = 0.0;
    let mut total_expenses = 0.0;

    for transaction in transactions {
        if transaction.amount > 0.0 {
            total_income += transaction.amount;
        } else if transaction.amount < 0.0 {
            total_expenses += transaction.amount;
        }
    }

    Summary {
        total_income,
        total_expenses,
        net_balance: total_income + total_expenses,
    }
}

/// Sum the amounts of `transactions` per category, sorted by category name.
pub fn category_breakdown(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();

    for transaction in transactions {
        *totals.entry(transaction.category.as_str()).or_insert(0.0) += transaction.amount;
    }

    totals
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_owned(),
            total,
        })
        .collect()
}

/// Sum the amounts of `transactions` per calendar month and split the months by the sign of
/// their total.
pub fn monthly_trends(transactions: &[Transaction]) -> MonthlyTrends {
    let monthly_totals = aggregate_by_month(transactions);

    let mut sorted_months: Vec<(i32, u8)> = monthly_totals.keys().copied().collect();
    sorted_months.sort();

    let mut trends = MonthlyTrends::default();

    for (year, month) in sorted_months {
        let total = monthly_totals[&(year, month)];
        let entry = MonthlyTotal {
            month: format!("{year:04}-{month:02}"),
            total,
        };

        if total > 0.0 {
            trends.income_trends.push(entry);
        } else if total < 0.0 {
            trends.expense_trends.push(entry);
        }
    }

    trends
}

/// Aggregates transaction amounts by (year, month).
fn aggregate_by_month(transactions: &[Transaction]) -> HashMap<(i32, u8), f64> {
    let mut totals = HashMap::new();

    for transaction in transactions {
        let month = (transaction.date.year(), u8::from(transaction.date.month()));
        *totals.entry(month).or_insert(0.0) += transaction.amount;
    }

    totals
}

#[cfg(test)]
mod tests {
    use time::{Date, macros::date};

    use crate::transaction::Transaction;

    use super::{
        CategoryTotal, MonthlyTotal, MonthlyTrends, Summary, category_breakdown, monthly_trends,
        summarize,
    };

    fn transaction(amount: f64, date: Date, category: &str) -> Transaction {
        Transaction {
            id: 0,
            date,
            description: String::new(),
            amount,
            category: category.to_owned(),
        }
    }

    #[test]
    fn summary_splits_by_sign() {
        let transactions = [
            transaction(100.0, date!(2024 - 01 - 01), "income"),
            transaction(-40.0, date!(2024 - 01 - 02), "food"),
            transaction(-10.0, date!(2024 - 01 - 03), "food"),
            transaction(0.0, date!(2024 - 01 - 04), "uncategorized"),
        ];

        let summary = summarize(&transactions);

        assert_eq!(
            summary,
            Summary {
                total_income: 100.0,
                total_expenses: -50.0,
                net_balance: 50.0,
            }
        );
    }

    #[test]
    fn summary_of_nothing_is_zero() {
        assert_eq!(
            summarize(&[]),
            Summary {
                total_income: 0.0,
                total_expenses: 0.0,
                net_balance: 0.0,
            }
        );
    }

    #[test]
    fn breakdown_sums_per_category_sorted_by_name() {
        let transactions = [
            transaction(-40.0, date!(2024 - 01 - 02), "food"),
            transaction(2500.0, date!(2024 - 01 - 01), "income"),
            transaction(-10.0, date!(2024 - 01 - 03), "food"),
            transaction(-12.5, date!(2024 - 01 - 05), "entertainment"),
            transaction(7.5, date!(2024 - 01 - 06), "entertainment"),
        ];

        let breakdown = category_breakdown(&transactions);

        assert_eq!(
            breakdown,
            vec![
                CategoryTotal {
                    category: "entertainment".to_owned(),
                    total: -5.0,
                },
                CategoryTotal {
                    category: "food".to_owned(),
                    total: -50.0,
                },
                CategoryTotal {
                    category: "income".to_owned(),
                    total: 2500.0,
                },
            ]
        );
    }

    #[test]
    fn breakdown_of_nothing_is_empty() {
        assert_eq!(category_breakdown(&[]), vec![]);
    }

    #[test]
    fn monthly_trends_split_months_by_net_total() {
        let transactions = [
            transaction(5.0, date!(2024 - 02 - 10), "misc"),
            transaction(50.0, date!(2024 - 01 - 03), "misc"),
            transaction(-80.0, date!(2024 - 01 - 20), "misc"),
        ];

        let trends = monthly_trends(&transactions);

        assert_eq!(
            trends,
            MonthlyTrends {
                income_trends: vec![MonthlyTotal {
                    month: "2024-02".to_owned(),
                    total: 5.0,
                }],
                expense_trends: vec![MonthlyTotal {
                    month: "2024-01".to_owned(),
                    total: -30.0,
                }],
            }
        );
    }

    #[test]
    fn monthly_trends_are_chronological_across_years() {
        let transactions = [
            transaction(1.0, date!(2025 - 01 - 01), "misc"),
            transaction(2.0, date!(2024 - 12 - 31), "misc"),
            transaction(3.0, date!(2024 - 03 - 15), "misc"),
            transaction(-4.0, date!(2024 - 06 - 01), "misc"),
            transaction(4.0, date!(2024 - 06 - 30), "misc"),
        ];

        let trends = monthly_trends(&transactions);

        let months: Vec<_> = trends
            .income_trends
            .iter()
            .map(|entry| entry.month.as_str())
            .collect();
        assert_eq!(months, ["2024-03", "2024-12", "2025-01"]);
        assert!(trends.expense_trends.is_empty());
    }
}
