//! The categorization engine: maps a transaction description to a category.
//!
//! User rules are consulted first, in the order they were created, then the built-in
//! [DEFAULT_CATEGORIES] in declaration order. The first keyword found anywhere in the
//! description (ignoring case) decides the category.

use crate::rule::Rule;

/// The category given to descriptions that match no rule or default keyword.
pub const UNCATEGORIZED: &str = "uncategorized";

/// The built-in keywords for common categories, checked after user rules.
///
/// Order matters: the first category with a matching keyword wins.
pub const DEFAULT_CATEGORIES: &[(&str, &[&str])] = &[
    ("shopping", &["Amazon", "Walmart", "Target"]),
    ("income", &["Salary", "Bonus", "Freelance"]),
    ("transportation", &["Uber", "Lyft", "Gas"]),
    ("entertainment", &["Netflix", "Spotify", "Cinema"]),
    ("groceries", &["Whole Foods", "Trader Joe's", "Kroger"]),
];

/// Return the category for a transaction `description`.
///
/// `rules` are tried in slice order and the first rule whose keyword appears in the description
/// wins, even if a longer keyword further down would also match. If no rule matches, the
/// default categories are tried, and failing that [UNCATEGORIZED] is returned.
pub fn categorize(description: &str, rules: &[Rule]) -> String {
    let description = description.to_lowercase();

    let user_category = rules
        .iter()
        .find(|rule| contains_keyword(&description, &rule.keyword))
        .map(|rule| rule.category.clone());

    if let Some(category) = user_category {
        return category;
    }

    DEFAULT_CATEGORIES
        .iter()
        .find(|(_, keywords)| {
            keywords
                .iter()
                .any(|keyword| contains_keyword(&description, keyword))
        })
        .map(|(category, _)| (*category).to_owned())
        .unwrap_or_else(|| UNCATEGORIZED.to_owned())
}

/// Check whether `keyword` occurs in an already lowercased `description`, ignoring case.
#[inline]
fn contains_keyword(lowercase_description: &str, keyword: &str) -> bool {
    lowercase_description.contains(&keyword.to_lowercase())
}
