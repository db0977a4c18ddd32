//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/rules/{rule_id}', use [format_endpoint].

/// The route for registering a new user.
pub const USERS: &str = "/api/users";
/// The route for logging in a user and getting an access token.
pub const LOG_IN: &str = "/api/log_in";
/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to get, update or delete a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to re-run categorization over uncategorized transactions.
pub const RECATEGORIZE: &str = "/api/recategorize";
/// The route to upload CSV or XLSX files for importing transactions.
pub const IMPORT: &str = "/api/import";
/// The route to list and create categorization rules.
pub const RULES: &str = "/api/rules";
/// The route to delete a rule.
pub const RULE: &str = "/api/rules/{rule_id}";
/// The route to preview the category for a description.
pub const CATEGORIZE: &str = "/api/categorize";
/// The route for the income/expense summary.
pub const SUMMARY: &str = "/api/reports/summary";
/// The route for the per-category totals.
pub const CATEGORY_BREAKDOWN: &str = "/api/reports/categories";
/// The route for the monthly income and expense trends.
pub const MONTHLY_TRENDS: &str = "/api/reports/monthly";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/rules/{rule_id}', '{rule_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let param_start = match endpoint_path.find('{') {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
