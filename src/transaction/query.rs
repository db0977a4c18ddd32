//! Filtering for the transaction listing and the reports.

use rusqlite::{Connection, params_from_iter, types::Value};
use serde::{Deserialize, Serialize};
use time::{Date, macros::format_description};

use crate::{Error, UserID};

use super::core::{Transaction, map_transaction_row};

/// Whether a transaction earned or spent money.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    /// Positive amounts.
    Income,
    /// Negative amounts.
    Expense,
}

impl TransactionKind {
    fn parse(text: &str) -> Result<Self, Error> {
        match text.trim().to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(Error::InvalidInput(format!(
                "kind must be \"income\" or \"expense\", got \"{other}\""
            ))),
        }
    }
}

/// The raw query string for filtering transactions.
///
/// Every field is kept as text so that a bad value produces a JSON error rather than
/// the extractor's plain text rejection. Blank values are treated as absent.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TransactionQuery {
    /// Only include transactions with this category, ignoring case.
    pub category: Option<String>,
    /// Only include transactions on or after this date (YYYY-MM-DD).
    pub start_date: Option<String>,
    /// Only include transactions on or before this date (YYYY-MM-DD).
    pub end_date: Option<String>,
    /// Either "income" or "expense".
    pub kind: Option<String>,
    /// Only include transactions whose description contains this text, ignoring case.
    pub search: Option<String>,
}

/// A validated [TransactionQuery].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TransactionFilter {
    /// Only include transactions with this category, ignoring case.
    pub category: Option<String>,
    /// Inclusive lower bound on the transaction date.
    pub start_date: Option<Date>,
    /// Inclusive upper bound on the transaction date.
    pub end_date: Option<Date>,
    /// Only include income or only include expenses.
    pub kind: Option<TransactionKind>,
    /// Only include transactions whose description contains this text, ignoring case.
    pub search: Option<String>,
}

impl TryFrom<TransactionQuery> for TransactionFilter {
    type Error = Error;

    fn try_from(query: TransactionQuery) -> Result<Self, Self::Error> {
        let start_date = non_blank(query.start_date)
            .map(|text| parse_date(&text, "start_date"))
            .transpose()?;
        let end_date = non_blank(query.end_date)
            .map(|text| parse_date(&text, "end_date"))
            .transpose()?;
        let kind = non_blank(query.kind)
            .map(|text| TransactionKind::parse(&text))
            .transpose()?;

        Ok(Self {
            category: non_blank(query.category),
            start_date,
            end_date,
            kind,
            search: non_blank(query.search),
        })
    }
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

fn parse_date(text: &str, field: &str) -> Result<Date, Error> {
    Date::parse(text, format_description!("[year]-[month]-[day]")).map_err(|error| {
        Error::InvalidInput(format!(
            "{field} must be a date in the format YYYY-MM-DD, got \"{text}\": {error}"
        ))
    })
}

/// Escape the wildcards in `text` for use in a `LIKE ... ESCAPE '\'` pattern.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for character in text.chars() {
        if matches!(character, '%' | '_' | '\\') {
            escaped.push('\\');
        }

        escaped.push(character);
    }

    escaped
}

/// Get the user's transactions that match `filter`, sorted by date and then ID.
///
/// Category and description comparisons ignore ASCII case.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn query_transactions(
    filter: &TransactionFilter,
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut where_clauses = vec!["user_id = ?".to_owned()];
    let mut query_parameters = vec![Value::Integer(user_id.as_i64())];

    if let Some(ref category) = filter.category {
        where_clauses.push("category = ? COLLATE NOCASE".to_owned());
        query_parameters.push(Value::Text(category.clone()));
    }

    if let Some(start_date) = filter.start_date {
        where_clauses.push("date >= ?".to_owned());
        query_parameters.push(Value::Text(start_date.to_string()));
    }

    if let Some(end_date) = filter.end_date {
        where_clauses.push("date <= ?".to_owned());
        query_parameters.push(Value::Text(end_date.to_string()));
    }

    match filter.kind {
        Some(TransactionKind::Income) => where_clauses.push("amount > 0".to_owned()),
        Some(TransactionKind::Expense) => where_clauses.push("amount < 0".to_owned()),
        None => {}
    }

    if let Some(ref search) = filter.search {
        where_clauses.push("description LIKE ? ESCAPE '\\'".to_owned());
        query_parameters.push(Value::Text(format!("%{}%", escape_like(search))));
    }

    // Sort by date, and then ID to keep transaction order stable after updates
    let query = format!(
        "SELECT id, date, description, amount, category FROM \"transaction\" \
        WHERE {} \
        ORDER BY date ASC, id ASC",
        where_clauses.join(" AND ")
    );

    connection
        .prepare(&query)?
        .query_map(params_from_iter(query_parameters), map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect()
}
