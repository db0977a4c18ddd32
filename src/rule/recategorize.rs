use axum::{Extension, Json, extract::State};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    Error, UserID,
    app_state::DbState,
    category::{UNCATEGORIZED, categorize},
    database_id::TransactionId,
    rule::db::get_all_rules,
};

/// Result of re-running categorization over uncategorized transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecategorizeResult {
    /// Number of uncategorized transactions that were checked.
    pub processed: usize,
    /// Number of transactions that were given a category.
    pub recategorized: usize,
}

/// A route handler for categorizing the user's uncategorized transactions with their current
/// rules, e.g. after adding a new rule.
pub async fn recategorize_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<RecategorizeResult>, Error> {
    let start_time = std::time::Instant::now();
    let connection = state.lock()?;

    let result = recategorize_uncategorized(user_id, &connection).inspect_err(|error| {
        tracing::error!(
            "Failed to recategorize transactions after {}ms: {error}",
            start_time.elapsed().as_millis()
        )
    })?;

    tracing::info!(
        "Recategorizing completed in {}ms: {} transactions processed, {} recategorized",
        start_time.elapsed().as_millis(),
        result.processed,
        result.recategorized
    );

    Ok(Json(result))
}

/// Run the categorization engine over every transaction of `user_id` that is uncategorized and
/// store the new categories.
///
/// All updates are made in one SQL transaction, so either every new category is stored or
/// none are.
///
/// # Errors
/// Returns [Error::SqlError] if there are database errors during the operation.
pub fn recategorize_uncategorized(
    user_id: UserID,
    connection: &Connection,
) -> Result<RecategorizeResult, Error> {
    let sql_transaction = connection.unchecked_transaction()?;

    let transactions = get_uncategorized_transactions(user_id, &sql_transaction)?;
    if transactions.is_empty() {
        return Ok(RecategorizeResult {
            processed: 0,
            recategorized: 0,
        });
    }

    let rules = get_all_rules(user_id, &sql_transaction)?;

    let updates: Vec<(TransactionId, String)> = transactions
        .iter()
        .filter_map(|(id, description)| {
            let category = categorize(description, &rules);
            (category != UNCATEGORIZED).then_some((*id, category))
        })
        .collect();

    batch_set_categories(&updates, &sql_transaction)?;
    sql_transaction.commit()?;

    Ok(RecategorizeResult {
        processed: transactions.len(),
        recategorized: updates.len(),
    })
}

fn get_uncategorized_transactions(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<(TransactionId, String)>, Error> {
    connection
        .prepare(
            "SELECT id, description FROM \"transaction\" WHERE user_id = ?1 AND category = ?2",
        )?
        .query_map((user_id.as_i64(), UNCATEGORIZED), |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}

/// Set the category of each transaction in `updates`.
///
/// **Note**: If you want transactional integrity (all or nothing), pass in a
/// transaction for `connection`.
fn batch_set_categories(
    updates: &[(TransactionId, String)],
    connection: &Connection,
) -> Result<(), Error> {
    if updates.is_empty() {
        return Ok(());
    }

    let mut statement =
        connection.prepare("UPDATE \"transaction\" SET category = ?1 WHERE id = ?2")?;

    for (transaction_id, category) in updates {
        statement.execute((category, transaction_id))?;
    }

    Ok(())
}
