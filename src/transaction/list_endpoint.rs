use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};

use crate::{
    Error, UserID,
    app_state::DbState,
    database_id::TransactionId,
    transaction::{
        core::{Transaction, get_transaction},
        query::{TransactionFilter, TransactionQuery, query_transactions},
    },
};

/// A route handler for listing the user's transactions, sorted by date.
///
/// The query string narrows the list, see [TransactionQuery].
pub async fn get_transactions_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let filter = TransactionFilter::try_from(query)?;
    let connection = state.lock()?;

    let transactions = query_transactions(&filter, user_id, &connection)
        .inspect_err(|error| tracing::error!("could not query transactions: {error}"))?;

    Ok(Json(transactions))
}

/// A route handler for getting a single transaction by its ID.
pub async fn get_transaction_endpoint(
    Path(transaction_id): Path<TransactionId>,
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Transaction>, Error> {
    let connection = state.lock()?;

    get_transaction(transaction_id, user_id, &connection).map(Json)
}
