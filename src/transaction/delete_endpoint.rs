use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde_json::{Value, json};

use crate::{
    Error, UserID, app_state::DbState, database_id::TransactionId,
    transaction::core::delete_transaction,
};

/// A route handler for deleting a transaction.
pub async fn delete_transaction_endpoint(
    Path(transaction_id): Path<TransactionId>,
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Value>, Error> {
    let connection = state.lock()?;

    delete_transaction(transaction_id, user_id, &connection)?;

    Ok(Json(json!({ "message": "Transaction deleted successfully" })))
}
