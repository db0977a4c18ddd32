use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::{
    Error, UserID,
    app_state::DbState,
    database_id::TransactionId,
    transaction::{
        core::{Transaction, update_transaction},
        create_endpoint::TransactionForm,
    },
};

/// A route handler for replacing every field of a transaction.
///
/// A missing or blank category is filled in by the user's rules, the same as when creating
/// a transaction.
pub async fn edit_transaction_endpoint(
    Path(transaction_id): Path<TransactionId>,
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    Json(form): Json<TransactionForm>,
) -> Result<Json<Transaction>, Error> {
    let connection = state.lock()?;

    let builder = form.into_builder(user_id, &connection)?;
    let transaction = update_transaction(transaction_id, builder, user_id, &connection)?;

    Ok(Json(transaction))
}
