//! Defines the endpoint for creating a new transaction.

use axum::{Extension, Json, extract::State, http::StatusCode};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error, UserID,
    app_state::DbState,
    category::categorize,
    rule::get_all_rules,
    transaction::core::{
        Transaction, TransactionBuilder, create_transaction, explicit_category,
    },
};

/// The request body for creating or replacing a transaction.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionForm {
    /// When the transaction happened, formatted as YYYY-MM-DD.
    pub date: Date,
    /// Text detailing the transaction.
    pub description: String,
    /// The value of the transaction in dollars, negative for expenses.
    pub amount: f64,
    /// The category to use. If missing or blank, the user's rules pick one.
    #[serde(default)]
    pub category: Option<String>,
}

impl TransactionForm {
    /// Turn the form into a [TransactionBuilder], categorizing the description with the user's
    /// rules if no category was given.
    ///
    /// # Errors
    /// Returns [Error::SqlError] if the rules cannot be read.
    pub fn into_builder(
        self,
        user_id: UserID,
        connection: &Connection,
    ) -> Result<TransactionBuilder, Error> {
        let category = match explicit_category(self.category.as_deref()) {
            Some(category) => category.to_owned(),
            None => categorize(&self.description, &get_all_rules(user_id, connection)?),
        };

        Ok(Transaction::build(self.amount, self.date, &self.description).category(&category))
    }
}

/// A route handler for creating a new transaction, responds with the stored transaction.
pub async fn create_transaction_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    Json(form): Json<TransactionForm>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let connection = state.lock()?;

    let builder = form.into_builder(user_id, &connection)?;
    let transaction = create_transaction(builder, user_id, &connection)
        .inspect_err(|error| tracing::error!("could not create transaction: {error}"))?;

    Ok((StatusCode::CREATED, Json(transaction)))
}
