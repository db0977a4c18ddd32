//! Read-only reports over a user's transactions.
//!
//! Every report accepts the same filter as the transaction listing, so e.g. a summary can be
//! limited to a date range.

mod aggregation;

use axum::{
    Extension, Json,
    extract::{Query, State},
};

use crate::{
    Error, UserID,
    app_state::DbState,
    transaction::{Transaction, TransactionFilter, TransactionQuery, query_transactions},
};

pub use aggregation::{
    CategoryTotal, MonthlyTotal, MonthlyTrends, Summary, category_breakdown, monthly_trends,
    summarize,
};

fn get_filtered_transactions(
    state: &DbState,
    user_id: UserID,
    query: TransactionQuery,
) -> Result<Vec<Transaction>, Error> {
    let filter = TransactionFilter::try_from(query)?;
    let connection = state.lock()?;

    query_transactions(&filter, user_id, &connection)
        .inspect_err(|error| tracing::error!("could not query transactions for report: {error}"))
}

/// Route handler for the total income, total expenses and net balance.
pub async fn get_summary_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<Summary>, Error> {
    let transactions = get_filtered_transactions(&state, user_id, query)?;

    Ok(Json(summarize(&transactions)))
}

/// Route handler for the total per category.
pub async fn get_category_breakdown_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<Vec<CategoryTotal>>, Error> {
    let transactions = get_filtered_transactions(&state, user_id, query)?;

    Ok(Json(category_breakdown(&transactions)))
}

/// Route handler for the monthly income and expense trends.
pub async fn get_monthly_trends_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<MonthlyTrends>, Error> {
    let transactions = get_filtered_transactions(&state, user_id, query)?;

    Ok(Json(monthly_trends(&transactions)))
}
