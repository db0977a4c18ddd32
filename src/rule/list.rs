use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use crate::{
    Error, UserID,
    app_state::DbState,
    category::categorize,
    rule::{db::get_all_rules, models::Rule},
};

/// Route handler for listing the user's rules in the order they are applied.
pub async fn get_rules_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<Rule>>, Error> {
    let connection = state.lock()?;

    let rules = get_all_rules(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve rules: {error}"))?;

    Ok(Json(rules))
}

/// The query for previewing the category of a description.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategorizeQuery {
    /// The transaction description to categorize.
    #[serde(default)]
    pub description: String,
}

/// The category the engine picked for a description.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategorizeResponse {
    /// The category the description would be given.
    pub category: String,
}

/// Route handler that reports which category a description would be given with the user's
/// current rules, without storing anything.
pub async fn categorize_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<CategorizeQuery>,
) -> Result<Json<CategorizeResponse>, Error> {
    let rules = {
        let connection = state.lock()?;
        get_all_rules(user_id, &connection)?
    };

    Ok(Json(CategorizeResponse {
        category: categorize(&query.description, &rules),
    }))
}
