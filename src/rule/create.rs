use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};

use crate::{
    Error, UserID,
    app_state::DbState,
    rule::{
        db::create_rule,
        models::{Rule, RuleFormData},
    },
};

/// A route handler for creating a new rule.
pub async fn create_rule_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    Json(new_rule): Json<RuleFormData>,
) -> Result<(StatusCode, Json<Rule>), Error> {
    let connection = state.lock()?;

    let rule = create_rule(&new_rule.keyword, &new_rule.category, user_id, &connection)
        .inspect_err(|error| tracing::debug!("Could not create rule: {error}"))?;

    tracing::info!(
        "Created rule {} for user {user_id}: \"{}\" -> {}",
        rule.id,
        rule.keyword,
        rule.category
    );

    Ok((StatusCode::CREATED, Json(rule)))
}
