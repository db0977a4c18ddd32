use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde_json::{Value, json};

use crate::{Error, UserID, app_state::DbState, database_id::RuleId, rule::db::delete_rule};

/// A route handler for deleting a rule.
pub async fn delete_rule_endpoint(
    Path(rule_id): Path<RuleId>,
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Value>, Error> {
    let connection = state.lock()?;

    delete_rule(rule_id, user_id, &connection).inspect_err(|error| match error {
        Error::NotFound => {}
        error => {
            tracing::error!("An unexpected error occurred while deleting rule {rule_id}: {error}")
        }
    })?;

    Ok(Json(json!({ "message": "Rule deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use axum::{Router, http::StatusCode, middleware, routing::delete};
    use axum_test::TestServer;

    use crate::{
        AppState,
        auth::auth_guard,
        endpoints::{self, format_endpoint},
        rule::{create_rule, delete_rule_endpoint, get_all_rules},
        test_utils::{bearer_token, get_test_state},
    };

    fn get_test_server(state: &AppState) -> TestServer {
        let app = Router::new()
            .route(endpoints::RULE, delete(delete_rule_endpoint))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard))
            .with_state(state.clone());

        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn deletes_rule() {
        let (state, user) = get_test_state();
        let server = get_test_server(&state);
        let rule =
            create_rule("uber", "transport", user.id, &state.db_connection.lock().unwrap()).unwrap();

        server
            .delete(&format_endpoint(endpoints::RULE, rule.id))
            .authorization_bearer(bearer_token(&user, &state))
            .await
            .assert_status_ok();

        assert!(
            get_all_rules(user.id, &state.db_connection.lock().unwrap())
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn missing_rule_is_not_found() {
        let (state, user) = get_test_state();
        let server = get_test_server(&state);

        server
            .delete(&format_endpoint(endpoints::RULE, 999))
            .authorization_bearer(bearer_token(&user, &state))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
