//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
};

use crate::{
    AppState, Error,
    auth::{auth_guard, post_log_in},
    endpoints,
    import::import_transactions_endpoint,
    register_user::register_user,
    report::{get_category_breakdown_endpoint, get_monthly_trends_endpoint, get_summary_endpoint},
    rule::{
        categorize_endpoint, create_rule_endpoint, delete_rule_endpoint, get_rules_endpoint,
        recategorize_endpoint,
    },
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
        get_transaction_endpoint, get_transactions_endpoint,
    },
};

/// The largest request body accepted, which limits the size of uploaded files.
pub const MAX_BODY_SIZE: usize = 16 * 1024 * 1024;

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::USERS, post(register_user))
        .route(endpoints::LOG_IN, post(post_log_in));

    let protected_routes = Router::new()
        .route(
            endpoints::TRANSACTIONS,
            get(get_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(edit_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .route(endpoints::RECATEGORIZE, post(recategorize_endpoint))
        .route(endpoints::IMPORT, post(import_transactions_endpoint))
        .route(
            endpoints::RULES,
            get(get_rules_endpoint).post(create_rule_endpoint),
        )
        .route(endpoints::RULE, delete(delete_rule_endpoint))
        .route(endpoints::CATEGORIZE, get(categorize_endpoint))
        .route(endpoints::SUMMARY, get(get_summary_endpoint))
        .route(
            endpoints::CATEGORY_BREAKDOWN,
            get(get_category_breakdown_endpoint),
        )
        .route(endpoints::MONTHLY_TRENDS, get(get_monthly_trends_endpoint))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .with_state(state)
}

async fn get_404_not_found() -> Error {
    Error::NotFound
}
