//! Authentication middleware that validates bearer tokens.

use axum::{
    RequestPartsExt,
    extract::{FromRef, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::{
    AppState, AuthConfig, Error,
    app_state::TokenKeys,
    auth::token::decode_token,
};

/// The state needed for issuing and checking access tokens.
#[derive(Debug, Clone)]
pub struct AuthState {
    /// The keys for signing and verifying access tokens.
    pub token_keys: TokenKeys,
    /// Settings for access tokens and password hashing.
    pub auth_config: AuthConfig,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            token_keys: state.token_keys.clone(),
            auth_config: state.auth_config,
        }
    }
}

/// Middleware function that checks for a valid bearer token in the `Authorization` header.
///
/// The user ID is placed into the request extensions and the request executed normally if the
/// token is valid, otherwise a 401 response is returned.
///
/// **Note**: Route handlers can use the function argument `Extension(user_id): Extension<UserID>`
/// to receive the user ID.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();

    let bearer = match parts.extract::<TypedHeader<Authorization<Bearer>>>().await {
        Ok(TypedHeader(Authorization(bearer))) => bearer,
        Err(error) => {
            tracing::debug!("Missing or malformed authorization header: {error}");
            return Error::Unauthorized.into_response();
        }
    };

    let claims = match decode_token(bearer.token(), &state.token_keys) {
        Ok(claims) => claims,
        Err(error) => return error.into_response(),
    };

    parts.extensions.insert(claims.user_id);
    let request = Request::from_parts(parts, body);

    next.run(request).await
}

#[cfg(test)]
mod auth_guard_tests {
    use axum::{Extension, Router, http::StatusCode, middleware, routing::get};
    use axum_test::TestServer;
    use time::{Duration, OffsetDateTime};

    use crate::{
        AuthConfig, PasswordHash, User, UserID,
        app_state::TokenKeys,
        auth::{AuthState, Claims, auth_guard, encode_token},
    };

    const TEST_PROTECTED_ROUTE: &str = "/api/protected";

    async fn echo_user_id(Extension(user_id): Extension<UserID>) -> String {
        user_id.to_string()
    }

    fn get_test_state() -> AuthState {
        AuthState {
            token_keys: TokenKeys::from_secret("nafstenoas"),
            auth_config: AuthConfig::default(),
        }
    }

    fn get_test_server(state: AuthState) -> TestServer {
        let app = Router::new()
            .route(TEST_PROTECTED_ROUTE, get(echo_user_id))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard))
            .with_state(state);

        TestServer::new(app).expect("Could not create test server.")
    }

    fn token_for(user_id: i64, issued_at: OffsetDateTime, state: &AuthState) -> String {
        let user = User {
            id: UserID::new(user_id),
            username: "alice".to_owned(),
            password_hash: PasswordHash::new_unchecked("hunter2"),
        };
        let claims = Claims::new(&user, issued_at, Duration::minutes(30));

        encode_token(&claims, &state.token_keys).unwrap()
    }

    #[tokio::test]
    async fn passes_user_id_to_handler_with_valid_token() {
        let state = get_test_state();
        let token = token_for(42, OffsetDateTime::now_utc(), &state);
        let server = get_test_server(state);

        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .authorization_bearer(token)
            .await;

        response.assert_status_ok();
        response.assert_text("42");
    }

    #[tokio::test]
    async fn rejects_missing_token() {
        let server = get_test_server(get_test_state());

        server
            .get(TEST_PROTECTED_ROUTE)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn rejects_expired_token() {
        let state = get_test_state();
        let token = token_for(42, OffsetDateTime::now_utc() - Duration::days(1), &state);
        let server = get_test_server(state);

        server
            .get(TEST_PROTECTED_ROUTE)
            .authorization_bearer(token)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn rejects_token_signed_with_other_key() {
        let other_state = AuthState {
            token_keys: TokenKeys::from_secret("someothersecret"),
            auth_config: AuthConfig::default(),
        };
        let token = token_for(42, OffsetDateTime::now_utc(), &other_state);
        let server = get_test_server(get_test_state());

        server
            .get(TEST_PROTECTED_ROUTE)
            .authorization_bearer(token)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
