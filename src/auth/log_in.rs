//! The route handler for exchanging a username and password for an access token.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    app_state::DbState,
    auth::{
        AuthState,
        token::{Claims, encode_token},
    },
    user::get_user_by_username,
};

/// The credentials a user logs in with.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInData {
    /// The username entered during log in.
    pub username: String,
    /// Password entered during log in.
    pub password: String,
}

/// The response to a successful log in.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The signed access token to send as a bearer token.
    pub access_token: String,
    /// Always "bearer".
    pub token_type: String,
}

/// Handler for log-in requests.
///
/// # Errors
///
/// Returns [Error::InvalidCredentials] if the username is not registered or the password is
/// wrong. Unknown users and wrong passwords are indistinguishable to the client.
pub async fn post_log_in(
    State(auth_state): State<AuthState>,
    State(db_state): State<DbState>,
    Json(data): Json<LogInData>,
) -> Result<Json<TokenResponse>, Error> {
    let user = {
        let connection = db_state.lock()?;

        match get_user_by_username(data.username.trim(), &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => return Err(Error::InvalidCredentials),
            Err(error) => return Err(error),
        }
    };

    let is_password_correct = user
        .password_hash
        .verify(&data.password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    if !is_password_correct {
        tracing::info!("Failed log in attempt for user {}", user.id);
        return Err(Error::InvalidCredentials);
    }

    let claims = Claims::new(
        &user,
        OffsetDateTime::now_utc(),
        auth_state.auth_config.token_duration,
    );
    let access_token = encode_token(&claims, &auth_state.token_keys)?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_owned(),
    }))
}

#[cfg(test)]
mod log_in_tests {
    use axum::{Router, extract::FromRef, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{
        AppState, AuthConfig, PasswordHash, ValidatedPassword,
        auth::{AuthState, LogInData, TokenResponse, decode_token, post_log_in},
        endpoints,
        user::create_user,
    };

    fn get_test_state() -> AppState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        let state = AppState::new(connection, "42", AuthConfig::default())
            .expect("Could not create app state");

        let password_hash = PasswordHash::new(
            ValidatedPassword::new_unchecked("correcthorsebatterystaple"),
            4,
        )
        .unwrap();
        create_user(
            "alice",
            password_hash,
            &state.db_connection.lock().unwrap(),
        )
        .expect("Could not create test user");

        state
    }

    fn get_test_server(state: AppState) -> TestServer {
        let app = Router::new()
            .route(endpoints::LOG_IN, post(post_log_in))
            .with_state(state);

        TestServer::new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn log_in_returns_token_for_user() {
        let state = get_test_state();
        let auth_state = AuthState::from_ref(&state);
        let server = get_test_server(state);

        let response = server
            .post(endpoints::LOG_IN)
            .json(&LogInData {
                username: "alice".to_owned(),
                password: "correcthorsebatterystaple".to_owned(),
            })
            .await;

        response.assert_status_ok();
        let body = response.json::<TokenResponse>();
        assert_eq!(body.token_type, "bearer");
        let claims = decode_token(&body.access_token, &auth_state.token_keys).unwrap();
        assert_eq!(claims.sub, "alice");
    }

    #[tokio::test]
    async fn log_in_fails_with_wrong_password() {
        let server = get_test_server(get_test_state());

        server
            .post(endpoints::LOG_IN)
            .json(&LogInData {
                username: "alice".to_owned(),
                password: "wrongpassword".to_owned(),
            })
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn log_in_fails_with_unknown_user() {
        let server = get_test_server(get_test_state());

        server
            .post(endpoints::LOG_IN)
            .json(&LogInData {
                username: "bob".to_owned(),
                password: "correcthorsebatterystaple".to_owned(),
            })
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
