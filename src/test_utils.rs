//! Helpers shared by the HTTP tests.

use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use crate::{
    AppState, AuthConfig, PasswordHash, User,
    auth::{Claims, encode_token},
    user::create_user,
};

/// Create app state backed by an in-memory database with a single user, "alice".
pub(crate) fn get_test_state() -> (AppState, User) {
    let connection = Connection::open_in_memory().expect("Could not open database in memory");
    let state = AppState::new(
        connection,
        "foobar",
        AuthConfig {
            token_duration: Duration::minutes(5),
            password_cost: 4,
        },
    )
    .expect("Could not create app state");
    let user = create_user(
        "alice",
        PasswordHash::new_unchecked("hunter2"),
        &state.db_connection.lock().unwrap(),
    )
    .expect("Could not create test user");

    (state, user)
}

/// Create a valid access token for `user`.
pub(crate) fn bearer_token(user: &User, state: &AppState) -> String {
    let claims = Claims::new(user, OffsetDateTime::now_utc(), Duration::minutes(5));

    encode_token(&claims, &state.token_keys).expect("Could not encode token")
}
