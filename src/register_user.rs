//! The route handler for registering a new user.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::{
    Error, PasswordHash, ValidatedPassword,
    app_state::DbState,
    auth::AuthState,
    user::{UserID, create_user},
};

/// The data needed to register a new user.
#[derive(Clone, Serialize, Deserialize)]
pub struct RegisterForm {
    /// The name the user will log in with.
    pub username: String,
    /// The user's chosen password.
    pub password: String,
}

/// The response to a successful registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisteredUser {
    /// The new user's ID.
    pub id: UserID,
    /// The new user's username.
    pub username: String,
}

/// A route handler for creating a new user.
///
/// # Errors
///
/// Returns a:
/// - [Error::InvalidInput] if the username is blank,
/// - [Error::TooWeak] if the password is too easy to guess,
/// - [Error::DuplicateUsername] if the username is already registered.
pub async fn register_user(
    State(auth_state): State<AuthState>,
    State(db_state): State<DbState>,
    Json(form): Json<RegisterForm>,
) -> Result<(StatusCode, Json<RegisteredUser>), Error> {
    let username = form.username.trim();

    if username.is_empty() {
        return Err(Error::InvalidInput("Username cannot be empty".to_owned()));
    }

    let password = ValidatedPassword::new(&form.password, &[username])?;
    let password_hash = PasswordHash::new(password, auth_state.auth_config.password_cost)
        .inspect_err(|error| tracing::error!("Could not hash password: {error}"))?;

    let connection = db_state.lock()?;
    let user = create_user(username, password_hash, &connection)?;

    tracing::info!("Registered user {} ({})", user.id, user.username);

    Ok((
        StatusCode::CREATED,
        Json(RegisteredUser {
            id: user.id,
            username: user.username,
        }),
    ))
}
