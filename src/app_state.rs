//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use jsonwebtoken::{DecodingKey, EncodingKey};
use rusqlite::Connection;
use time::Duration;

use crate::{Error, PasswordHash, auth::DEFAULT_TOKEN_DURATION, db::initialize};

/// Settings for issuing access tokens and hashing passwords.
#[derive(Debug, Clone, Copy)]
pub struct AuthConfig {
    /// How long an access token is valid for after it is issued.
    pub token_duration: Duration,
    /// The bcrypt cost used when hashing new passwords.
    pub password_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_duration: DEFAULT_TOKEN_DURATION,
            password_cost: PasswordHash::DEFAULT_COST,
        }
    }
}

/// The keys used to sign and verify access tokens.
#[derive(Clone)]
pub struct TokenKeys {
    /// Signs new access tokens.
    pub encoding_key: EncodingKey,
    /// Verifies access tokens presented by clients.
    pub decoding_key: DecodingKey,
}

impl TokenKeys {
    /// Create the signing and verification keys from a shared `secret`.
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

impl std::fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TokenKeys(********)")
    }
}

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The keys for signing and verifying access tokens.
    pub token_keys: TokenKeys,

    /// Settings for access tokens and password hashing.
    pub auth_config: AuthConfig,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        token_secret: &str,
        auth_config: AuthConfig,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            token_keys: TokenKeys::from_secret(token_secret),
            auth_config,
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }
}

/// The shared database connection.
///
/// Handlers that only need the database take this as their state.
#[derive(Debug, Clone)]
pub struct DbState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DbState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

impl DbState {
    /// Lock the database connection for the duration of a request.
    ///
    /// # Errors
    /// Returns [Error::DatabaseLockError] if the mutex is poisoned.
    pub fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, Error> {
        self.db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)
    }
}
