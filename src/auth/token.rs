//! Defines the claims carried in an access token and how tokens are signed and verified.

use jsonwebtoken::{Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{Error, User, UserID, app_state::TokenKeys};

/// How long an access token is valid for by default.
pub const DEFAULT_TOKEN_DURATION: Duration = Duration::minutes(30);

/// The contents of an access token.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// The username of the user the token was issued to.
    pub sub: String,
    /// The ID of the user the token was issued to.
    pub user_id: UserID,
    /// When the token was issued, as a unix timestamp.
    pub iat: i64,
    /// When the token expires, as a unix timestamp.
    pub exp: i64,
}

impl Claims {
    /// Create claims for `user` issued at `issued_at` that expire after `duration`.
    pub fn new(user: &User, issued_at: OffsetDateTime, duration: Duration) -> Self {
        Self {
            sub: user.username.clone(),
            user_id: user.id,
            iat: issued_at.unix_timestamp(),
            exp: (issued_at + duration).unix_timestamp(),
        }
    }
}

/// Sign `claims` with HS256.
///
/// # Errors
/// Returns [Error::TokenCreation] if the claims could not be encoded.
pub fn encode_token(claims: &Claims, keys: &TokenKeys) -> Result<String, Error> {
    encode(&Header::default(), claims, &keys.encoding_key)
        .map_err(|error| Error::TokenCreation(error.to_string()))
}

/// Verify the signature and expiry of `token` and return its claims.
///
/// # Errors
/// Returns [Error::Unauthorized] if the token is malformed, signed with a different key or expired.
pub fn decode_token(token: &str, keys: &TokenKeys) -> Result<Claims, Error> {
    decode::<Claims>(token, &keys.decoding_key, &Validation::default())
        .map(|token_data| token_data.claims)
        .inspect_err(|error| tracing::debug!("Rejected access token: {error}"))
        .map_err(|_| Error::Unauthorized)
}
