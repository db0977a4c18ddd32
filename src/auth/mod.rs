//! Bearer token authentication: issuing tokens at log in and checking them on protected routes.

mod log_in;
mod middleware;
mod token;

pub use log_in::{LogInData, TokenResponse, post_log_in};
pub use middleware::{AuthState, auth_guard};
pub use token::{Claims, DEFAULT_TOKEN_DURATION, decode_token, encode_token};
