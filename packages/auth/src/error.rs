// ABOUTME: Error types for authentication operations
// ABOUTME: Covers credential failures, sign-up conflicts, and provider outages

use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account already exists for {0}")]
    EmailInUse(String),

    #[error("No account exists for {0}")]
    UserNotFound(String),

    #[error("Not signed in")]
    SignedOut,

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Network error: {0}")]
    Network(String),
}
