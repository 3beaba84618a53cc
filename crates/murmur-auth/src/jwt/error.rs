//! Token verification failures.

use thiserror::Error;

use murmur_core::error::{AppError, ErrorKind};

/// Why a token was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Well-formed and correctly signed, but past its expiry.
    #[error("Token has expired")]
    Expired,
    /// Bad signature, wrong token type, or mismatched access/refresh pairing.
    #[error("Invalid token: {0}")]
    Invalid(String),
    /// Not a structurally valid signed token.
    #[error("Malformed token: {0}")]
    Malformed(String),
    /// Signing a new token failed.
    #[error("Failed to sign token: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind as JwtKind;

        match err.kind() {
            JwtKind::ExpiredSignature => Self::Expired,
            JwtKind::InvalidToken
            | JwtKind::Base64(_)
            | JwtKind::Json(_)
            | JwtKind::Utf8(_)
            | JwtKind::MissingRequiredClaim(_) => Self::Malformed(err.to_string()),
            _ => Self::Invalid(err.to_string()),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(_) => AppError::new(ErrorKind::Internal, err.to_string()),
            _ => AppError::authentication(err.to_string()),
        }
    }
}
