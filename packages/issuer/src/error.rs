//! Issuer error types

use thiserror::Error;

/// Token issuing result type
pub type IssuerResult<T> = Result<T, IssuerError>;

/// Errors surfaced by the token issuer.
///
/// Every variant is terminal for the call that produced it: nothing is
/// retried internally and no partial token is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IssuerError {
    /// A registered claim was supplied both in the claims and in the
    /// `payload` option. Carries the claim name.
    #[error("Bad \"options.{0}\" option. The payload already has an \"{0}\" property.")]
    ClaimConflict(String),

    /// The deferred key was rejected or its provider went away.
    #[error("Key resolution failed: {0}")]
    KeyResolution(String),

    /// The signing primitive refused the request.
    #[error("{0}")]
    SigningFailed(String),
}

impl IssuerError {
    /// Create a claim conflict error
    #[inline]
    #[must_use]
    pub fn claim_conflict(claim: &str) -> Self {
        IssuerError::ClaimConflict(claim.to_string())
    }

    /// Create a key resolution error
    #[inline]
    #[must_use]
    pub fn key_resolution(cause: &str) -> Self {
        IssuerError::KeyResolution(cause.to_string())
    }

    /// Create a signing failure error
    #[inline]
    #[must_use]
    pub fn signing_failed(msg: &str) -> Self {
        IssuerError::SigningFailed(msg.to_string())
    }

    /// Name of the conflicting claim, if this is a conflict.
    #[must_use]
    pub fn claim_name(&self) -> Option<&str> {
        match self {
            IssuerError::ClaimConflict(name) => Some(name),
            _ => None,
        }
    }

    /// The cause or message text without the variant prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            IssuerError::ClaimConflict(msg)
            | IssuerError::KeyResolution(msg)
            | IssuerError::SigningFailed(msg) => msg,
        }
    }
}
