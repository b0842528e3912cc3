//! Registered claim names and a builder for claim sets

use crate::types::Claims;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

/// Audience
pub const AUDIENCE: &str = "aud";
/// Issuer
pub const ISSUER: &str = "iss";
/// Subject
pub const SUBJECT: &str = "sub";
/// Token identifier
pub const JWT_ID: &str = "jti";
/// Expiration time
pub const EXPIRATION: &str = "exp";
/// Not before
pub const NOT_BEFORE: &str = "nbf";
/// Issued at
pub const ISSUED_AT: &str = "iat";

/// Claim names with special merge rules.
pub const RESERVED_CLAIMS: [&str; 7] = [
    AUDIENCE, ISSUER, SUBJECT, JWT_ID, EXPIRATION, NOT_BEFORE, ISSUED_AT,
];

/// Names the `payload` option may set, in the order conflicts are checked.
/// `iat` is handled by its own rule and is not in this list.
pub const CONFLICT_CHECKED_CLAIMS: [&str; 6] =
    [AUDIENCE, ISSUER, SUBJECT, JWT_ID, EXPIRATION, NOT_BEFORE];

/// Whether `name` is one of the reserved claim names
#[inline]
#[must_use]
pub fn is_reserved(name: &str) -> bool {
    RESERVED_CLAIMS.contains(&name)
}

/// Current time in whole seconds since the epoch, truncated.
#[inline]
#[must_use]
pub fn now_timestamp() -> i64 {
    Utc::now().timestamp()
}

/// Claims builder for assembling a claim set before issuing
pub struct ClaimsBuilder {
    claims: Claims,
}

impl ClaimsBuilder {
    /// Create new claims builder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            claims: Claims::new(),
        }
    }

    /// Set subject claim
    #[inline]
    #[must_use]
    pub fn with_subject(mut self, subject: &str) -> Self {
        self.claims.insert(SUBJECT, subject);
        self
    }

    /// Set issuer claim
    #[inline]
    #[must_use]
    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.claims.insert(ISSUER, issuer);
        self
    }

    /// Set audience claim as string
    #[inline]
    #[must_use]
    pub fn with_audience(mut self, audience: &str) -> Self {
        self.claims.insert(AUDIENCE, audience);
        self
    }

    /// Set audience claim as array
    #[inline]
    #[must_use]
    pub fn with_audience_array(mut self, audiences: &[&str]) -> Self {
        let aud_array: Vec<Value> = audiences
            .iter()
            .map(|&aud| Value::String(aud.to_string()))
            .collect();
        self.claims.insert(AUDIENCE, Value::Array(aud_array));
        self
    }

    /// Set expiration time (unix seconds)
    #[inline]
    #[must_use]
    pub fn with_expiration(mut self, exp: i64) -> Self {
        self.claims.insert(EXPIRATION, exp);
        self
    }

    /// Set expiration time using duration from now
    #[inline]
    #[must_use]
    pub fn expires_in(self, duration: Duration) -> Self {
        let exp = (Utc::now() + duration).timestamp();
        self.with_expiration(exp)
    }

    /// Set not before time (unix seconds)
    #[inline]
    #[must_use]
    pub fn with_not_before(mut self, nbf: i64) -> Self {
        self.claims.insert(NOT_BEFORE, nbf);
        self
    }

    /// Set not before from a point in time
    #[inline]
    #[must_use]
    pub fn not_before(self, nbf: DateTime<Utc>) -> Self {
        self.with_not_before(nbf.timestamp())
    }

    /// Set issued at time. The issuer keeps this value unless `iat` is
    /// excluded by the sign options.
    #[inline]
    #[must_use]
    pub fn with_issued_at(mut self, iat: i64) -> Self {
        self.claims.insert(ISSUED_AT, iat);
        self
    }

    /// Set issued at time to now
    #[inline]
    #[must_use]
    pub fn issued_now(self) -> Self {
        self.with_issued_at(now_timestamp())
    }

    /// Set JWT ID
    #[inline]
    #[must_use]
    pub fn with_jwt_id(mut self, jti: &str) -> Self {
        self.claims.insert(JWT_ID, jti);
        self
    }

    /// Set JWT ID to a fresh v4 UUID
    #[inline]
    #[must_use]
    pub fn with_random_jwt_id(self) -> Self {
        let jti = uuid::Uuid::new_v4().to_string();
        self.with_jwt_id(&jti)
    }

    /// Set custom claim with any JSON value
    #[inline]
    #[must_use]
    pub fn custom(mut self, key: &str, value: Value) -> Self {
        self.claims.insert(key, value);
        self
    }

    /// Finish the claim set
    #[inline]
    #[must_use]
    pub fn build(self) -> Claims {
        self.claims
    }
}

impl Default for ClaimsBuilder {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}
