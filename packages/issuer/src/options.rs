//! Sign options - builder-style configuration for a single issue call

use crate::{
    claims::{now_timestamp, AUDIENCE, EXPIRATION, ISSUER, JWT_ID, NOT_BEFORE, SUBJECT},
    key::KeySource,
    types::DEFAULT_ALGORITHM,
};
use chrono::Duration;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Text encoding used to turn the serialized claims into bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PayloadEncoding {
    /// UTF-8
    #[default]
    Utf8,
    /// ISO-8859-1, one byte per character (also known as `binary`)
    Latin1,
    /// 7-bit ASCII
    Ascii,
}

/// Payload encoding errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// Name not recognized by [`PayloadEncoding::from_str`]
    #[error("Unknown payload encoding: {0}")]
    Unknown(String),

    /// Character outside the range of the target encoding
    #[error("Character {ch:?} cannot be represented in {encoding}")]
    Unrepresentable {
        /// Offending character
        ch: char,
        /// Encoding name
        encoding: &'static str,
    },
}

impl PayloadEncoding {
    /// Canonical name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadEncoding::Utf8 => "utf8",
            PayloadEncoding::Latin1 => "latin1",
            PayloadEncoding::Ascii => "ascii",
        }
    }

    /// Convert `text` into bytes.
    ///
    /// # Errors
    /// Returns `EncodingError::Unrepresentable` for characters above U+00FF
    /// (Latin-1) or U+007F (ASCII).
    pub fn encode(&self, text: &str) -> Result<Vec<u8>, EncodingError> {
        let limit = match self {
            PayloadEncoding::Utf8 => return Ok(text.as_bytes().to_vec()),
            PayloadEncoding::Latin1 => 0xFF,
            PayloadEncoding::Ascii => 0x7F,
        };
        text.chars()
            .map(|ch| {
                u8::try_from(u32::from(ch))
                    .ok()
                    .filter(|&b| u32::from(b) <= limit)
                    .ok_or(EncodingError::Unrepresentable {
                        ch,
                        encoding: self.as_str(),
                    })
            })
            .collect()
    }
}

impl FromStr for PayloadEncoding {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(PayloadEncoding::Utf8),
            "latin1" | "binary" | "iso-8859-1" => Ok(PayloadEncoding::Latin1),
            "ascii" | "us-ascii" => Ok(PayloadEncoding::Ascii),
            _ => Err(EncodingError::Unknown(s.to_string())),
        }
    }
}

impl fmt::Display for PayloadEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registered claims layered onto the caller's claims by the issuer.
///
/// Only the names the issuer conflict-checks can be expressed here. `iat`
/// follows its own rule and is not part of this set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisteredClaims {
    /// Audience
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub aud: Option<Value>,
    /// Issuer
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub iss: Option<Value>,
    /// Subject
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub sub: Option<Value>,
    /// JWT ID
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub jti: Option<Value>,
    /// Expiration time
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub exp: Option<Value>,
    /// Not before
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub nbf: Option<Value>,
}

/// An explicit `null` is a value: it is set on the claims and still conflicts.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl RegisteredClaims {
    /// No registered claims
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Value set for `name`, if any
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        match name {
            AUDIENCE => self.aud.as_ref(),
            ISSUER => self.iss.as_ref(),
            SUBJECT => self.sub.as_ref(),
            JWT_ID => self.jti.as_ref(),
            EXPIRATION => self.exp.as_ref(),
            NOT_BEFORE => self.nbf.as_ref(),
            _ => None,
        }
    }

    /// Whether no claim is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.aud.is_none()
            && self.iss.is_none()
            && self.sub.is_none()
            && self.jti.is_none()
            && self.exp.is_none()
            && self.nbf.is_none()
    }

    /// Set audience
    #[must_use]
    pub fn audience(mut self, aud: &str) -> Self {
        self.aud = Some(Value::String(aud.to_string()));
        self
    }

    /// Set several audiences
    #[must_use]
    pub fn audience_array(mut self, audiences: &[&str]) -> Self {
        self.aud = Some(Value::Array(
            audiences
                .iter()
                .map(|&aud| Value::String(aud.to_string()))
                .collect(),
        ));
        self
    }

    /// Set issuer
    #[must_use]
    pub fn issuer(mut self, iss: &str) -> Self {
        self.iss = Some(Value::String(iss.to_string()));
        self
    }

    /// Set subject
    #[must_use]
    pub fn subject(mut self, sub: &str) -> Self {
        self.sub = Some(Value::String(sub.to_string()));
        self
    }

    /// Set JWT ID
    #[must_use]
    pub fn jwt_id(mut self, jti: &str) -> Self {
        self.jti = Some(Value::String(jti.to_string()));
        self
    }

    /// Set JWT ID to a fresh v4 UUID
    #[must_use]
    pub fn random_jwt_id(self) -> Self {
        let jti = uuid::Uuid::new_v4().to_string();
        self.jwt_id(&jti)
    }

    /// Set expiration (unix seconds)
    #[must_use]
    pub fn expires_at(mut self, exp: i64) -> Self {
        self.exp = Some(Value::from(exp));
        self
    }

    /// Set expiration relative to now
    #[must_use]
    pub fn expires_in(self, duration: Duration) -> Self {
        self.expires_at(now_timestamp() + duration.num_seconds())
    }

    /// Set not-before (unix seconds)
    #[must_use]
    pub fn not_before(mut self, nbf: i64) -> Self {
        self.nbf = Some(Value::from(nbf));
        self
    }
}

/// Options for one issue call.
///
/// All fields are optional. Absent fields fall back to: algorithm `HS256`,
/// no extra header fields, no registered claims, `iat` included, empty key,
/// UTF-8 payload encoding.
#[derive(Debug, Default)]
pub struct SignOptions {
    pub(crate) algorithm: Option<String>,
    pub(crate) header: Map<String, Value>,
    pub(crate) payload: RegisteredClaims,
    pub(crate) iat_exclude: bool,
    pub(crate) key: Option<KeySource>,
    pub(crate) encoding: PayloadEncoding,
}

impl SignOptions {
    /// Options with every default
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set algorithm
    #[inline]
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: &str) -> Self {
        self.algorithm = Some(algorithm.to_string());
        self
    }

    /// Replace the extra header fields
    #[inline]
    #[must_use]
    pub fn with_header(mut self, header: Map<String, Value>) -> Self {
        self.header = header;
        self
    }

    /// Add one extra header field
    #[inline]
    #[must_use]
    pub fn with_header_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.header.insert(name.to_string(), value.into());
        self
    }

    /// Add a `kid` header field
    #[inline]
    #[must_use]
    pub fn with_key_id(self, kid: &str) -> Self {
        self.with_header_field("kid", kid)
    }

    /// Registered claims to layer onto the claims
    #[inline]
    #[must_use]
    pub fn with_payload(mut self, payload: RegisteredClaims) -> Self {
        self.payload = payload;
        self
    }

    /// Leave `iat` out of the token, even when the claims carry one
    #[inline]
    #[must_use]
    pub fn with_iat_exclude(mut self, exclude: bool) -> Self {
        self.iat_exclude = exclude;
        self
    }

    /// Shorthand for `with_iat_exclude(true)`
    #[inline]
    #[must_use]
    pub fn exclude_iat(self) -> Self {
        self.with_iat_exclude(true)
    }

    /// Set signing key, ready or deferred
    #[inline]
    #[must_use]
    pub fn with_key(mut self, key: impl Into<KeySource>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set payload encoding
    #[inline]
    #[must_use]
    pub fn with_encoding(mut self, encoding: PayloadEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Algorithm with default fallback
    #[inline]
    #[must_use]
    pub fn algorithm(&self) -> &str {
        self.algorithm.as_deref().unwrap_or(DEFAULT_ALGORITHM)
    }

    /// Extra header fields
    #[inline]
    #[must_use]
    pub fn header(&self) -> &Map<String, Value> {
        &self.header
    }

    /// Registered claims option
    #[inline]
    #[must_use]
    pub fn payload(&self) -> &RegisteredClaims {
        &self.payload
    }

    /// Whether `iat` is left out
    #[inline]
    #[must_use]
    pub fn iat_excluded(&self) -> bool {
        self.iat_exclude
    }

    /// Payload encoding
    #[inline]
    #[must_use]
    pub fn encoding(&self) -> PayloadEncoding {
        self.encoding
    }

    /// Whether a key was supplied
    #[inline]
    #[must_use]
    pub fn has_key(&self) -> bool {
        self.key.is_some()
    }
}
