//! Signing primitive interface.
//!
//! The issuer decides *what* gets signed; a primitive decides *how*. A
//! primitive receives the merged header, the key, the serialized claims and
//! the payload encoding, and returns the finished token text.

use crate::{key::KeyMaterial, options::PayloadEncoding, types::Header};
use std::sync::Arc;

/// Everything a primitive needs for one signature.
#[derive(Debug, Clone, Copy)]
pub struct SignRequest<'a> {
    /// Merged header
    pub header: &'a Header,
    /// Resolved key, empty when none was supplied
    pub key: &'a KeyMaterial,
    /// Claims serialized as JSON text
    pub payload: &'a str,
    /// Encoding for turning `payload` into bytes
    pub encoding: PayloadEncoding,
}

/// Signing algorithm interface.
///
/// Implementations must be thread-safe (Send + Sync). Errors are opaque to
/// the issuer: only their `Display` text is carried forward.
pub trait SigningPrimitive: Send + Sync {
    /// Backend error type
    type Error: std::error::Error;

    /// Sign the request and return the token text.
    ///
    /// # Errors
    /// Returns `Self::Error` when the algorithm, key or payload is rejected.
    fn sign(&self, request: &SignRequest<'_>) -> Result<String, Self::Error>;
}

/// Implementation of `SigningPrimitive` for `Arc<T>` to allow shared ownership.
impl<T: SigningPrimitive + ?Sized> SigningPrimitive for Arc<T> {
    type Error = T::Error;

    fn sign(&self, request: &SignRequest<'_>) -> Result<String, Self::Error> {
        (**self).sign(request)
    }
}
