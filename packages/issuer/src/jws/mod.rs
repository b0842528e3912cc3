//! Compact JWS signing primitive
//!
//! Produces `base64url(header).base64url(payload).base64url(signature)` as
//! described by RFC 7515, for the HMAC, RSA PKCS#1 v1.5, ECDSA and `none`
//! algorithms.

mod algorithm;
mod ecdsa;
mod hmac;
mod rsa;

pub use algorithm::Algorithm;

use crate::{
    options::EncodingError,
    primitive::{SignRequest, SigningPrimitive},
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use thiserror::Error;

/// Errors raised by [`CompactJws`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JwsError {
    /// Header has no string `alg` field
    #[error("header \"alg\" must be a string")]
    MissingAlgorithm,

    /// `alg` names an algorithm this primitive does not implement
    #[error("unsupported algorithm \"{0}\"")]
    UnsupportedAlgorithm(String),

    /// Key cannot be used with the algorithm
    #[error("invalid {alg} key: {reason}")]
    InvalidKey {
        /// Algorithm name
        alg: &'static str,
        /// What was wrong with the key
        reason: String,
    },

    /// Header could not be serialized
    #[error("header could not be serialized: {0}")]
    HeaderSerialization(String),

    /// Payload could not be converted with the requested encoding
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

impl JwsError {
    pub(crate) fn invalid_key(alg: Algorithm, reason: impl ToString) -> Self {
        JwsError::InvalidKey {
            alg: alg.as_str(),
            reason: reason.to_string(),
        }
    }
}

/// Compact-serialization signing primitive.
///
/// Key formats per algorithm family:
/// - `HS*`: raw secret bytes of any length
/// - `RS*`: PKCS#8 or PKCS#1 PEM, or PKCS#8 DER
/// - `ES*`: PKCS#8 or SEC1 PEM, PKCS#8 DER, or the raw private scalar
/// - `none`: the key is ignored and the signature segment is empty
#[derive(Debug, Clone, Copy, Default)]
pub struct CompactJws;

impl CompactJws {
    /// Create the primitive
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SigningPrimitive for CompactJws {
    type Error = JwsError;

    fn sign(&self, request: &SignRequest<'_>) -> Result<String, JwsError> {
        let algorithm: Algorithm = request
            .header
            .alg()
            .ok_or(JwsError::MissingAlgorithm)?
            .parse()?;

        let header_json = serde_json::to_vec(request.header)
            .map_err(|e| JwsError::HeaderSerialization(e.to_string()))?;
        let payload_bytes = request.encoding.encode(request.payload)?;

        let header_b64 = URL_SAFE_NO_PAD.encode(header_json);
        let payload_b64 = URL_SAFE_NO_PAD.encode(payload_bytes);

        let mut jwt = String::with_capacity(header_b64.len() + payload_b64.len() + 2);
        jwt.push_str(&header_b64);
        jwt.push('.');
        jwt.push_str(&payload_b64);

        let signature = algorithm.sign(jwt.as_bytes(), request.key.as_bytes())?;

        jwt.push('.');
        URL_SAFE_NO_PAD.encode_string(signature, &mut jwt);
        Ok(jwt)
    }
}
