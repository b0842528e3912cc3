//! Shared helpers for issuer integration tests

#![allow(dead_code)]

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use cryypt_issuer::{SignRequest, SigningPrimitive};
use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

/// Decode one base64url segment of a compact token as JSON
pub fn decode_json(token: &str, index: usize) -> Value {
    let segment = token.split('.').nth(index).expect("token segment");
    let bytes = URL_SAFE_NO_PAD.decode(segment).expect("base64url segment");
    serde_json::from_slice(&bytes).expect("JSON segment")
}

/// Header of a compact token
pub fn header_of(token: &str) -> Value {
    decode_json(token, 0)
}

/// Payload of a compact token
pub fn payload_of(token: &str) -> Value {
    decode_json(token, 1)
}

/// `header.payload` signing input and raw signature bytes
pub fn split_signature(token: &str) -> (String, Vec<u8>) {
    let (input, signature) = token.rsplit_once('.').expect("three segments");
    let signature = URL_SAFE_NO_PAD.decode(signature).expect("base64url signature");
    (input.to_string(), signature)
}

/// Check an HS256 token against `secret`
pub fn verify_hs256(token: &str, secret: &[u8]) -> bool {
    let (input, signature) = split_signature(token);
    let mut mac = Hmac::<Sha256>::new_from_slice(secret).expect("hmac key");
    mac.update(input.as_bytes());
    mac.verify_slice(&signature).is_ok()
}

/// Current unix time in seconds
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Error returned by [`RecordingPrimitive`] when told to fail
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct StubError(pub String);

/// Primitive that records every request and returns `header|payload|key`
#[derive(Default)]
pub struct RecordingPrimitive {
    calls: AtomicUsize,
    last: Mutex<Option<(Value, String, Vec<u8>)>>,
    failure: Option<String>,
}

impl RecordingPrimitive {
    /// Primitive that always fails with `message`
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// Number of sign calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Header, payload and key of the last call
    pub fn last(&self) -> Option<(Value, String, Vec<u8>)> {
        self.last.lock().expect("lock").clone()
    }
}

impl SigningPrimitive for RecordingPrimitive {
    type Error = StubError;

    fn sign(&self, request: &SignRequest<'_>) -> Result<String, StubError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let header = serde_json::to_value(request.header).expect("header");
        *self.last.lock().expect("lock") = Some((
            header.clone(),
            request.payload.to_string(),
            request.key.as_bytes().to_vec(),
        ));
        match &self.failure {
            Some(message) => Err(StubError(message.clone())),
            None => Ok(format!("{header}|{}", request.payload)),
        }
    }
}
