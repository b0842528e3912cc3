//! HMAC-based signing (HS256, HS384, HS512)

use super::{Algorithm, JwsError};
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};

type HmacSha256 = Hmac<Sha256>;
type HmacSha384 = Hmac<Sha384>;
type HmacSha512 = Hmac<Sha512>;

/// Sign with HMAC-SHA256 (HS256)
#[inline]
pub(crate) fn sign_hs256(message: &[u8], secret: &[u8]) -> Result<Vec<u8>, JwsError> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| JwsError::invalid_key(Algorithm::Hs256, e))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Sign with HMAC-SHA384 (HS384)
#[inline]
pub(crate) fn sign_hs384(message: &[u8], secret: &[u8]) -> Result<Vec<u8>, JwsError> {
    let mut mac = HmacSha384::new_from_slice(secret)
        .map_err(|e| JwsError::invalid_key(Algorithm::Hs384, e))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Sign with HMAC-SHA512 (HS512)
#[inline]
pub(crate) fn sign_hs512(message: &[u8], secret: &[u8]) -> Result<Vec<u8>, JwsError> {
    let mut mac = HmacSha512::new_from_slice(secret)
        .map_err(|e| JwsError::invalid_key(Algorithm::Hs512, e))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}
