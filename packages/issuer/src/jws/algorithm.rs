//! Supported `alg` identifiers and per-algorithm dispatch

use super::{ecdsa, hmac, rsa, JwsError};
use std::{fmt, str::FromStr};

/// Signing algorithms understood by [`super::CompactJws`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// HMAC with SHA-256
    Hs256,
    /// HMAC with SHA-384
    Hs384,
    /// HMAC with SHA-512
    Hs512,
    /// RSASSA-PKCS1-v1_5 with SHA-256
    Rs256,
    /// RSASSA-PKCS1-v1_5 with SHA-384
    Rs384,
    /// RSASSA-PKCS1-v1_5 with SHA-512
    Rs512,
    /// ECDSA P-256 with SHA-256
    Es256,
    /// ECDSA P-384 with SHA-384
    Es384,
    /// Unsecured
    None,
}

impl Algorithm {
    /// Every supported algorithm
    pub const ALL: [Algorithm; 9] = [
        Algorithm::Hs256,
        Algorithm::Hs384,
        Algorithm::Hs512,
        Algorithm::Rs256,
        Algorithm::Rs384,
        Algorithm::Rs512,
        Algorithm::Es256,
        Algorithm::Es384,
        Algorithm::None,
    ];

    /// The `alg` header value
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Hs256 => "HS256",
            Algorithm::Hs384 => "HS384",
            Algorithm::Hs512 => "HS512",
            Algorithm::Rs256 => "RS256",
            Algorithm::Rs384 => "RS384",
            Algorithm::Rs512 => "RS512",
            Algorithm::Es256 => "ES256",
            Algorithm::Es384 => "ES384",
            Algorithm::None => "none",
        }
    }

    /// Sign `message` (the `header.payload` signing input) with `key`.
    pub(crate) fn sign(self, message: &[u8], key: &[u8]) -> Result<Vec<u8>, JwsError> {
        match self {
            Algorithm::Hs256 => hmac::sign_hs256(message, key),
            Algorithm::Hs384 => hmac::sign_hs384(message, key),
            Algorithm::Hs512 => hmac::sign_hs512(message, key),
            Algorithm::Rs256 => rsa::sign_rs256(message, key),
            Algorithm::Rs384 => rsa::sign_rs384(message, key),
            Algorithm::Rs512 => rsa::sign_rs512(message, key),
            Algorithm::Es256 => ecdsa::sign_es256(message, key),
            Algorithm::Es384 => ecdsa::sign_es384(message, key),
            Algorithm::None => Ok(Vec::new()),
        }
    }
}

impl FromStr for Algorithm {
    type Err = JwsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|alg| alg.as_str() == s)
            .ok_or_else(|| JwsError::UnsupportedAlgorithm(s.to_string()))
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for alg in Algorithm::ALL {
            assert_eq!(alg.as_str().parse::<Algorithm>(), Ok(alg));
        }
    }

    #[test]
    fn names_are_case_sensitive() {
        assert_eq!(
            "hs256".parse::<Algorithm>(),
            Err(JwsError::UnsupportedAlgorithm("hs256".to_string()))
        );
        assert!("None".parse::<Algorithm>().is_err());
    }
}
