//! Token issuer: claim assembly and signing orchestration.
//!
//! Issuing runs in two phases. [`TokenIssuer::prepare`] merges the header,
//! layers the registered claims from the options onto a copy of the caller's
//! claims and applies the issued-at rule; claim conflicts fail here, before
//! any key is touched. [`PendingIssue::resolve`] then waits for the key,
//! serializes the claims and hands everything to the signing primitive.
//! [`TokenIssuer::issue`] runs both phases back to back.

use crate::{
    claims::{now_timestamp, CONFLICT_CHECKED_CLAIMS, ISSUED_AT},
    error::{IssuerError, IssuerResult},
    jws::CompactJws,
    key::{KeyMaterial, KeySource},
    options::{PayloadEncoding, SignOptions},
    primitive::{SignRequest, SigningPrimitive},
    types::{Claims, Header, TokenString},
};
use serde_json::Value;
use tracing::{debug, error, warn};

/// Effective header: `{alg, typ: "JWT"}` overlaid with the caller's fields.
#[must_use]
pub fn resolve_header(options: &SignOptions) -> Header {
    Header::new(options.algorithm()).merged(options.header())
}

/// Build the exact claim set to sign.
///
/// Works on a copy of `claims`. Registered claims from `options.payload` are
/// copied in, checked in the order `aud iss sub jti exp nbf`; a name already
/// present in `claims` (even as `null`) is a conflict. `iat` is then removed
/// when excluded, or set to the caller's value if there is one and to the
/// current second otherwise.
///
/// # Errors
/// Returns `IssuerError::ClaimConflict` naming the first conflicting claim.
pub fn assemble_claims(claims: &Claims, options: &SignOptions) -> IssuerResult<Claims> {
    let mut working = claims.clone();

    let timestamp = match working.get(ISSUED_AT) {
        Some(iat) if !iat.is_null() => iat.clone(),
        _ => Value::from(now_timestamp()),
    };

    for name in CONFLICT_CHECKED_CLAIMS {
        if let Some(value) = options.payload().get(name) {
            if working.contains(name) {
                warn!(claim = name, "claim supplied by both claims and payload option");
                return Err(IssuerError::claim_conflict(name));
            }
            working.insert(name, value.clone());
        }
    }

    if options.iat_excluded() {
        working.remove(ISSUED_AT);
    } else {
        working.insert(ISSUED_AT, timestamp);
    }

    Ok(working)
}

/// Issues signed tokens through a [`SigningPrimitive`].
///
/// Holds no mutable state; share it freely between tasks.
#[derive(Debug, Clone, Default)]
pub struct TokenIssuer<P = CompactJws> {
    primitive: P,
}

impl TokenIssuer<CompactJws> {
    /// Issuer backed by [`CompactJws`]
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            primitive: CompactJws,
        }
    }
}

impl<P: SigningPrimitive> TokenIssuer<P> {
    /// Issuer backed by a custom primitive
    #[inline]
    #[must_use]
    pub fn with_primitive(primitive: P) -> Self {
        Self { primitive }
    }

    /// The signing primitive
    #[inline]
    #[must_use]
    pub fn primitive(&self) -> &P {
        &self.primitive
    }

    /// First phase: resolve the header and assemble the claims.
    ///
    /// `claims` is never modified.
    ///
    /// # Errors
    /// Returns `IssuerError::ClaimConflict` when a registered claim is
    /// supplied by both `claims` and the `payload` option.
    pub fn prepare(&self, claims: &Claims, options: SignOptions) -> IssuerResult<PendingIssue<'_, P>> {
        let header = resolve_header(&options);
        let claims = assemble_claims(claims, &options)?;

        debug!(
            alg = header.alg().unwrap_or_default(),
            claims = claims.len(),
            iat_exclude = options.iat_excluded(),
            deferred_key = options.key.as_ref().is_some_and(KeySource::is_deferred),
            "claims assembled"
        );

        Ok(PendingIssue {
            primitive: &self.primitive,
            header,
            claims,
            encoding: options.encoding(),
            key: options.key,
        })
    }

    /// Issue a signed token.
    ///
    /// Suspends only while a deferred key is resolved.
    ///
    /// # Errors
    /// - `IssuerError::ClaimConflict` if a registered claim is supplied twice
    /// - `IssuerError::KeyResolution` if the deferred key is rejected
    /// - `IssuerError::SigningFailed` if the primitive refuses the request
    pub async fn issue(&self, claims: &Claims, options: SignOptions) -> IssuerResult<TokenString> {
        self.prepare(claims, options)?.resolve().await
    }
}

/// Assembled token waiting for its key.
pub struct PendingIssue<'a, P> {
    primitive: &'a P,
    header: Header,
    claims: Claims,
    encoding: PayloadEncoding,
    key: Option<KeySource>,
}

impl<P: SigningPrimitive> PendingIssue<'_, P> {
    /// Header that will be signed
    #[inline]
    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Claims that will be signed
    #[inline]
    #[must_use]
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// Payload encoding
    #[inline]
    #[must_use]
    pub fn encoding(&self) -> PayloadEncoding {
        self.encoding
    }

    /// Second phase: wait for the key from the options, then sign.
    /// No key in the options means an empty key.
    ///
    /// # Errors
    /// - `IssuerError::KeyResolution` if the deferred key is rejected
    /// - `IssuerError::SigningFailed` if the primitive refuses the request
    pub async fn resolve(mut self) -> IssuerResult<TokenString> {
        let key = match self.key.take() {
            Some(source) => source.resolve().await.inspect_err(|e| {
                warn!(error = %e, "signing key could not be resolved");
            })?,
            None => KeyMaterial::empty(),
        };
        self.sign_with(key)
    }

    /// Second phase with an explicit key; any key source from the options is
    /// discarded.
    ///
    /// # Errors
    /// Returns `IssuerError::SigningFailed` if serialization or the primitive
    /// fails.
    pub fn sign_with(self, key: impl Into<KeyMaterial>) -> IssuerResult<TokenString> {
        let key = key.into();
        let payload = serde_json::to_string(&self.claims)
            .map_err(|e| IssuerError::signing_failed(&e.to_string()))?;

        let request = SignRequest {
            header: &self.header,
            key: &key,
            payload: &payload,
            encoding: self.encoding,
        };

        match self.primitive.sign(&request) {
            Ok(token) => {
                debug!(alg = self.header.alg().unwrap_or_default(), "token signed");
                Ok(TokenString(token))
            }
            Err(e) => {
                let message = e.to_string();
                error!(
                    alg = self.header.alg().unwrap_or_default(),
                    error = %message,
                    "signing primitive rejected request"
                );
                Err(IssuerError::SigningFailed(message))
            }
        }
    }
}

/// Issue a token with the default [`CompactJws`] primitive.
///
/// # Errors
/// See [`TokenIssuer::issue`].
pub async fn sign(claims: &Claims, options: SignOptions) -> IssuerResult<TokenString> {
    TokenIssuer::new().issue(claims, options).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::RegisteredClaims;
    use serde_json::json;

    fn claims(value: Value) -> Claims {
        Claims::try_from(value).unwrap()
    }

    #[test]
    fn payload_option_is_layered_onto_claims() {
        let options = SignOptions::new().with_payload(
            RegisteredClaims::new().issuer("auth").audience("api").expires_at(50),
        );
        let assembled = assemble_claims(&claims(json!({"sub": "u1", "iat": 7})), &options).unwrap();

        assert_eq!(
            assembled.as_map(),
            json!({"sub": "u1", "iat": 7, "aud": "api", "iss": "auth", "exp": 50})
                .as_object()
                .unwrap()
        );
    }

    #[test]
    fn first_conflict_in_fixed_order_is_reported() {
        let options = SignOptions::new()
            .with_payload(RegisteredClaims::new().not_before(1).jwt_id("j").issuer("i"));
        let source = claims(json!({"nbf": 0, "jti": "x", "iss": "y"}));

        let err = assemble_claims(&source, &options).unwrap_err();
        assert_eq!(err, IssuerError::ClaimConflict("iss".to_string()));
    }

    #[test]
    fn null_claim_still_conflicts() {
        let options = SignOptions::new().with_payload(RegisteredClaims::new().audience("api"));
        let err = assemble_claims(&claims(json!({"aud": null})), &options).unwrap_err();
        assert_eq!(err.claim_name(), Some("aud"));
    }

    #[test]
    fn null_in_deserialized_payload_option_is_a_value() {
        let payload: RegisteredClaims = serde_json::from_value(json!({"sub": null})).unwrap();
        let options = SignOptions::new().with_payload(payload).exclude_iat();

        let assembled = assemble_claims(&claims(json!({"role": "admin"})), &options).unwrap();
        assert_eq!(assembled.get("sub"), Some(&Value::Null));

        let err = assemble_claims(&claims(json!({"sub": "u1"})), &options).unwrap_err();
        assert_eq!(err, IssuerError::ClaimConflict("sub".to_string()));
    }

    #[test]
    fn caller_iat_wins_unless_excluded() {
        let source = claims(json!({"iat": 1000}));

        let kept = assemble_claims(&source, &SignOptions::new()).unwrap();
        assert_eq!(kept.get("iat"), Some(&json!(1000)));

        let dropped = assemble_claims(&source, &SignOptions::new().exclude_iat()).unwrap();
        assert!(!dropped.contains("iat"));
        assert_eq!(source.get("iat"), Some(&json!(1000)));
    }

    #[test]
    fn null_iat_is_replaced_by_now() {
        let before = now_timestamp();
        let assembled = assemble_claims(&claims(json!({"iat": null})), &SignOptions::new()).unwrap();
        let iat = assembled.get("iat").and_then(Value::as_i64).unwrap();
        assert!(iat >= before && iat <= now_timestamp());
    }

    #[test]
    fn header_defaults_and_overrides() {
        assert_eq!(
            resolve_header(&SignOptions::new()).as_map(),
            json!({"alg": "HS256", "typ": "JWT"}).as_object().unwrap()
        );

        let options = SignOptions::new()
            .with_algorithm("ES256")
            .with_header_field("alg", "RS256")
            .with_key_id("k1");
        let header = resolve_header(&options);
        assert_eq!(header.alg(), Some("RS256"));
        assert_eq!(header.get("kid"), Some(&json!("k1")));
    }

    #[test]
    fn prepare_exposes_assembled_token() {
        let issuer = TokenIssuer::new();
        let pending = issuer
            .prepare(
                &claims(json!({"sub": "u1"})),
                SignOptions::new()
                    .with_encoding(PayloadEncoding::Latin1)
                    .exclude_iat(),
            )
            .unwrap();

        assert_eq!(pending.header().alg(), Some("HS256"));
        assert_eq!(pending.claims().as_map(), json!({"sub": "u1"}).as_object().unwrap());
        assert_eq!(pending.encoding(), PayloadEncoding::Latin1);
    }
}
