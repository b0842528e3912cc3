//! Property tests for claim assembly

mod common;

use common::RecordingPrimitive;
use cryypt_issuer::{
    claims::CONFLICT_CHECKED_CLAIMS, Claims, IssuerError, RegisteredClaims, SignOptions,
    TokenIssuer,
};
use futures::executor::block_on;
use proptest::prelude::*;
use serde_json::{json, Value};
use std::sync::Arc;

fn registered_from(mask: &[bool], value: &Value) -> RegisteredClaims {
    let mut payload = RegisteredClaims::new();
    for (name, set) in CONFLICT_CHECKED_CLAIMS.iter().zip(mask) {
        if !set {
            continue;
        }
        let slot = match *name {
            "aud" => &mut payload.aud,
            "iss" => &mut payload.iss,
            "sub" => &mut payload.sub,
            "jti" => &mut payload.jti,
            "exp" => &mut payload.exp,
            _ => &mut payload.nbf,
        };
        *slot = Some(value.clone());
    }
    payload
}

fn claims_from(mask: &[bool], extra: &[(String, i64)]) -> Claims {
    let mut claims: Claims = extra
        .iter()
        .map(|(name, value)| (format!("x_{name}"), json!(value)))
        .collect();
    for (name, set) in CONFLICT_CHECKED_CLAIMS.iter().zip(mask) {
        if *set {
            claims.insert(*name, json!("from-claims"));
        }
    }
    claims
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn conflict_iff_names_overlap(
        in_claims in prop::collection::vec(any::<bool>(), 6),
        in_payload in prop::collection::vec(any::<bool>(), 6),
        extra in prop::collection::vec(("[a-z]{1,8}", any::<i64>()), 0..4),
    ) {
        let source = claims_from(&in_claims, &extra);
        let snapshot = source.clone();
        let primitive = Arc::new(RecordingPrimitive::default());
        let issuer = TokenIssuer::with_primitive(primitive.clone());
        let options = SignOptions::new()
            .with_key("k")
            .with_payload(registered_from(&in_payload, &json!("from-options")));

        let expected = CONFLICT_CHECKED_CLAIMS
            .iter()
            .zip(in_claims.iter().zip(&in_payload))
            .find(|(_, (a, b))| **a && **b)
            .map(|(name, _)| *name);

        let result = block_on(issuer.issue(&source, options));

        match expected {
            Some(name) => {
                prop_assert_eq!(result, Err(IssuerError::ClaimConflict(name.to_string())));
                prop_assert_eq!(primitive.calls(), 0);
            }
            None => {
                prop_assert!(result.is_ok());
                prop_assert_eq!(primitive.calls(), 1);
                let (_, payload, _) = primitive.last().expect("one call");
                let payload: Value = serde_json::from_str(&payload).expect("JSON payload");
                for (i, name) in CONFLICT_CHECKED_CLAIMS.iter().enumerate() {
                    let want = if in_claims[i] {
                        Some(json!("from-claims"))
                    } else if in_payload[i] {
                        Some(json!("from-options"))
                    } else {
                        None
                    };
                    prop_assert_eq!(payload.get(*name).cloned(), want);
                }
                prop_assert!(payload.get("iat").is_some());
            }
        }

        prop_assert_eq!(source, snapshot);
    }

    #[test]
    fn iat_exclusion_always_removes_iat(
        iat in prop::option::of(any::<i64>()),
        exclude in any::<bool>(),
    ) {
        let mut source = Claims::new();
        if let Some(iat) = iat {
            source.insert("iat", iat);
        }

        let issuer = TokenIssuer::new();
        let pending = issuer
            .prepare(&source, SignOptions::new().with_iat_exclude(exclude))
            .expect("no conflict");

        if exclude {
            prop_assert!(!pending.claims().contains("iat"));
        } else if let Some(iat) = iat {
            prop_assert_eq!(pending.claims().get("iat"), Some(&json!(iat)));
        } else {
            prop_assert!(pending.claims().get("iat").and_then(Value::as_i64).is_some());
        }
        prop_assert_eq!(source.get("iat").and_then(Value::as_i64), iat);
    }
}
