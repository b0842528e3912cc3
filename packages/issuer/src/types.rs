//! Value types flowing through the issuer

use crate::error::{IssuerError, IssuerResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Algorithm used when neither the options nor the header name one.
pub const DEFAULT_ALGORITHM: &str = "HS256";

/// The `typ` header value of every issued token.
pub const TOKEN_TYPE: &str = "JWT";

/// Open-ended claim set: claim name to JSON value.
///
/// Serializes as a plain JSON object. Order of insertion is kept when the
/// claims are serialized but carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    /// Create an empty claim set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build a claim set from any serializable value.
    ///
    /// # Errors
    /// Returns `IssuerError::SigningFailed` if the value cannot be serialized
    /// or does not serialize to a JSON object.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> IssuerResult<Self> {
        let value = serde_json::to_value(value)
            .map_err(|e| IssuerError::signing_failed(&e.to_string()))?;
        Self::try_from(value)
    }

    /// Look up a claim by name
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Whether the claim is present, `null` values included
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Set a claim, returning the previous value
    #[inline]
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    /// Remove a claim, returning its value
    #[inline]
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    /// Number of claims
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set holds no claims
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over claim names and values
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Borrow the underlying JSON object
    #[inline]
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Take the underlying JSON object
    #[inline]
    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Claims {
    type Error = IssuerError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(IssuerError::signing_failed(&format!(
                "claims must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Claims {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Token header: `alg`, `typ` and any caller supplied fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Header(Map<String, Value>);

impl Header {
    /// Header with the given algorithm and `typ` set to `JWT`
    #[must_use]
    pub fn new(alg: &str) -> Self {
        let mut fields = Map::new();
        fields.insert("alg".to_string(), Value::String(alg.to_string()));
        fields.insert("typ".to_string(), Value::String(TOKEN_TYPE.to_string()));
        Self(fields)
    }

    /// Overlay caller fields; each supplied field replaces the computed one,
    /// `alg` and `typ` included.
    #[must_use]
    pub fn merged(mut self, overrides: &Map<String, Value>) -> Self {
        for (name, value) in overrides {
            self.0.insert(name.clone(), value.clone());
        }
        self
    }

    /// The `alg` field when it is a string
    #[inline]
    #[must_use]
    pub fn alg(&self) -> Option<&str> {
        self.0.get("alg").and_then(Value::as_str)
    }

    /// The `typ` field when it is a string
    #[inline]
    #[must_use]
    pub fn typ(&self) -> Option<&str> {
        self.0.get("typ").and_then(Value::as_str)
    }

    /// Look up any header field
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Borrow the header fields
    #[inline]
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::new(DEFAULT_ALGORITHM)
    }
}

/// Signed token string wrapper
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenString(pub String);

impl TokenString {
    /// Borrow the token text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the token text
    #[inline]
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for TokenString {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl AsRef<str> for TokenString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TokenString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn header_overrides_win_per_field() {
        let overrides = json!({"kid": "k1", "typ": "at+jwt"});
        let header = Header::new("RS256").merged(overrides.as_object().unwrap());

        assert_eq!(header.alg(), Some("RS256"));
        assert_eq!(header.typ(), Some("at+jwt"));
        assert_eq!(header.get("kid"), Some(&json!("k1")));
        assert_eq!(
            serde_json::to_string(&header).unwrap(),
            r#"{"alg":"RS256","typ":"at+jwt","kid":"k1"}"#
        );
    }

    #[test]
    fn claims_reject_non_objects() {
        let err = Claims::try_from(json!([1, 2])).unwrap_err();
        assert_eq!(err.message(), "claims must be a JSON object, got an array");

        let err = Claims::from_serialize("just a string").unwrap_err();
        assert!(err.message().contains("a string"));
    }

    #[test]
    fn claims_from_serializable_struct() {
        #[derive(Serialize)]
        struct Session {
            sub: &'static str,
            admin: bool,
        }

        let claims = Claims::from_serialize(&Session { sub: "u1", admin: true }).unwrap();
        assert_eq!(claims.get("sub"), Some(&json!("u1")));
        assert_eq!(claims.get("admin"), Some(&json!(true)));
        assert_eq!(claims.len(), 2);
    }

    #[test]
    fn null_claims_count_as_present() {
        let claims: Claims = [("aud", Value::Null)].into_iter().collect();
        assert!(claims.contains("aud"));
        assert!(!claims.contains("iss"));
    }
}
