//! Claim sets and the registered (standard) claims.

use crate::error::{JwtError, JwtResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Issuer claim name
pub const ISSUER: &str = "iss";
/// Subject claim name
pub const SUBJECT: &str = "sub";
/// Audience claim name
pub const AUDIENCE: &str = "aud";
/// Expiration time claim name
pub const EXPIRES_AT: &str = "exp";
/// Not-before claim name
pub const NOT_BEFORE: &str = "nbf";
/// Issued-at claim name
pub const ISSUED_AT: &str = "iat";
/// JWT ID claim name
pub const JWT_ID: &str = "jti";

/// Registered claim names; none of them may be set as a custom claim
pub const REGISTERED_CLAIMS: [&str; 7] = [
    ISSUER, SUBJECT, AUDIENCE, EXPIRES_AT, NOT_BEFORE, ISSUED_AT, JWT_ID,
];

/// Whether `name` is a registered claim name
#[must_use]
pub fn is_registered_claim(name: &str) -> bool {
    REGISTERED_CLAIMS.contains(&name)
}

/// Ordered mapping from claim name to JSON value
///
/// Insertion order is kept so custom claims serialise deterministically.
/// Equality ignores order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet(Map<String, Value>);

impl ClaimSet {
    /// Empty claim set
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Add a claim, builder style
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a claim, returning the previous value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    /// Claim value by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Whether a claim named `name` is present
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Claims in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Number of claims
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set holds no claims
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Underlying JSON object
    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl PartialEq for ClaimSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(name, value)| other.get(name) == Some(value))
    }
}

impl From<Map<String, Value>> for ClaimSet {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ClaimSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for ClaimSet {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<'a> IntoIterator for &'a ClaimSet {
    type Item = (&'a String, &'a Value);
    type IntoIter = serde_json::map::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The seven registered claims, typed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisteredClaims {
    /// `iss`
    pub issuer: Option<String>,
    /// `sub`
    pub subject: Option<String>,
    /// `aud`; a single audience serialises as a string
    pub audience: Vec<String>,
    /// `iat`
    pub issued_at: Option<DateTime<Utc>>,
    /// `nbf`
    pub not_before: Option<DateTime<Utc>>,
    /// `exp`
    pub expires_at: Option<DateTime<Utc>>,
    /// `jti`
    pub jwt_id: Option<String>,
}

/// Complete token payload
///
/// Keeps the payload object exactly as issued or decoded; [`Claims::get`]
/// reads from it. The registered claims are also available typed, and the
/// non-registered ones as a [`ClaimSet`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Claims {
    registered: RegisteredClaims,
    custom: ClaimSet,
    payload: Map<String, Value>,
}

impl Claims {
    /// Claims for a new token: registered claims first, then custom claims
    #[must_use]
    pub fn new(registered: RegisteredClaims, custom: ClaimSet) -> Self {
        let mut payload = Map::new();
        let strings = [
            (ISSUER, &registered.issuer),
            (SUBJECT, &registered.subject),
        ];
        for (name, value) in strings {
            if let Some(value) = value {
                payload.insert(name.to_string(), Value::String(value.clone()));
            }
        }
        if let Some(audience) = audience_value(&registered.audience) {
            payload.insert(AUDIENCE.to_string(), audience);
        }
        let dates = [
            (ISSUED_AT, registered.issued_at),
            (NOT_BEFORE, registered.not_before),
            (EXPIRES_AT, registered.expires_at),
        ];
        for (name, value) in dates {
            if let Some(at) = value {
                payload.insert(name.to_string(), numeric_date(at));
            }
        }
        if let Some(jwt_id) = &registered.jwt_id {
            payload.insert(JWT_ID.to_string(), Value::String(jwt_id.clone()));
        }
        for (name, value) in &custom {
            payload.insert(name.clone(), value.clone());
        }

        Self {
            registered,
            custom,
            payload,
        }
    }

    /// Value of any claim, registered or custom, exactly as the payload carries it
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.payload.get(name)
    }

    /// Whether a claim named `name` is present
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.payload.contains_key(name)
    }

    /// Typed registered claims
    #[must_use]
    pub fn registered(&self) -> &RegisteredClaims {
        &self.registered
    }

    /// Claims outside the registered set, in payload order
    #[must_use]
    pub fn custom(&self) -> &ClaimSet {
        &self.custom
    }

    /// `iss`
    #[must_use]
    pub fn issuer(&self) -> Option<&str> {
        self.registered.issuer.as_deref()
    }

    /// `sub`
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.registered.subject.as_deref()
    }

    /// `exp`
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.registered.expires_at
    }

    /// `iat`
    #[must_use]
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.registered.issued_at
    }

    /// JSON payload object
    #[must_use]
    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    /// Check and type a decoded payload object, keeping it as is
    ///
    /// # Errors
    /// Returns `JwtError::MalformedToken` when a registered claim has the wrong type.
    pub fn from_payload(payload: Map<String, Value>) -> JwtResult<Self> {
        let mut registered = RegisteredClaims::default();
        let mut custom = ClaimSet::new();

        for (name, value) in &payload {
            match name.as_str() {
                ISSUER => registered.issuer = Some(string_claim(ISSUER, value)?),
                SUBJECT => registered.subject = Some(string_claim(SUBJECT, value)?),
                JWT_ID => registered.jwt_id = Some(string_claim(JWT_ID, value)?),
                AUDIENCE => registered.audience = audience_claim(value)?,
                ISSUED_AT => registered.issued_at = Some(date_claim(ISSUED_AT, value)?),
                NOT_BEFORE => registered.not_before = Some(date_claim(NOT_BEFORE, value)?),
                EXPIRES_AT => registered.expires_at = Some(date_claim(EXPIRES_AT, value)?),
                _ => {
                    custom.insert(name.clone(), value.clone());
                }
            }
        }

        Ok(Self {
            registered,
            custom,
            payload,
        })
    }
}

fn audience_value(audience: &[String]) -> Option<Value> {
    match audience {
        [] => None,
        [single] => Some(Value::String(single.clone())),
        many => Some(Value::Array(many.iter().cloned().map(Value::String).collect())),
    }
}

/// NumericDate: whole seconds as an integer, otherwise seconds with microseconds
fn numeric_date(at: DateTime<Utc>) -> Value {
    let micros = at.timestamp_subsec_micros();
    if micros == 0 {
        return Value::Number(at.timestamp().into());
    }
    let seconds = at.timestamp() as f64 + f64::from(micros) / 1_000_000.0;
    Number::from_f64(seconds).map_or_else(|| Value::Number(at.timestamp().into()), Value::Number)
}

fn string_claim(name: &str, value: &Value) -> JwtResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        _ => Err(JwtError::MalformedToken(format!("{name} claim must be a string"))),
    }
}

fn audience_claim(value: &Value) -> JwtResult<Vec<String>> {
    match value {
        Value::String(s) => Ok(vec![s.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| string_claim(AUDIENCE, item))
            .collect(),
        _ => Err(JwtError::malformed(
            "aud claim must be a string or an array of strings",
        )),
    }
}

fn date_claim(name: &str, value: &Value) -> JwtResult<DateTime<Utc>> {
    let invalid = || JwtError::MalformedToken(format!("{name} claim must be a NumericDate"));
    let Value::Number(number) = value else {
        return Err(invalid());
    };
    if let Some(seconds) = number.as_i64() {
        return DateTime::from_timestamp(seconds, 0).ok_or_else(invalid);
    }
    let fractional = number.as_f64().ok_or_else(invalid)?;
    let seconds = fractional.floor();
    let nanos = ((fractional - seconds) * 1_000_000_000.0).round().min(999_999_999.0);
    if !(i64::MIN as f64..=i64::MAX as f64).contains(&seconds) {
        return Err(invalid());
    }
    DateTime::from_timestamp(seconds as i64, nanos as u32).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn registered_names_are_exactly_the_seven() {
        for name in ["iss", "sub", "aud", "exp", "nbf", "iat", "jti"] {
            assert!(is_registered_claim(name));
        }
        assert!(!is_registered_claim("uid"));
        assert!(!is_registered_claim("ISS"));
    }

    #[test]
    fn claim_set_equality_ignores_order() {
        let a = ClaimSet::new().with("a", 1).with("b", "two");
        let b = ClaimSet::new().with("b", "two").with("a", 1);
        assert_eq!(a, b);
        assert_ne!(a, ClaimSet::new().with("a", 1));
    }

    #[test]
    fn payload_keeps_custom_insertion_order() {
        let claims = Claims::new(
            RegisteredClaims {
                issuer: Some("https://a.example".into()),
                ..RegisteredClaims::default()
            },
            ClaimSet::new().with("zeta", 1).with("alpha", 2).with("mid", 3),
        );
        let keys: Vec<_> = claims.payload().keys().cloned().collect();
        assert_eq!(keys, ["iss", "zeta", "alpha", "mid"]);
    }

    #[test]
    fn fractional_numeric_dates_parse() {
        let map = json!({"exp": 1_700_000_000.25, "iat": 1_699_999_000})
            .as_object()
            .cloned()
            .unwrap();
        let claims = Claims::from_payload(map).unwrap();
        let exp = claims.expires_at().unwrap();
        assert_eq!(exp.timestamp(), 1_700_000_000);
        assert_eq!(exp.timestamp_subsec_millis(), 250);
        assert_eq!(claims.get("iat"), Some(&json!(1_699_999_000)));
        assert_eq!(claims.get("exp"), Some(&json!(1_700_000_000.25)));
    }

    #[test]
    fn wrongly_typed_registered_claims_are_malformed() {
        for payload in [
            json!({"iss": 42}),
            json!({"exp": "tomorrow"}),
            json!({"aud": [1, 2]}),
            json!({"aud": {"x": 1}}),
            json!({"jti": null}),
        ] {
            let map = payload.as_object().cloned().unwrap();
            assert!(matches!(
                Claims::from_payload(map),
                Err(JwtError::MalformedToken(_))
            ));
        }
    }

    #[test]
    fn single_audience_round_trips_as_string() {
        let map = json!({"aud": "api"}).as_object().cloned().unwrap();
        let claims = Claims::from_payload(map).unwrap();
        assert_eq!(claims.registered().audience, vec!["api".to_string()]);
        assert_eq!(claims.get("aud"), Some(&json!("api")));
    }

    #[test]
    fn decoded_registered_claims_keep_their_wire_form() {
        let map = json!({"aud": ["api"], "iat": 1_700_000_000.0, "uid": "abc123"})
            .as_object()
            .cloned()
            .unwrap();
        let claims = Claims::from_payload(map).unwrap();
        assert_eq!(claims.registered().audience, vec!["api".to_string()]);
        assert_eq!(claims.get("aud"), Some(&json!(["api"])));
        assert_eq!(claims.get("iat"), Some(&json!(1_700_000_000.0)));
        assert_eq!(claims.issued_at().unwrap().timestamp(), 1_700_000_000);
        assert!(claims.contains("uid"));
        assert!(!claims.custom().contains("aud"));
    }
}
