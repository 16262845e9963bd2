//! Engine configuration
//!
//! ```json
//! {
//!   "private_key": "file:///etc/tokenward/private.pem",
//!   "public_key": "file:///etc/tokenward/public.pem",
//!   "algorithm": "RS256",
//!   "expire_time": "+2 hour"
//! }
//! ```
//!
//! Leaving out either key makes the engine sign with an ephemeral HS256
//! secret, see [`crate::api::keys`].

use crate::error::{JwtError, JwtResult};
use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default algorithm name
pub const DEFAULT_ALGORITHM: &str = "RS256";

/// Default token lifetime expression
pub const DEFAULT_EXPIRE_TIME: &str = "+2 hour";

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    /// Signing key reference
    pub private_key: Option<String>,
    /// Verification key reference
    pub public_key: Option<String>,
    /// Algorithm name, case-insensitive
    pub algorithm: String,
    /// Lifetime of issued tokens
    pub expire_time: Ttl,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            private_key: None,
            public_key: None,
            algorithm: DEFAULT_ALGORITHM.to_string(),
            expire_time: Ttl::default(),
        }
    }
}

impl JwtConfig {
    /// Load from a JSON document
    ///
    /// # Errors
    /// Returns `JwtError::Configuration` when the document does not describe
    /// a configuration, including an unparseable `expire_time`.
    pub fn from_json(json: &str) -> JwtResult<Self> {
        serde_json::from_str(json).map_err(|e| JwtError::Configuration(e.to_string()))
    }

    /// Private and public key references
    #[must_use]
    pub fn with_keys(mut self, private_key: impl Into<String>, public_key: impl Into<String>) -> Self {
        self.private_key = Some(private_key.into());
        self.public_key = Some(public_key.into());
        self
    }

    /// Algorithm name, case-insensitive
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = algorithm.into();
        self
    }

    /// Token lifetime
    #[must_use]
    pub fn with_expire_time(mut self, expire_time: Ttl) -> Self {
        self.expire_time = expire_time;
        self
    }
}

/// Token lifetime
///
/// Either a number of seconds or a relative expression made of one or more
/// `[+|-]N unit` terms, e.g. `"+2 hour"` or `"1 day -30 min"`. Every unit has
/// a fixed length, so an expression reduces to a single offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TtlRepr", into = "TtlRepr")]
pub struct Ttl {
    source: TtlRepr,
    offset: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
enum TtlRepr {
    Seconds(i64),
    Expression(String),
}

impl Ttl {
    /// Lifetime of `seconds` seconds
    ///
    /// # Errors
    /// Returns `JwtError::InvalidTtl` for a negative or out-of-range value.
    pub fn seconds(seconds: i64) -> JwtResult<Self> {
        let invalid = || JwtError::InvalidTtl(seconds.to_string());
        if seconds < 0 {
            return Err(invalid());
        }
        let offset = Duration::try_seconds(seconds).ok_or_else(invalid)?;
        Ok(Self {
            source: TtlRepr::Seconds(seconds),
            offset,
        })
    }

    /// Parse a relative expression
    ///
    /// # Errors
    /// Returns `JwtError::InvalidTtl` when the text is not a sequence of
    /// `[+|-]N unit` terms or adds up to a negative offset.
    pub fn parse(expression: &str) -> JwtResult<Self> {
        let invalid = || JwtError::InvalidTtl(expression.to_string());
        let offset = parse_offset(expression).ok_or_else(invalid)?;
        if offset < Duration::zero() {
            return Err(invalid());
        }
        Ok(Self {
            source: TtlRepr::Expression(expression.to_string()),
            offset,
        })
    }

    /// Offset from issue time to expiry
    #[must_use]
    pub fn as_duration(&self) -> Duration {
        self.offset
    }

    /// Absolute expiry for a token issued at `now`
    ///
    /// # Errors
    /// Returns `JwtError::InvalidTtl` when the result is out of range.
    pub fn resolve(&self, now: DateTime<Utc>) -> JwtResult<DateTime<Utc>> {
        now.checked_add_signed(self.offset)
            .ok_or_else(|| JwtError::InvalidTtl(self.to_string()))
    }
}

impl Default for Ttl {
    fn default() -> Self {
        Self {
            source: TtlRepr::Expression(DEFAULT_EXPIRE_TIME.to_string()),
            offset: Duration::hours(2),
        }
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            TtlRepr::Seconds(seconds) => write!(f, "{seconds}"),
            TtlRepr::Expression(expression) => f.write_str(expression),
        }
    }
}

impl FromStr for Ttl {
    type Err = JwtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<i64>() {
            Ok(seconds) => Self::seconds(seconds),
            Err(_) => Self::parse(s),
        }
    }
}

impl TryFrom<TtlRepr> for Ttl {
    type Error = JwtError;

    fn try_from(repr: TtlRepr) -> Result<Self, Self::Error> {
        match repr {
            TtlRepr::Seconds(seconds) => Self::seconds(seconds),
            TtlRepr::Expression(expression) => expression.parse(),
        }
    }
}

impl From<Ttl> for TtlRepr {
    fn from(ttl: Ttl) -> Self {
        ttl.source
    }
}

static TERM: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"\s*([+-]?)\s*(\d+)\s*([a-z]+)\s*").ok());

/// Sum of all terms, `None` if any part of the text is not a term
fn parse_offset(expression: &str) -> Option<Duration> {
    let text = expression.trim().to_ascii_lowercase();
    if text == "now" {
        return Some(Duration::zero());
    }
    if text.is_empty() {
        return None;
    }

    let term = TERM.as_ref()?;
    let mut consumed = 0;
    let mut total = Duration::zero();
    for captures in term.captures_iter(&text) {
        let whole = captures.get(0)?;
        if whole.start() != consumed {
            return None;
        }
        consumed = whole.end();

        let amount: i64 = captures[2].parse().ok()?;
        let seconds = amount.checked_mul(unit_seconds(&captures[3])?)?;
        let term = Duration::try_seconds(seconds)?;
        total = if &captures[1] == "-" {
            total.checked_sub(&term)?
        } else {
            total.checked_add(&term)?
        };
    }
    (consumed == text.len()).then_some(total)
}

fn unit_seconds(unit: &str) -> Option<i64> {
    Some(match unit {
        "s" | "sec" | "secs" | "second" | "seconds" => 1,
        "m" | "min" | "mins" | "minute" | "minutes" => 60,
        "h" | "hour" | "hours" => 3_600,
        "d" | "day" | "days" => 86_400,
        "w" | "week" | "weeks" => 604_800,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expressions_reduce_to_offsets() {
        let cases = [
            ("+2 hour", Duration::hours(2)),
            ("+2 hours", Duration::hours(2)),
            ("90 sec", Duration::seconds(90)),
            ("+1 day -30 minutes", Duration::hours(24) - Duration::minutes(30)),
            ("1w", Duration::weeks(1)),
            ("+15m", Duration::minutes(15)),
            ("  +3 HOURS ", Duration::hours(3)),
            ("now", Duration::zero()),
        ];
        for (expression, expected) in cases {
            assert_eq!(Ttl::parse(expression).unwrap().as_duration(), expected, "{expression}");
        }
    }

    #[test]
    fn bad_expressions_are_refused() {
        for expression in ["", "soon", "+2 fortnights", "2 hours later", "-1 hour", "hour 2", "+ hour"] {
            assert!(
                matches!(Ttl::parse(expression), Err(JwtError::InvalidTtl(_))),
                "{expression}"
            );
        }
        assert!(Ttl::seconds(-5).is_err());
    }

    #[test]
    fn config_defaults_match_documented_values() {
        let config = JwtConfig::from_json("{}").unwrap();
        assert_eq!(config.algorithm, "RS256");
        assert_eq!(config.expire_time.as_duration(), Duration::hours(2));
        assert_eq!(config.expire_time.to_string(), "+2 hour");
        assert!(config.private_key.is_none());
    }

    #[test]
    fn expire_time_accepts_seconds_or_text() {
        let config = JwtConfig::from_json(r#"{"expire_time": 600}"#).unwrap();
        assert_eq!(config.expire_time.as_duration(), Duration::minutes(10));

        let config = JwtConfig::from_json(r#"{"expire_time": "+1 week"}"#).unwrap();
        assert_eq!(config.expire_time.as_duration(), Duration::weeks(1));

        assert!(matches!(
            JwtConfig::from_json(r#"{"expire_time": "eventually"}"#),
            Err(JwtError::Configuration(_))
        ));
    }

    #[test]
    fn ttl_serializes_back_to_its_source() {
        let config = JwtConfig::default().with_expire_time(Ttl::seconds(30).unwrap());
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["expire_time"], serde_json::json!(30));
    }
}
