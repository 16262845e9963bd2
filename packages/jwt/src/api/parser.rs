//! Compact token parsing
//!
//! Decodes `header.payload.signature` into a [`Token`]. The signature is
//! decoded but never checked here; only the validator may trust claims.

use crate::api::algorithms::Algorithm;
use crate::api::algorithms::utils::base64_url_decode;
use crate::claims::Claims;
use crate::error::{JwtError, JwtResult};
use crate::types::{JwtHeader, Token};
use serde_json::Value;
use tracing::debug;

/// Stateless compact-token parser
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenParser;

impl TokenParser {
    /// Parse a compact token
    ///
    /// # Errors
    /// Returns `JwtError::MalformedToken` when the input is not three
    /// base64url segments, the header is not JSON or names no supported
    /// algorithm, or the payload is not a JSON object of well-typed claims.
    pub fn parse(compact: &str) -> JwtResult<Token> {
        let mut segments = compact.split('.');
        let (Some(header_b64), Some(payload_b64), Some(signature_b64), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(JwtError::malformed("expected three dot-separated segments"));
        };
        if header_b64.is_empty() || payload_b64.is_empty() {
            return Err(JwtError::malformed("empty header or payload segment"));
        }

        let header_json = decode_segment("header", header_b64)?;
        let header: JwtHeader = serde_json::from_slice(&header_json)
            .map_err(|e| JwtError::MalformedToken(format!("header is not a JOSE header: {e}")))?;
        let algorithm = Algorithm::from_header_name(&header.alg).ok_or_else(|| {
            JwtError::MalformedToken(format!("unsupported header algorithm {:?}", header.alg))
        })?;

        let payload_json = decode_segment("payload", payload_b64)?;
        let payload = match serde_json::from_slice::<Value>(&payload_json) {
            Ok(Value::Object(map)) => map,
            Ok(_) => return Err(JwtError::malformed("payload is not a JSON object")),
            Err(e) => {
                return Err(JwtError::MalformedToken(format!("payload is not JSON: {e}")));
            }
        };
        let claims = Claims::from_payload(payload)?;

        let signature = decode_segment("signature", signature_b64)?;

        debug!(algorithm = %algorithm, claims = claims.payload().len(), "token parsed");

        Ok(Token {
            header,
            algorithm,
            claims,
            signing_input: compact[..header_b64.len() + 1 + payload_b64.len()].to_string(),
            signature,
        })
    }
}

fn decode_segment(name: &str, segment: &str) -> JwtResult<Vec<u8>> {
    base64_url_decode(segment)
        .map_err(|e| JwtError::MalformedToken(format!("{name} is not base64url: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::algorithms::utils::base64_url_encode;

    fn compact(header: &str, payload: &str, signature: &[u8]) -> String {
        format!(
            "{}.{}.{}",
            base64_url_encode(header.as_bytes()),
            base64_url_encode(payload.as_bytes()),
            base64_url_encode(signature)
        )
    }

    #[test]
    fn signing_input_is_kept_verbatim() {
        let token = compact(r#"{"alg":"HS256"}"#, r#"{"uid":"abc123"}"#, b"sig");
        let parsed = TokenParser::parse(&token).unwrap();
        let (input, _) = token.rsplit_once('.').unwrap();
        assert_eq!(parsed.signing_input(), input);
        assert_eq!(parsed.signature(), b"sig");
        assert_eq!(parsed.header().typ, None);
    }

    #[test]
    fn header_algorithm_is_case_sensitive() {
        let token = compact(r#"{"alg":"hs256"}"#, "{}", b"sig");
        assert!(matches!(
            TokenParser::parse(&token),
            Err(JwtError::MalformedToken(_))
        ));
    }

    #[test]
    fn padded_segments_are_rejected() {
        let token = compact(r#"{"alg":"HS256"}"#, "{}", b"sig");
        let padded = format!("{token}==");
        assert!(TokenParser::parse(&padded).is_err());
    }
}
