//! Operator claims carried in the bearer token
//!
//! The payload is decoded, not verified. Verification happens server-side;
//! the terminal only reads the operator and branch to scope its requests.

use crate::{ClientError, ClientResult};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use brew_checkout::Operator;
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OperatorClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub operator_id: Option<String>,
    #[serde(default)]
    pub branch_id: Option<i64>,
    /// Expiry, unix seconds
    #[serde(default)]
    pub exp: Option<u64>,
}

impl OperatorClaims {
    /// Decode the payload segment of a JWT (header.payload.signature)
    pub fn decode(token: &str) -> ClientResult<Self> {
        let mut parts = token.split('.');
        let (Some(_), Some(payload), Some(_), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(ClientError::InvalidResponse("token is not a JWT".into()));
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| ClientError::InvalidResponse(format!("token payload: {}", e)))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Explicit `operator_id`, else the subject
    pub fn operator(&self) -> Option<&str> {
        self.operator_id.as_deref().or(self.sub.as_deref())
    }

    pub fn is_expired(&self, now_secs: u64) -> bool {
        self.exp.is_some_and(|exp| exp <= now_secs)
    }
}

impl From<OperatorClaims> for Operator {
    fn from(claims: OperatorClaims) -> Self {
        Operator {
            operator_id: claims.operator().map(str::to_string),
            branch_id: claims.branch_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(payload: &str) -> String {
        format!("eyJhbGciOiJIUzI1NiJ9.{}.c2ln", URL_SAFE_NO_PAD.encode(payload))
    }

    #[test]
    fn test_decode_operator_and_branch() {
        let claims =
            OperatorClaims::decode(&token(r#"{"sub":"u-7","branch_id":3,"exp":1900000000}"#)).unwrap();
        assert_eq!(claims.operator(), Some("u-7"));
        assert_eq!(claims.branch_id, Some(3));
        assert!(!claims.is_expired(1_800_000_000));
        assert!(claims.is_expired(1_900_000_000));

        let operator: Operator = claims.into();
        assert_eq!(operator.operator_id.as_deref(), Some("u-7"));
        assert_eq!(operator.branch_id, Some(3));
    }

    #[test]
    fn test_operator_id_overrides_subject() {
        let claims =
            OperatorClaims::decode(&token(r#"{"sub":"user@example","operator_id":"op-2"}"#)).unwrap();
        assert_eq!(claims.operator(), Some("op-2"));
        assert_eq!(claims.branch_id, None);
        assert!(!claims.is_expired(u64::MAX));
    }

    #[test]
    fn test_rejects_malformed_tokens() {
        assert!(OperatorClaims::decode("opaque-token").is_err());
        assert!(OperatorClaims::decode("a.b.c.d").is_err());
        assert!(OperatorClaims::decode("a.!!!.c").is_err());
        assert!(OperatorClaims::decode(&token("not json")).is_err());
    }
}
