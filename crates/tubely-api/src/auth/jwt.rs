//! HS256 bearer tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use tubely_core::constants::JWT_ISSUER;
use tubely_core::AppError;
use uuid::Uuid;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: Uuid, // user_id
    pub iss: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiry: Duration,
}

impl JwtManager {
    pub fn new(secret: &str, expiry_hours: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[JWT_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            expiry: Duration::hours(expiry_hours),
        }
    }

    /// Issue a token for `user_id`. Login lives outside this service; this is
    /// used by tooling and tests.
    pub fn issue(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user_id,
            iss: JWT_ISSUER.to_string(),
            exp: (now + self.expiry).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Validate a token and return the caller's user id.
    pub fn validate(&self, token: &str) -> Result<Uuid, AppError> {
        let data = decode::<JwtClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| {
                let reason = match e.kind() {
                    ErrorKind::ExpiredSignature => "Token has expired",
                    ErrorKind::InvalidIssuer => "Token issuer is invalid",
                    _ => "Invalid credential",
                };
                tracing::debug!(error = %e, "Rejected bearer token");
                AppError::Unauthenticated(reason.to_string())
            },
        )?;
        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_issue_and_validate() {
        let jwt = JwtManager::new(SECRET, 1);
        let user_id = Uuid::new_v4();
        let token = jwt.issue(user_id).unwrap();
        assert_eq!(jwt.validate(&token).unwrap(), user_id);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = JwtManager::new(SECRET, 1).issue(Uuid::new_v4()).unwrap();
        let other = JwtManager::new("fedcba9876543210fedcba9876543210", 1);
        assert!(matches!(
            other.validate(&token),
            Err(AppError::Unauthenticated(_))
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let jwt = JwtManager::new(SECRET, -2);
        let token = jwt.issue(Uuid::new_v4()).unwrap();
        match jwt.validate(&token) {
            Err(AppError::Unauthenticated(msg)) => assert_eq!(msg, "Token has expired"),
            other => panic!("Expected Unauthenticated, got {:?}", other),
        }
    }

    #[test]
    fn test_garbage_is_rejected() {
        let jwt = JwtManager::new(SECRET, 1);
        assert!(jwt.validate("not-a-jwt").is_err());
    }
}
