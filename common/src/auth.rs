// common/src/auth.rs
//! Token issuance and verification.
//!
//! Access tokens are HS256 JWTs carrying the user id as `sub`. Expiry is
//! checked on every verification with no leeway and is never refreshed.
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::JwtConfig;
use crate::error::AuthError;

// JWT Claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,       // user id
    pub exp: usize,        // expiration time
    pub iat: usize,        // issued at time
}

#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn from_config(config: &JwtConfig) -> Self {
        Self::new(config.secret.as_bytes(), Duration::from_secs(config.ttl_secs))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a signed token for `subject`, valid for the configured ttl
    pub fn issue(&self, subject: &str) -> Result<String, AuthError> {
        let now = chrono::Utc::now().timestamp().max(0) as usize;

        let claims = JwtClaims {
            sub: subject.to_string(),
            iat: now,
            exp: now + self.ttl.as_secs() as usize,
        };

        self.sign(&claims)
    }

    fn sign(&self, claims: &JwtClaims) -> Result<String, AuthError> {
        Ok(encode(&Header::new(Algorithm::HS256), claims, &self.encoding)?)
    }

    /// Validate signature and expiry, returning the decoded claims
    pub fn verify(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let token_data = decode::<JwtClaims>(token, &self.decoding, &validation)?;

        if token_data.claims.sub.is_empty() {
            return Err(AuthError::InvalidToken("empty subject".to_string()));
        }

        Ok(token_data.claims)
    }

    /// Validate a token and extract its subject identifier
    pub fn subject(&self, token: &str) -> Result<String, AuthError> {
        self.verify(token).map(|claims| claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_TOKEN_TTL_SECS;

    fn service() -> TokenService {
        TokenService::new(b"test-secret", Duration::from_secs(DEFAULT_TOKEN_TTL_SECS))
    }

    #[test]
    fn issued_token_round_trips_subject() {
        let tokens = service();
        let token = tokens.issue("64f0c1").unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "64f0c1");
        assert_eq!(claims.exp - claims.iat, 259_200);
        assert_eq!(tokens.subject(&token).unwrap(), "64f0c1");
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let other = TokenService::new(b"other-secret", Duration::from_secs(60));
        let token = other.issue("user").unwrap();

        assert!(matches!(service().verify(&token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = service();
        let now = chrono::Utc::now().timestamp() as usize;
        let token = tokens
            .sign(&JwtClaims {
                sub: "user".to_string(),
                iat: now - 7200,
                exp: now - 3600,
            })
            .unwrap();

        assert!(matches!(tokens.verify(&token), Err(AuthError::Expired)));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            service().verify("invalid.token.here"),
            Err(AuthError::InvalidToken(_))
        ));
    }
}
