use super::config::JwtConfig;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Claims of an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// User ID
    pub sub: String,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

impl JwtClaims {
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

/// Stateless HS256 token issuer and verifier.
#[derive(Clone)]
pub struct JwtAuth {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
    ttl_seconds: i64,
}

impl JwtAuth {
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret.as_bytes();
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret)),
            decoding: Arc::new(DecodingKey::from_secret(secret)),
            ttl_seconds: config.expires_in.as_secs() as i64,
        }
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    pub fn create_token(&self, user_id: Uuid, email: &str) -> eyre::Result<String> {
        self.create_token_with_ttl(user_id, email, self.ttl_seconds)
    }

    fn create_token_with_ttl(
        &self,
        user_id: Uuid,
        email: &str,
        ttl_seconds: i64,
    ) -> eyre::Result<String> {
        let iat = Utc::now().timestamp();
        let claims = JwtClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            exp: iat + ttl_seconds,
            iat,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(token)
    }

    /// Checks signature and expiry and returns the decoded claims.
    pub fn verify_token(&self, token: &str) -> eyre::Result<JwtClaims> {
        let token_data = decode::<JwtClaims>(
            token,
            &self.decoding,
            &Validation::new(Algorithm::HS256),
        )?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new("this-is-a-valid-secret-with-32-chars!"))
    }

    #[test]
    fn test_token_carries_subject_and_email() {
        let auth = auth();
        let user_id = Uuid::now_v7();

        let token = auth.create_token(user_id, "ada@example.com").unwrap();
        let claims = auth.verify_token(&token).unwrap();

        assert_eq!(claims.user_id(), Some(user_id));
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.exp - claims.iat, 86_400);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let auth = auth();
        let token = auth
            .create_token_with_ttl(Uuid::now_v7(), "ada@example.com", -3600)
            .unwrap();

        assert!(auth.verify_token(&token).is_err());
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let other = JwtAuth::new(&JwtConfig::new("another-secret-that-is-long-enough-too"));
        let token = other.create_token(Uuid::now_v7(), "ada@example.com").unwrap();

        assert!(auth().verify_token(&token).is_err());
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        assert!(auth().verify_token("not.a.jwt").is_err());
    }
}
