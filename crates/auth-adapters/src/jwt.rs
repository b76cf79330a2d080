//! HS256 bearer tokens via `jsonwebtoken`.

use chrono::{Duration, Utc};
use domains::{DomainError, Identity, Result, TokenIssuer, User};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    uid: i64,
    username: String,
    iat: i64,
    exp: i64,
}

pub struct JwtIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtIssuer {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }
}

impl TokenIssuer for JwtIssuer {
    fn issue(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            uid: user.id,
            username: user.username.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(DomainError::internal)
    }

    fn verify(&self, token: &str) -> Result<Identity> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default()).map_err(|err| {
            debug!(error = %err, "token rejected");
            DomainError::Unauthorized("Invalid or expired token".into())
        })?;
        Ok(Identity { user_id: data.claims.uid, username: data.claims.username })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User { id: 42, username: "jane_doe".into(), password_hash: String::new(), created_at: Utc::now() }
    }

    #[test]
    fn issued_token_verifies() {
        let issuer = JwtIssuer::new(b"test-secret", Duration::hours(1));
        let token = issuer.issue(&user()).unwrap();
        let identity = issuer.verify(&token).unwrap();
        assert_eq!(identity, Identity { user_id: 42, username: "jane_doe".into() });
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = JwtIssuer::new(b"one", Duration::hours(1)).issue(&user()).unwrap();
        let err = JwtIssuer::new(b"two", Duration::hours(1)).verify(&token).unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let issuer = JwtIssuer::new(b"test-secret", Duration::hours(-2));
        let token = issuer.issue(&user()).unwrap();
        assert!(issuer.verify(&token).is_err());
    }

    #[test]
    fn malformed_token_is_rejected() {
        let issuer = JwtIssuer::new(b"s", Duration::hours(1));
        assert!(issuer.verify("not.a.token").is_err());
        assert!(issuer.verify("").is_err());
    }
}
