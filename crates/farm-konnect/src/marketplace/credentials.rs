//! Password hashing (Argon2id, PHC strings) and bearer token issuance (HS256 JWT).

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::domain::UserId;

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("failed to hash password: {0}")]
    Hash(String),
    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("token subject is not a user id")]
    InvalidSubject,
    #[error("token lifetime of {0} days is out of range")]
    Lifetime(i64),
}

pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| CredentialError::Hash(err.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, CredentialError> {
    let parsed =
        PasswordHash::new(hash).map_err(|err| CredentialError::MalformedHash(err.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Signs and verifies the bearer tokens handed out at login and registration.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_days: i64,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_days: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_days,
        }
    }

    pub fn issue(&self, user: &UserId) -> Result<String, CredentialError> {
        let now = Utc::now();
        let expires = Duration::try_days(self.ttl_days)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or(CredentialError::Lifetime(self.ttl_days))?;
        let claims = Claims {
            sub: user.to_string(),
            iat: now.timestamp(),
            exp: expires.timestamp(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    /// Returns the user the token was issued to, rejecting bad signatures and expired tokens.
    pub fn verify(&self, token: &str) -> Result<UserId, CredentialError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        UserId::parse(&data.claims.sub).ok_or(CredentialError::InvalidSubject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_verifies_only_the_original() {
        let hash = hash_password("password123").expect("hash");
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("password123", &hash).expect("verify"));
        assert!(!verify_password("password124", &hash).expect("verify"));
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(matches!(
            verify_password("password123", "plaintext"),
            Err(CredentialError::MalformedHash(_))
        ));
    }

    #[test]
    fn tokens_round_trip_the_subject() {
        let issuer = TokenIssuer::new("test-secret", 30);
        let user = UserId::generate();
        let token = issuer.issue(&user).expect("issue");
        assert_eq!(issuer.verify(&token).expect("verify"), user);
    }

    #[test]
    fn tokens_from_another_secret_are_rejected() {
        let token = TokenIssuer::new("one", 30)
            .issue(&UserId::generate())
            .expect("issue");
        assert!(TokenIssuer::new("two", 30).verify(&token).is_err());
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let issuer = TokenIssuer::new("test-secret", -1);
        let token = issuer.issue(&UserId::generate()).expect("issue");
        assert!(issuer.verify(&token).is_err());
    }

    #[test]
    fn oversized_lifetime_is_an_error_not_a_panic() {
        let issuer = TokenIssuer::new("test-secret", 100_000_000);
        assert!(matches!(
            issuer.issue(&UserId::generate()),
            Err(CredentialError::Lifetime(100_000_000))
        ));
    }
}
