//! Password hashing and bearer-token authentication.
//!
//! Tokens are HS256 JWTs carrying the user id and role. They have no expiry;
//! a token stays valid for as long as its user exists. Every protected route
//! resolves the token to the freshly loaded user record, and authorization
//! decisions use the stored role rather than the role claim.

use axum::http::{header, HeaderMap};
use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use tracing::debug;

use crate::error::ApiResult;
use crate::models::{Claims, Role, User};
use crate::store::Storage;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authorization token required")]
    Missing,

    #[error("Invalid or expired token")]
    Invalid,
}

pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    hash(password, cost)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password, hash)
}

/// Extract the token from an `Authorization: Bearer <token>` header.
/// The scheme is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::Missing)?
        .to_str()
        .map_err(|_| AuthError::Invalid)?
        .trim();

    let (scheme, token) = value.split_once(char::is_whitespace).ok_or(AuthError::Invalid)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::Invalid);
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::Invalid);
    }
    Ok(token)
}

/// Issues and verifies tokens, and resolves them to stored users.
#[derive(Clone)]
pub struct Authenticator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    storage: Storage,
}

impl Authenticator {
    pub fn new(secret: &str, storage: Storage) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Tokens carry no `exp`
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            storage,
        }
    }

    pub fn issue_token(&self, user_id: &str, role: Role) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: user_id.to_owned(),
            role,
            iat: Utc::now().timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
    }

    /// Check signature and shape only. Callers that authorize anything must
    /// go through [`Authenticator::resolve`] instead.
    pub fn decode_claims(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "token rejected");
                AuthError::Invalid
            })
    }

    /// Verify `token` and load the user it names. A token whose user no
    /// longer exists is invalid. Blocking: reads the store.
    pub fn resolve(&self, token: &str) -> ApiResult<User> {
        let claims = self.decode_claims(token)?;
        match self.storage.get_user(&claims.sub)? {
            Some(user) => Ok(user),
            None => {
                debug!(user_id = %claims.sub, "token for unknown user");
                Err(AuthError::Invalid.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::store::fixtures::user;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_header_formats() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")), Ok("abc.def"));
        assert_eq!(bearer_token(&headers("bearer   abc.def ")), Ok("abc.def"));
        assert_eq!(bearer_token(&headers("BEARER abc")), Ok("abc"));
        assert_eq!(bearer_token(&headers("abc.def")), Err(AuthError::Invalid));
        assert_eq!(bearer_token(&headers("Basic abc")), Err(AuthError::Invalid));
        assert_eq!(bearer_token(&headers("Bearer ")), Err(AuthError::Invalid));
        assert_eq!(bearer_token(&HeaderMap::new()), Err(AuthError::Missing));
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hashed = hash_password("hunter22", 4).unwrap();
        assert_ne!(hashed, "hunter22");
        assert!(verify_password("hunter22", &hashed).unwrap());
        assert!(!verify_password("hunter23", &hashed).unwrap());
    }

    #[test]
    fn test_token_resolves_to_stored_user() {
        let storage = Storage::temporary().unwrap();
        storage.create_user(&user("u1", "u1@example.com", Role::User)).unwrap();
        let auth = Authenticator::new("test-secret", storage);

        let token = auth.issue_token("u1", Role::User).unwrap();
        let claims = auth.decode_claims(&token).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.role, Role::User);

        let resolved = auth.resolve(&token).unwrap();
        assert_eq!(resolved.email, "u1@example.com");
    }

    #[test]
    fn test_foreign_or_orphaned_tokens_are_invalid() {
        let storage = Storage::temporary().unwrap();
        let auth = Authenticator::new("test-secret", storage.clone());
        let other = Authenticator::new("other-secret", storage);

        let forged = other.issue_token("u1", Role::Admin).unwrap();
        assert_eq!(auth.decode_claims(&forged).unwrap_err(), AuthError::Invalid);
        assert_eq!(auth.decode_claims("not-a-jwt").unwrap_err(), AuthError::Invalid);

        // Well-signed, but nobody with that id exists
        let orphan = auth.issue_token("ghost", Role::User).unwrap();
        let err = auth.resolve(&orphan).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }
}
