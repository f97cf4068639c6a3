// Copyright (c) Photogram Team
// SPDX-License-Identifier: Apache-2.0

//! Bearer-token issuance/verification and credential hashing. The rest
//! of the system treats both as opaque: handlers exchange a password for
//! a token once, and the extractor turns a token back into a user id.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i32,
    pub exp: i64,
}

/// Create an encoded access token carrying the user id.
pub fn create_access_token(user_id: i32) -> Result<String, AppError> {
    let config = Config::get();
    let expires = Utc::now() + Duration::minutes(config.auth.token_expiry_minutes);
    let claims = Claims {
        user_id,
        exp: expires.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.auth.secret_key.as_bytes()),
    )
    .map_err(AppError::Token)
}

/// Verify an access token and return the user id it carries. Any decode
/// failure (bad signature, expired, garbage) reads as unauthenticated.
pub fn verify_access_token(token: &str) -> Result<i32, AppError> {
    let config = Config::get();
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.auth.secret_key.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims.user_id)
    .map_err(|_| AppError::Unauthenticated)
}

/// Hash a plaintext password for storage.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(AppError::from)
}

/// Check a plaintext password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    bcrypt::verify(password, hash).map_err(AppError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip() {
        let token = create_access_token(42).unwrap();
        assert_eq!(verify_access_token(&token).unwrap(), 42);
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = Config::get();
        let claims = Claims {
            user_id: 42,
            // Well past the default decode leeway.
            exp: (Utc::now() - Duration::hours(2)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.auth.secret_key.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            verify_access_token(&token),
            Err(AppError::Unauthenticated)
        ));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let token = create_access_token(42).unwrap();
        let mut tampered = token.into_bytes();
        let last = tampered.len() - 1;
        tampered[last] = if tampered[last] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(tampered).unwrap();

        assert!(matches!(
            verify_access_token(&tampered),
            Err(AppError::Unauthenticated)
        ));
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(matches!(
            verify_access_token("not-a-token"),
            Err(AppError::Unauthenticated)
        ));
    }

    #[test]
    fn password_hash_verifies() {
        // Low cost keeps the test fast; production hashing uses DEFAULT_COST.
        let hash = bcrypt::hash("hunter2", 4).unwrap();
        assert!(verify_password("hunter2", &hash).unwrap());
        assert!(!verify_password("hunter3", &hash).unwrap());
    }
}
