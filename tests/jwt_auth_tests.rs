// SPDX-License-Identifier: MIT
// Copyright 2026 QuestPass Authors

//! JWT authentication tests.
//!
//! These tests verify that session tokens minted by `create_jwt` decode to
//! the claims the auth middleware expects.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use questpass::middleware::auth::{create_jwt, Claims};
use questpass::models::Identity;

fn identity() -> Identity {
    Identity {
        uid: "firebase-uid-123".to_string(),
        email: Some("fan@example.com".to_string()),
        display_name: Some("Fan".to_string()),
        photo_url: None,
    }
}

#[test]
fn test_jwt_roundtrip() {
    let signing_key = b"test_signing_key_32_bytes_long!!";

    let token = create_jwt(&identity(), signing_key).unwrap();

    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);
    let claims = decode::<Claims>(&token, &key, &validation)
        .expect("token should decode")
        .claims;

    assert_eq!(claims.sub, "firebase-uid-123");
    assert_eq!(claims.email.as_deref(), Some("fan@example.com"));
    assert_eq!(claims.name.as_deref(), Some("Fan"));
    assert!(claims.picture.is_none());
    assert!(claims.exp > claims.iat);
}

#[test]
fn test_jwt_wrong_key_fails() {
    let token = create_jwt(&identity(), b"signing_key_one_32_bytes_long!!!").unwrap();

    let key = DecodingKey::from_secret(b"signing_key_two_32_bytes_long!!!");
    let validation = Validation::new(Algorithm::HS256);

    assert!(decode::<Claims>(&token, &key, &validation).is_err());
}

#[test]
fn test_jwt_rejects_other_algorithms() {
    let token = create_jwt(&identity(), b"test_signing_key_32_bytes_long!!").unwrap();

    let key = DecodingKey::from_secret(b"test_signing_key_32_bytes_long!!");
    let validation = Validation::new(Algorithm::HS512);

    assert!(decode::<Claims>(&token, &key, &validation).is_err());
}
