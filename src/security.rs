//! Password hashing and session tokens.
//!
//! Passwords are stored as `salt$sha256(salt || password)`, both hex encoded. Tokens are
//! `account_id.role.expires_at.signature` where the signature is HMAC-SHA256 over the
//! first three fields.

use crate::domain::RoleType;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::fmt;
use subtle::ConstantTimeEq;

const SALT_LEN: usize = 16;

type HmacSha256 = Hmac<Sha256>;

/// Claims carried by a verified session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenClaims {
    pub account_id: i32,
    pub role: RoleType,
    pub expires_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    Malformed,
    BadSignature,
    Expired,
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::Malformed => write!(f, "malformed token"),
            TokenError::BadSignature => write!(f, "token signature mismatch"),
            TokenError::Expired => write!(f, "token expired"),
        }
    }
}

impl std::error::Error for TokenError {}

/// Password and token operations used by the HTTP layer.
pub trait Credentials: Send + Sync {
    fn hash_password(&self, password: &str) -> String;

    fn verify_password(&self, password: &str, stored: &str) -> bool;

    fn issue_token(&self, account_id: i32, role: RoleType, now: DateTime<Utc>) -> String;

    fn verify_token(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError>;
}

/// Salted SHA-256 passwords and HMAC-SHA256 signed tokens.
pub struct Sha256Credentials {
    /// Keyed with the token secret; cloned per signature.
    mac: HmacSha256,
    ttl: Duration,
}

impl Sha256Credentials {
    pub fn new(secret: &str, ttl_seconds: i64) -> Self {
        Self {
            mac: HmacSha256::new_from_slice(secret.as_bytes())
                .expect("HMAC accepts keys of any length"),
            ttl: Duration::seconds(ttl_seconds),
        }
    }

    fn sign(&self, payload: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn signature_matches(&self, payload: &str, signature: &str) -> bool {
        let Ok(signature) = hex::decode(signature) else {
            return false;
        };
        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature).is_ok()
    }
}

impl Credentials for Sha256Credentials {
    fn hash_password(&self, password: &str) -> String {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let salt = hex::encode(salt);
        format!("{salt}${}", salted_digest(&salt, password))
    }

    fn verify_password(&self, password: &str, stored: &str) -> bool {
        match stored.split_once('$') {
            Some((salt, digest)) => {
                salted_digest(salt, password).as_bytes().ct_eq(digest.as_bytes()).into()
            }
            None => false,
        }
    }

    fn issue_token(&self, account_id: i32, role: RoleType, now: DateTime<Utc>) -> String {
        let expires_at = (now + self.ttl).timestamp();
        let payload = format!("{account_id}.{role}.{expires_at}");
        let signature = self.sign(&payload);
        format!("{payload}.{signature}")
    }

    fn verify_token(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        let (payload, signature) = token.rsplit_once('.').ok_or(TokenError::Malformed)?;
        if !self.signature_matches(payload, signature) {
            return Err(TokenError::BadSignature);
        }

        let mut fields = payload.splitn(3, '.');
        let (Some(account_id), Some(role), Some(expires_at)) =
            (fields.next(), fields.next(), fields.next())
        else {
            return Err(TokenError::Malformed);
        };
        let claims = TokenClaims {
            account_id: account_id.parse().map_err(|_| TokenError::Malformed)?,
            role: role.parse().map_err(|_| TokenError::Malformed)?,
            expires_at: expires_at.parse().map_err(|_| TokenError::Malformed)?,
        };

        if now.timestamp() > claims.expires_at {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}

fn salted_digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}
