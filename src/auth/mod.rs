use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;

/// Claims carried by a client token. There is a single capability, `client`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "type")]
    pub kind: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn client(expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            kind: "client".to_string(),
            iat: now.timestamp(),
            exp,
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("JWT generation error: {0}")]
    Generation(String),

    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// A freshly signed token plus the lifetime advertised to the client.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: String,
}

pub fn generate_token(security: &SecurityConfig) -> Result<IssuedToken, TokenError> {
    if security.jwt_secret.is_empty() {
        return Err(TokenError::Generation("JWT secret not configured".to_string()));
    }

    let claims = Claims::client(security.jwt_expiry_hours);
    let encoding_key = EncodingKey::from_secret(security.jwt_secret.as_bytes());

    let token = encode(&Header::default(), &claims, &encoding_key)
        .map_err(|e| TokenError::Generation(e.to_string()))?;

    Ok(IssuedToken {
        token,
        expires_in: format_lifetime(security.jwt_expiry_hours),
    })
}

pub fn verify_token(token: &str, security: &SecurityConfig) -> Result<Claims, TokenError> {
    if security.jwt_secret.is_empty() {
        return Err(TokenError::Invalid("JWT secret not configured".to_string()));
    }

    let decoding_key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| TokenError::Invalid(e.to_string()))?;

    if token_data.claims.kind != "client" {
        return Err(TokenError::Invalid(format!(
            "unexpected token type '{}'",
            token_data.claims.kind
        )));
    }

    Ok(token_data.claims)
}

/// Compare the presented client secret against the configured one.
pub fn client_secret_matches(presented: Option<&str>, security: &SecurityConfig) -> bool {
    match (presented, security.client_secret.as_deref()) {
        (Some(presented), Some(expected)) => constant_time_eq(presented.as_bytes(), expected.as_bytes()),
        _ => false,
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// `168` becomes `"7d"`, `36` stays `"36h"`.
fn format_lifetime(hours: u64) -> String {
    if hours > 0 && hours % 24 == 0 {
        format!("{}d", hours / 24)
    } else {
        format!("{}h", hours)
    }
}
