use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id the token was issued for.
    pub sub: String,
    /// Issue time, unix seconds. Compared against password-change time.
    pub iat: i64,
    /// Expiry, unix seconds.
    pub exp: i64,
}

pub fn sign(user_id: &str, secret: &[u8], ttl_secs: i64) -> Result<String, Error> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now,
        exp: now + ttl_secs,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret))
        .map_err(|e| Error::Internal(format!("token signing failed: {e}")))
}

pub fn verify(token: &str, secret: &[u8]) -> Result<Claims, Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| Error::Unauthorized("invalid or expired token".to_string()))
}
