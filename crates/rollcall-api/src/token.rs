//! Signed bearer tokens.
//!
//! A token is `base64url(claims_json) "." base64url(hmac_sha256(payload))`,
//! where the MAC covers the encoded payload. The server keeps no session
//! state; a token is valid until its `exp` passes.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD as B64};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum TokenError {
  #[error("token secret must not be empty")]
  EmptySecret,

  #[error("malformed token")]
  Malformed,

  #[error("bad token signature")]
  BadSignature,

  #[error("token expired")]
  Expired,

  #[error("token lifetime must be positive")]
  InvalidTtl,

  #[error("token expiry is out of range")]
  ExpiryOverflow,

  #[error("claims encoding error: {0}")]
  Encode(#[from] serde_json::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
  sub: Uuid,
  iat: i64,
  exp: i64,
}

/// Issues and verifies tokens with a single shared secret.
#[derive(Clone)]
pub struct TokenSigner {
  mac: HmacSha256,
  ttl: Duration,
}

impl TokenSigner {
  pub fn new(secret: &[u8], ttl: Duration) -> Result<Self, TokenError> {
    if secret.is_empty() {
      return Err(TokenError::EmptySecret);
    }
    if ttl <= Duration::zero() {
      return Err(TokenError::InvalidTtl);
    }
    let mac = HmacSha256::new_from_slice(secret).map_err(|_| TokenError::EmptySecret)?;
    Ok(Self { mac, ttl })
  }

  /// A token for `account_id`, valid from `now` for the configured TTL.
  pub fn issue(&self, account_id: Uuid, now: DateTime<Utc>) -> Result<String, TokenError> {
    let claims = Claims {
      sub: account_id,
      iat: now.timestamp(),
      exp: now
        .checked_add_signed(self.ttl)
        .ok_or(TokenError::ExpiryOverflow)?
        .timestamp(),
    };
    let payload = B64.encode(serde_json::to_vec(&claims)?);

    let mut mac = self.mac.clone();
    mac.update(payload.as_bytes());
    let signature = B64.encode(mac.finalize().into_bytes());

    Ok(format!("{payload}.{signature}"))
  }

  /// The account id a token was issued for, if its signature is valid and it
  /// has not expired at `now`.
  pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Uuid, TokenError> {
    let (payload, signature) = token.split_once('.').ok_or(TokenError::Malformed)?;
    let signature = B64.decode(signature).map_err(|_| TokenError::Malformed)?;

    let mut mac = self.mac.clone();
    mac.update(payload.as_bytes());
    mac
      .verify_slice(&signature)
      .map_err(|_| TokenError::BadSignature)?;

    let bytes = B64.decode(payload).map_err(|_| TokenError::Malformed)?;
    let claims: Claims = serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)?;

    if now.timestamp() >= claims.exp {
      return Err(TokenError::Expired);
    }
    Ok(claims.sub)
  }
}
