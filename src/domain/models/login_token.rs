use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Duration, Utc};
use rand::{distributions::Alphanumeric, Rng};
use sha2::{Digest, Sha256};
use sqlx::FromRow;

pub const LOGIN_TOKEN_TTL_MINUTES: i64 = 15;
const LOGIN_TOKEN_LENGTH: usize = 48;

/// Single-use portal credential. Only the SHA-256 digest of the emailed value is stored.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct LoginToken {
    pub id: String,
    pub customer_id: String,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_used: bool,
}

impl LoginToken {
    /// Returns the record to persist and the raw value to put in the link.
    pub fn issue(customer_id: String, now: DateTime<Utc>) -> (Self, String) {
        let raw: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(LOGIN_TOKEN_LENGTH)
            .map(char::from)
            .collect();

        let token = Self {
            id: Uuid::new_v4().to_string(),
            customer_id,
            token_hash: hash_token(&raw),
            created_at: now,
            expires_at: now + Duration::minutes(LOGIN_TOKEN_TTL_MINUTES),
            is_used: false,
        };

        (token, raw)
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.is_used && self.expires_at > now
    }
}

pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
