use crate::domain::{models::login_token::LoginToken, ports::LoginTokenRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;
use chrono::{DateTime, Utc};

pub struct SqliteLoginTokenRepo {
    pool: SqlitePool,
}

impl SqliteLoginTokenRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoginTokenRepository for SqliteLoginTokenRepo {
    async fn replace_active(&self, token: &LoginToken) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        sqlx::query("UPDATE login_tokens SET is_used = 1 WHERE customer_id = ? AND is_used = 0")
            .bind(&token.customer_id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        sqlx::query("INSERT INTO login_tokens (id, customer_id, token_hash, created_at, expires_at, is_used) VALUES (?, ?, ?, ?, ?, ?)")
            .bind(&token.id).bind(&token.customer_id).bind(&token.token_hash)
            .bind(token.created_at).bind(token.expires_at).bind(token.is_used)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn list_active(&self, now: DateTime<Utc>) -> Result<Vec<LoginToken>, AppError> {
        sqlx::query_as::<_, LoginToken>("SELECT * FROM login_tokens WHERE is_used = 0 AND expires_at > ?").bind(now).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn redeem(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE login_tokens SET is_used = 1 WHERE id = ? AND is_used = 0").bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected() == 1)
    }
}
