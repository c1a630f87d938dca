use crate::domain::{
    models::notification::{Notification, STATUS_FAILED, STATUS_PENDING, STATUS_SENT},
    ports::NotificationRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;
use chrono::Utc;

pub struct PostgresNotificationRepo {
    pool: PgPool,
}

impl PostgresNotificationRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PostgresNotificationRepo {
    async fn enqueue(&self, notification: &Notification) -> Result<bool, AppError> {
        let result = sqlx::query("INSERT INTO notifications (id, booking_id, kind, recipient, subject, html_body, status, attempts, last_error, dedupe_key, created_at, sent_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) ON CONFLICT(dedupe_key) DO NOTHING")
            .bind(&notification.id).bind(&notification.booking_id).bind(&notification.kind).bind(&notification.recipient)
            .bind(&notification.subject).bind(&notification.html_body).bind(&notification.status).bind(notification.attempts)
            .bind(&notification.last_error).bind(&notification.dedupe_key).bind(notification.created_at).bind(notification.sent_at)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected() == 1)
    }

    async fn list_pending(&self, limit: i64) -> Result<Vec<Notification>, AppError> {
        sqlx::query_as::<_, Notification>("SELECT * FROM notifications WHERE status = $1 ORDER BY created_at ASC LIMIT $2")
            .bind(STATUS_PENDING).bind(limit)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn mark_sent(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE notifications SET status = $1, attempts = attempts + 1, last_error = NULL, sent_at = $2 WHERE id = $3")
            .bind(STATUS_SENT).bind(Utc::now()).bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn record_failure(&self, id: &str, error_message: &str, max_attempts: i32) -> Result<(), AppError> {
        sqlx::query("UPDATE notifications SET attempts = attempts + 1, last_error = $1, status = CASE WHEN attempts + 1 >= $2 THEN $3 ELSE status END WHERE id = $4 AND status = $5")
            .bind(error_message).bind(max_attempts).bind(STATUS_FAILED).bind(id).bind(STATUS_PENDING)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }
}
