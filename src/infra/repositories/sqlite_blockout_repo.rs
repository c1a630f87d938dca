use crate::domain::{models::blockout::BlockoutDate, ports::BlockoutRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;
use chrono::NaiveDate;

pub struct SqliteBlockoutRepo {
    pool: SqlitePool,
}

impl SqliteBlockoutRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl BlockoutRepository for SqliteBlockoutRepo {
    async fn upsert(&self, blockout: &BlockoutDate) -> Result<BlockoutDate, AppError> {
        // The no-op update makes RETURNING yield the existing row on a repeat.
        sqlx::query_as::<_, BlockoutDate>(
            r#"INSERT INTO blockout_dates (id, tent_type, date, created_at)
               VALUES (?, ?, ?, ?)
               ON CONFLICT(tent_type, date) DO UPDATE SET tent_type=excluded.tent_type
               RETURNING *"#
        )
            .bind(&blockout.id)
            .bind(&blockout.tent_type)
            .bind(blockout.date)
            .bind(blockout.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_range(&self, tent_type: &str, range_start: NaiveDate, range_end: NaiveDate) -> Result<Vec<BlockoutDate>, AppError> {
        sqlx::query_as::<_, BlockoutDate>(
            "SELECT * FROM blockout_dates WHERE tent_type = ? AND date >= ? AND date < ? ORDER BY date ASC"
        )
            .bind(tent_type)
            .bind(range_start)
            .bind(range_end)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete(&self, tent_type: &str, date: NaiveDate) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM blockout_dates WHERE tent_type = ? AND date = ?")
            .bind(tent_type)
            .bind(date)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Blockout date not found".into()));
        }
        Ok(())
    }
}
