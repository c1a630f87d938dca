use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BlockoutDate {
    pub id: String,
    pub tent_type: String,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl BlockoutDate {
    pub fn new(tent_type: String, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tent_type,
            date,
            created_at: Utc::now(),
        }
    }
}
