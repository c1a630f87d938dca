use crate::domain::{models::customer::Customer, ports::CustomerRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresCustomerRepo {
    pool: PgPool,
}

impl PostgresCustomerRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerRepository for PostgresCustomerRepo {
    async fn find_by_id(&self, id: &str) -> Result<Option<Customer>, AppError> {
        sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Customer>, AppError> {
        sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE email = $1").bind(email).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
}
