use crate::domain::{
    models::{booking::Booking, customer::Customer, notification::Notification},
    ports::{BookingRepository, CustomerWrite},
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;
use chrono::NaiveDate;

pub struct SqliteBookingRepo {
    pool: SqlitePool,
}

impl SqliteBookingRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for SqliteBookingRepo {
    async fn create_confirmed(
        &self,
        customer: &Customer,
        customer_write: CustomerWrite,
        booking: &Booking,
        confirmation: &Notification,
    ) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        match customer_write {
            CustomerWrite::Insert => {
                sqlx::query(
                    "INSERT INTO customers (id, email, first_name, last_name, phone_number, address, city, state, zip_code, created_at, updated_at)
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
                )
                    .bind(&customer.id).bind(&customer.email).bind(&customer.first_name).bind(&customer.last_name)
                    .bind(&customer.phone_number).bind(&customer.address).bind(&customer.city).bind(&customer.state)
                    .bind(&customer.zip_code).bind(customer.created_at).bind(customer.updated_at)
                    .execute(&mut *tx).await.map_err(AppError::Database)?;
            }
            CustomerWrite::UpdateContact => {
                let updated = sqlx::query("UPDATE customers SET address=?, city=?, state=?, zip_code=?, updated_at=? WHERE id=?")
                    .bind(&customer.address).bind(&customer.city).bind(&customer.state).bind(&customer.zip_code)
                    .bind(customer.updated_at).bind(&customer.id)
                    .execute(&mut *tx).await.map_err(AppError::Database)?;
                if updated.rows_affected() == 0 {
                    return Err(AppError::NotFound(format!("Customer {} not found", customer.id)));
                }
            }
            CustomerWrite::Unchanged => {}
        }

        // Single statement, so the overlap check and the write cannot interleave with another writer.
        let result = sqlx::query(
            "INSERT INTO bookings (id, customer_id, event_date, event_end_date, tent_type, event_address, event_city, event_state, event_zip_code, status, rental_fee_cents, delivery_fee_cents, security_deposit_cents, total_price_cents, stripe_payment_intent_id, special_requests, created_at, updated_at)
             SELECT ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?
             WHERE NOT EXISTS (
                 SELECT 1 FROM bookings
                 WHERE tent_type = ? AND status = 'Confirmed' AND event_date <= ? AND event_end_date >= ?
             )"
        )
            .bind(&booking.id).bind(&booking.customer_id).bind(booking.event_date).bind(booking.event_end_date)
            .bind(&booking.tent_type).bind(&booking.event_address).bind(&booking.event_city).bind(&booking.event_state)
            .bind(&booking.event_zip_code).bind(&booking.status).bind(booking.rental_fee_cents).bind(booking.delivery_fee_cents)
            .bind(booking.security_deposit_cents).bind(booking.total_price_cents).bind(&booking.stripe_payment_intent_id)
            .bind(&booking.special_requests).bind(booking.created_at).bind(booking.updated_at)
            .bind(&booking.tent_type).bind(booking.event_end_date).bind(booking.event_date)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        // Dropping the transaction rolls back the customer write above.
        if result.rows_affected() == 0 {
            return Err(AppError::Conflict("Dates were taken by a concurrent booking".to_string()));
        }

        sqlx::query(
            "INSERT INTO notifications (id, booking_id, kind, recipient, subject, html_body, status, attempts, last_error, dedupe_key, created_at, sent_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(dedupe_key) DO NOTHING"
        )
            .bind(&confirmation.id).bind(&confirmation.booking_id).bind(&confirmation.kind).bind(&confirmation.recipient)
            .bind(&confirmation.subject).bind(&confirmation.html_body).bind(&confirmation.status).bind(confirmation.attempts)
            .bind(&confirmation.last_error).bind(&confirmation.dedupe_key).bind(confirmation.created_at).bind(confirmation.sent_at)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(booking.clone())
    }

    async fn list_confirmed_overlapping(&self, tent_type: &str, range_start: NaiveDate, range_end: NaiveDate) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE tent_type = ? AND status = 'Confirmed' AND event_date < ? AND event_end_date >= ? ORDER BY event_date ASC"
        )
            .bind(tent_type).bind(range_end).bind(range_start)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_customer(&self, customer_id: &str) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE customer_id = ? ORDER BY event_date DESC").bind(customer_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_confirmed_starting_on(&self, date: NaiveDate) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE status = 'Confirmed' AND event_date = ?").bind(date).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_confirmed_ending_on(&self, date: NaiveDate) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE status = 'Confirmed' AND event_end_date = ?").bind(date).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
