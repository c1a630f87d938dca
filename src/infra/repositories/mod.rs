pub mod sqlite_customer_repo;
pub mod sqlite_booking_repo;
pub mod sqlite_login_token_repo;
pub mod sqlite_blockout_repo;
pub mod sqlite_notification_repo;

pub mod postgres_customer_repo;
pub mod postgres_booking_repo;
pub mod postgres_login_token_repo;
pub mod postgres_blockout_repo;
pub mod postgres_notification_repo;
