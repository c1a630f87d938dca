pub mod availability;
pub mod booking_service;
pub mod delivery_fee;
pub mod distance;
pub mod login_service;
pub mod notification_service;
pub mod quote;
pub mod reminders;
