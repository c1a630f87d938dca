pub mod address;
pub mod blockout;
pub mod booking;
pub mod customer;
pub mod geo;
pub mod login_token;
pub mod money;
pub mod notification;
pub mod quote;
