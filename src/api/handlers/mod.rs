pub mod auth;
pub mod blockout;
pub mod booking;
pub mod health;
pub mod jobs;
