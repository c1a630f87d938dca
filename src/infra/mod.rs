pub mod email;
pub mod factory;
pub mod geocoding;
pub mod payment;
pub mod repositories;
