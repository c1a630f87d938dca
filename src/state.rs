use std::sync::Arc;
use crate::config::Config;
use crate::domain::ports::BlockoutRepository;
use crate::domain::services::{
    availability::AvailabilityIndex, booking_service::BookingService,
    delivery_fee::DeliveryFeeEstimator, login_service::LoginService,
    quote::QuoteCalculator, reminders::ReminderSweep,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub blockout_repo: Arc<dyn BlockoutRepository>,
    pub availability: Arc<AvailabilityIndex>,
    pub delivery_fees: Arc<DeliveryFeeEstimator>,
    pub quotes: Arc<QuoteCalculator>,
    pub booking_service: Arc<BookingService>,
    pub login_service: Arc<LoginService>,
    pub reminder_sweep: Arc<ReminderSweep>,
}
