use std::sync::Arc;
use chrono::{Days, NaiveDate};
use serde::Serialize;
use tracing::{error, info, info_span, Instrument};
use crate::domain::{
    models::{booking::Booking, notification::NotificationKind},
    ports::{BookingRepository, CustomerRepository},
    services::notification_service::{NotificationService, DISPATCH_BATCH_SIZE},
};
use crate::error::AppError;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepSummary {
    pub seven_day_reminders: usize,
    pub one_day_reminders: usize,
    pub follow_ups: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// Queues the day's reminder and follow-up emails, then drains the outbox.
/// Safe to run repeatedly: each (kind, booking) pair is queued at most once.
pub struct ReminderSweep {
    bookings: Arc<dyn BookingRepository>,
    customers: Arc<dyn CustomerRepository>,
    notifications: Arc<NotificationService>,
}

impl ReminderSweep {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        customers: Arc<dyn CustomerRepository>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self { bookings, customers, notifications }
    }

    pub async fn run(&self, today: NaiveDate) -> Result<SweepSummary, AppError> {
        let mut summary = SweepSummary::default();

        if let Some(date) = today.checked_add_days(Days::new(7)) {
            let bookings = self.bookings.list_confirmed_starting_on(date).await?;
            summary.seven_day_reminders = self.enqueue_all(NotificationKind::SevenDayReminder, bookings).await;
        }

        if let Some(date) = today.checked_add_days(Days::new(1)) {
            let bookings = self.bookings.list_confirmed_starting_on(date).await?;
            summary.one_day_reminders = self.enqueue_all(NotificationKind::OneDayReminder, bookings).await;
        }

        if let Some(date) = today.checked_sub_days(Days::new(2)) {
            let bookings = self.bookings.list_confirmed_ending_on(date).await?;
            summary.follow_ups = self.enqueue_all(NotificationKind::FollowUp, bookings).await;
        }

        let dispatch = self.notifications.dispatch_pending(DISPATCH_BATCH_SIZE).await?;
        summary.delivered = dispatch.delivered;
        summary.failed = dispatch.failed;

        info!(
            "Reminder sweep for {}: {} seven-day, {} one-day, {} follow-ups queued; {} delivered, {} failed",
            today, summary.seven_day_reminders, summary.one_day_reminders, summary.follow_ups,
            summary.delivered, summary.failed
        );
        Ok(summary)
    }

    /// Returns how many rows were newly queued. Per-booking errors are logged and skipped.
    async fn enqueue_all(&self, kind: NotificationKind, bookings: Vec<Booking>) -> usize {
        let mut queued = 0;

        for booking in bookings {
            let span = info_span!("reminder", kind = kind.as_str(), booking_id = %booking.id);

            let outcome: Result<bool, AppError> = async {
                let customer = self.customers.find_by_id(&booking.customer_id).await?
                    .ok_or(AppError::NotFound(format!("Customer {} not found", booking.customer_id)))?;
                let notification = self.notifications.compose(kind, &booking, &customer)?;
                self.notifications.enqueue(&notification).await
            }
            .instrument(span)
            .await;

            match outcome {
                Ok(true) => queued += 1,
                Ok(false) => {}
                Err(e) => error!("Could not queue {} for booking {}: {:?}", kind.as_str(), booking.id, e),
            }
        }

        queued
    }
}
