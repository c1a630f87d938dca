use std::collections::BTreeSet;
use std::sync::Arc;
use chrono::NaiveDate;
use crate::domain::models::{blockout::BlockoutDate, booking::Booking};
use crate::domain::ports::{BlockoutRepository, BookingRepository};
use crate::error::AppError;

/// Answers "which days is this tent type out?" from Confirmed bookings and admin blockouts.
///
/// Ranges are half-open, `[range_start, range_end)`. A booking occupies `event_date..=event_end_date`,
/// so it overlaps when `event_date < range_end && event_end_date + 1 > range_start`. Every day of an
/// overlapping booking is reported, including days outside the queried range.
pub struct AvailabilityIndex {
    bookings: Arc<dyn BookingRepository>,
    blockouts: Arc<dyn BlockoutRepository>,
}

impl AvailabilityIndex {
    pub fn new(bookings: Arc<dyn BookingRepository>, blockouts: Arc<dyn BlockoutRepository>) -> Self {
        Self { bookings, blockouts }
    }

    pub async fn unavailable_dates(
        &self,
        tent_type: &str,
        range_start: NaiveDate,
        range_end: NaiveDate,
    ) -> Result<BTreeSet<NaiveDate>, AppError> {
        if range_end <= range_start {
            return Ok(BTreeSet::new());
        }

        let bookings = self.bookings.list_confirmed_overlapping(tent_type, range_start, range_end).await?;
        let blockouts = self.blockouts.list_by_range(tent_type, range_start, range_end).await?;

        Ok(collect_unavailable(&bookings, &blockouts, tent_type, range_start, range_end))
    }
}

pub fn overlaps(booking: &Booking, range_start: NaiveDate, range_end: NaiveDate) -> bool {
    booking.event_date < range_end && booking.exclusive_end() > range_start
}

pub fn collect_unavailable(
    bookings: &[Booking],
    blockouts: &[BlockoutDate],
    tent_type: &str,
    range_start: NaiveDate,
    range_end: NaiveDate,
) -> BTreeSet<NaiveDate> {
    let mut dates = BTreeSet::new();

    for booking in bookings.iter().filter(|b| b.tent_type == tent_type && overlaps(b, range_start, range_end)) {
        dates.extend(booking.occupied_dates());
    }

    dates.extend(
        blockouts.iter()
            .filter(|b| b.tent_type == tent_type && b.date >= range_start && b.date < range_end)
            .map(|b| b.date),
    );

    dates
}
