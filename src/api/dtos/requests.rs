use crate::domain::models::address::Address;
use crate::domain::services::booking_service::BookingRequest;
use crate::error::AppError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp; the latter is reduced to its UTC date.
pub fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, AppError> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .map_err(|_| AppError::Validation(format!("{} must be a date (YYYY-MM-DD)", field)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub tent_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

pub struct DateRange {
    pub tent_type: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl AvailabilityQuery {
    pub fn into_range(self) -> Result<DateRange, AppError> {
        let tent_type = self.tent_type
            .filter(|t| !t.trim().is_empty())
            .ok_or(AppError::Validation("tentType is required".into()))?;
        let start = parse_date("startDate", self.start_date.as_deref().ok_or(AppError::Validation("startDate is required".into()))?)?;
        let end = parse_date("endDate", self.end_date.as_deref().ok_or(AppError::Validation("endDate is required".into()))?)?;

        if end < start {
            return Err(AppError::Validation("endDate cannot be before startDate".into()));
        }
        Ok(DateRange { tent_type: tent_type.trim().to_string(), start, end })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequest {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
}

impl AddressRequest {
    pub fn into_address(self) -> Result<Address, AppError> {
        let address = Address::new(self.address, self.city, self.state, self.zip_code);
        if !address.is_complete() {
            return Err(AppError::Validation("address, city, state and zipCode are required".into()));
        }
        Ok(address)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub start_date: String,
    pub end_date: String,
    pub address: AddressRequest,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub customer_name: String,
    pub customer_email: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub billing_address: Option<String>,
    pub billing_city: Option<String>,
    pub billing_state: Option<String>,
    pub billing_zip_code: Option<String>,
    pub event_date: String,
    pub event_end_date: String,
    pub tent_type: String,
    pub special_requests: Option<String>,
    pub payment_method_id: String,
}

impl CreateBookingRequest {
    pub fn into_domain(self) -> Result<BookingRequest, AppError> {
        let event_date = parse_date("eventDate", &self.event_date)?;
        let event_end_date = parse_date("eventEndDate", &self.event_end_date)?;

        let billing_address = Some(Address::new(
            self.billing_address.unwrap_or_default(),
            self.billing_city.unwrap_or_default(),
            self.billing_state.unwrap_or_default(),
            self.billing_zip_code.unwrap_or_default(),
        )).filter(Address::is_complete);

        Ok(BookingRequest {
            customer_name: self.customer_name.trim().to_string(),
            customer_email: self.customer_email.trim().to_string(),
            event_address: Address::new(self.address, self.city, self.state, self.zip_code),
            billing_address,
            event_date,
            event_end_date,
            tent_type: self.tent_type.trim().to_string(),
            special_requests: self.special_requests,
            payment_method_id: self.payment_method_id.trim().to_string(),
        })
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct VerifyQuery {
    pub token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockoutRequest {
    pub tent_type: String,
    pub date: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_timestamp_dates() {
        let expected = NaiveDate::from_ymd_opt(2030, 6, 10).unwrap();
        assert_eq!(parse_date("d", "2030-06-10").unwrap(), expected);
        assert_eq!(parse_date("d", "2030-06-10T00:00:00Z").unwrap(), expected);
        assert_eq!(parse_date("d", "2030-06-10T22:00:00-05:00").unwrap(), NaiveDate::from_ymd_opt(2030, 6, 11).unwrap());
        assert!(parse_date("d", "06/10/2030").is_err());
    }

    #[test]
    fn partial_billing_address_is_ignored() {
        let req: CreateBookingRequest = serde_json::from_value(serde_json::json!({
            "customerName": "Jane Doe",
            "customerEmail": "jane@example.com",
            "address": "1 Field Rd",
            "city": "Darlington",
            "state": "IN",
            "zipCode": "47940",
            "billingAddress": "9 Office Way",
            "billingCity": "",
            "eventDate": "2030-06-10",
            "eventEndDate": "2030-06-12",
            "tentType": "Standard",
            "paymentMethodId": "pm_card_visa"
        })).unwrap();

        let domain = req.into_domain().unwrap();
        assert!(domain.billing_address.is_none());
        assert_eq!(domain.event_address.city, "Darlington");
    }
}
