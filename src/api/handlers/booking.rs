use axum::{extract::{Query, State}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::json::JsonBody;
use crate::api::dtos::requests::{AddressRequest, AvailabilityQuery, CreateBookingRequest, QuoteRequest, parse_date};
use crate::api::dtos::responses::{BookingResponse, QuoteResponse};
use crate::error::AppError;
use rust_decimal::prelude::ToPrimitive;
use std::sync::Arc;
use tracing::info;

pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AvailabilityQuery>,
) -> Result<impl IntoResponse, AppError> {
    let range = params.into_range()?;

    let dates = state.availability
        .unavailable_dates(&range.tent_type, range.start, range.end)
        .await?;

    let body: Vec<String> = dates.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect();
    Ok(Json(body))
}

pub async fn get_quote(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<QuoteRequest>,
) -> Result<impl IntoResponse, AppError> {
    let start = parse_date("startDate", &payload.start_date)?;
    let end = parse_date("endDate", &payload.end_date)?;
    let address = payload.address.into_address()?;

    let quote = state.quotes.quote(start, end, &address).await;
    Ok(Json(QuoteResponse::from(quote)))
}

pub async fn get_delivery_fee(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<AddressRequest>,
) -> Result<impl IntoResponse, AppError> {
    let address = payload.into_address()?;
    let fee = state.delivery_fees.estimate(&address).await;
    let fee = fee.to_f64().ok_or(AppError::InternalWithMsg(format!("Fee {} is not representable", fee)))?;
    Ok(Json(fee))
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let request = payload.into_domain()?;
    info!("create_booking: {} {} to {}", request.tent_type, request.event_date, request.event_end_date);

    let confirmation = state.booking_service.create(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(BookingResponse::new(&confirmation.booking, &confirmation.customer)),
    ))
}
