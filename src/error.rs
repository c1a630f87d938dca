use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Invalid or expired login link")]
    InvalidLoginLink,
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Requested dates are unavailable: {0:?}")]
    BookingConflict(Vec<NaiveDate>),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Payment failed: {0}")]
    Payment(String),
    #[error("Upstream dependency failed: {0}")]
    Dependency(String),
    #[error("Internal server error: {0}")]
    InternalWithMsg(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Database(e) => {
                if let Some(db_err) = e.as_database_error() {
                    let code = db_err.code().unwrap_or_default();

                    // 2067 = SQLite Unique Constraint
                    // 23505 = PostgreSQL Unique Violation
                    if code == "2067" || code == "23505" {
                        return (
                            StatusCode::CONFLICT,
                            Json(json!({ "error": "Resource already exists (duplicate entry)" }))
                        ).into_response();
                    }
                }

                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::InvalidLoginLink => {
                return (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "message": "Invalid or expired login link." }))
                ).into_response();
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::BookingConflict(dates) => {
                let unavailable: Vec<String> = dates.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect();
                return (
                    StatusCode::CONFLICT,
                    Json(json!({
                        "error": "The selected dates are not available for this tent type",
                        "unavailableDates": unavailable
                    }))
                ).into_response();
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Payment(msg) => {
                error!("Payment error: {}", msg);
                (StatusCode::PAYMENT_REQUIRED, "Payment could not be processed".to_string())
            }
            AppError::Dependency(msg) => {
                error!("Dependency error: {}", msg);
                (StatusCode::BAD_GATEWAY, "Upstream service unavailable".to_string())
            }
            AppError::InternalWithMsg(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
