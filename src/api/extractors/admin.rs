use axum::{
    extract::{FromRequestParts, FromRef},
    http::{header::AUTHORIZATION, request::Parts},
};
use crate::error::AppError;
use crate::state::AppState;
use constant_time_eq::constant_time_eq;
use std::sync::Arc;
use tracing::{warn, Span};

/// Operator access via `Authorization: Bearer <ADMIN_API_TOKEN>`.
/// Without a configured token every request is rejected.
pub struct AdminToken;

impl<S> FromRequestParts<S> for AdminToken
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        let expected = app_state.config.admin_api_token.as_deref()
            .ok_or(AppError::Unauthorized)?;

        let presented = parts.headers.get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(AppError::Unauthorized)?;

        if !constant_time_eq(presented.trim().as_bytes(), expected.as_bytes()) {
            warn!("Rejected admin request with invalid token");
            return Err(AppError::Unauthorized);
        }

        Span::current().record("admin", true);
        Ok(AdminToken)
    }
}
