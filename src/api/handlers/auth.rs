use axum::{extract::{Query, State}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::json::JsonBody;
use crate::api::dtos::requests::{LoginRequest, VerifyQuery};
use crate::api::dtos::responses::{MessageResponse, PortalDataResponse};
use crate::error::AppError;
use std::sync::Arc;

pub async fn request_login_link(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let message = state.login_service.request_link(&payload.email).await?;
    Ok(Json(MessageResponse { message }))
}

pub async fn verify_login_token(
    State(state): State<Arc<AppState>>,
    Query(params): Query<VerifyQuery>,
) -> Result<impl IntoResponse, AppError> {
    let token = params.token.ok_or(AppError::InvalidLoginLink)?;
    let portal = state.login_service.verify(&token).await?;
    Ok(Json(PortalDataResponse::from(portal)))
}
