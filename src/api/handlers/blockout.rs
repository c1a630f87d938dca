use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::json::JsonBody;
use crate::api::extractors::admin::AdminToken;
use crate::api::dtos::requests::{AvailabilityQuery, BlockoutRequest, parse_date};
use crate::domain::models::blockout::BlockoutDate;
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn upsert_blockout(
    State(state): State<Arc<AppState>>,
    _admin: AdminToken,
    JsonBody(payload): JsonBody<BlockoutRequest>,
) -> Result<impl IntoResponse, AppError> {
    let tent_type = payload.tent_type.trim();
    if tent_type.is_empty() {
        return Err(AppError::Validation("tentType is required".into()));
    }
    let date = parse_date("date", &payload.date)?;

    let saved = state.blockout_repo.upsert(&BlockoutDate::new(tent_type.to_string(), date)).await?;
    info!("Blocked out {} on {}", tent_type, date);
    Ok(Json(saved))
}

pub async fn delete_blockout(
    State(state): State<Arc<AppState>>,
    _admin: AdminToken,
    Path((tent_type, date_str)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let date = parse_date("date", &date_str)?;

    state.blockout_repo.delete(&tent_type, date).await?;
    info!("Removed blockout for {} on {}", tent_type, date);
    Ok(Json(serde_json::json!({"status": "deleted"})))
}

pub async fn list_blockouts(
    State(state): State<Arc<AppState>>,
    _admin: AdminToken,
    Query(params): Query<AvailabilityQuery>,
) -> Result<impl IntoResponse, AppError> {
    let range = params.into_range()?;
    let blockouts = state.blockout_repo.list_by_range(&range.tent_type, range.start, range.end).await?;
    Ok(Json(blockouts))
}
