use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::admin::AdminToken;
use crate::error::AppError;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

pub async fn run_jobs(
    State(state): State<Arc<AppState>>,
    _admin: AdminToken,
) -> Result<impl IntoResponse, AppError> {
    let today = Utc::now().date_naive();
    info!("Running reminder jobs for {}", today);

    let summary = state.reminder_sweep.run(today).await?;
    Ok(Json(summary))
}
