//! Template API endpoint

use std::sync::Arc;

use axum::{extract::State, response::Response};
use tokio::task;

use crate::error::{ApiError, ApiResult};
use crate::routes::{download_timestamp, xlsx_attachment};
use crate::AppState;

/// Sample ledger workbook built from the template accounts
pub async fn api_template(State(state): State<AppState>) -> ApiResult<Response> {
    let converter = Arc::clone(&state.converter);
    let bytes = task::spawn_blocking(move || converter.template())
        .await
        .map_err(|e| ApiError::Internal(format!("Template task failed: {}", e)))??;

    let filename = state.converter.template_filename(download_timestamp());
    log::info!(target: "bukukas::api", "Serving template {} ({} bytes)", filename, bytes.len());

    Ok(xlsx_attachment(&filename, bytes))
}
