//! Workbook API endpoints
//!
//! `/api/upload` turns an uploaded spreadsheet into accounts,
//! `/api/save` turns accounts into an `.xlsx` download.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Multipart, Query, State},
    response::Response,
    Json,
};
use serde::Deserialize;
use tokio::task;

use bukukas_core::AccountsPayload;

use crate::error::{ApiError, ApiResult};
use crate::routes::{download_timestamp, xlsx_attachment};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct UploadQuery {
    /// Comma separated sheet names to read
    pub sheets: Option<String>,
}

impl UploadQuery {
    fn sheet_filter(&self) -> Option<Vec<String>> {
        let names: Vec<String> = self
            .sheets
            .as_deref()?
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        (!names.is_empty()).then_some(names)
    }
}

pub async fn api_upload(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    mut multipart: Multipart,
) -> ApiResult<Json<AccountsPayload>> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read multipart field: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read file content: {}", e)))?;
        upload = Some((file_name, bytes.to_vec()));
    }

    let (file_name, bytes) =
        upload.ok_or_else(|| ApiError::BadRequest("Missing file in multipart request".to_string()))?;
    log::info!(target: "bukukas::api", "Upload '{}' ({} bytes)", file_name, bytes.len());

    let converter = Arc::clone(&state.converter);
    let sheet_filter = query.sheet_filter();
    let report = task::spawn_blocking(move || converter.ingest(&file_name, &bytes, sheet_filter.as_deref()))
        .await
        .map_err(|e| ApiError::Internal(format!("Upload task failed: {}", e)))??;

    Ok(Json(AccountsPayload::from(report.accounts)))
}

pub async fn api_save(
    State(state): State<AppState>,
    payload: Result<Json<AccountsPayload>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(payload) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    log::info!(target: "bukukas::api", "Save request with {} account(s)", payload.accounts.len());

    let converter = Arc::clone(&state.converter);
    let bytes = task::spawn_blocking(move || converter.export(&payload.accounts))
        .await
        .map_err(|e| ApiError::Internal(format!("Export task failed: {}", e)))??;

    let filename = state.converter.export_filename(download_timestamp());
    Ok(xlsx_attachment(&filename, bytes))
}
