//! Route modules for the API server
//!
//! - health: liveness endpoints
//! - workbook: upload (workbook to JSON) and save (JSON to workbook)
//! - template: sample workbook download
//!
//! Each feature module has a mod.rs with exports and an api.rs with handlers.

pub mod health;
pub mod template;
pub mod workbook;

use axum::{
    http::header,
    response::{IntoResponse, Response},
};

pub const XLSX_MEDIA_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Workbook bytes as a file download
pub(crate) fn xlsx_attachment(filename: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, XLSX_MEDIA_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
        ],
        bytes,
    )
        .into_response()
}

/// Local wall-clock time used in download names
pub(crate) fn download_timestamp() -> chrono::NaiveDateTime {
    chrono::Local::now().naive_local()
}
