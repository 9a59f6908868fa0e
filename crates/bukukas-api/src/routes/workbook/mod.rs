//! Workbook routes - upload and save

pub mod api;

pub use api::{api_save, api_upload};
