//! Template routes - sample workbook download

pub mod api;

pub use api::api_template;
