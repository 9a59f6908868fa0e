//! Error types for bukukas-api

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bukukas_core::CoreError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(e) => match e {
                CoreError::UnsupportedFormat { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                CoreError::MalformedWorkbook { .. } => StatusCode::BAD_REQUEST,
                CoreError::NoValidAccounts => StatusCode::UNPROCESSABLE_ENTITY,
                CoreError::SheetNameCollision { .. } => StatusCode::CONFLICT,
                CoreError::MissingRequiredSheetColumns { .. } | CoreError::RowCoercionFailure { .. } => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                CoreError::ExportFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            match &self {
                ApiError::Core(e) => log::error!(target: "bukukas::api", "{}", e.to_details()),
                other => log::error!(target: "bukukas::api", "{}", other),
            }
        } else {
            log::warn!(target: "bukukas::api", "Request rejected ({}): {}", status.as_u16(), self);
        }

        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (CoreError::UnsupportedFormat { extension: "ods".into() }, 415),
            (CoreError::MalformedWorkbook { message: "zip".into() }, 400),
            (CoreError::NoValidAccounts, 422),
            (
                CoreError::SheetNameCollision {
                    first: "Kas".into(),
                    second: "KAS".into(),
                    sheet: "KAS".into(),
                },
                409,
            ),
            (CoreError::ExportFailure { message: "disk".into() }, 500),
        ];
        for (error, expected) in cases {
            assert_eq!(ApiError::from(error).status().as_u16(), expected);
        }
        assert_eq!(ApiError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Internal("x".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_response_status() {
        let response = ApiError::from(CoreError::NoValidAccounts).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
