use rouille::Response;
use serde::Serialize;

use crate::storage::error::CatalogError;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Internal(String),
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation(e) => ApiError::BadRequest(e.to_string()),

            CatalogError::Auth(msg) => ApiError::Unauthorized(msg),

            CatalogError::Ownership(msg) => ApiError::Forbidden(msg),

            CatalogError::NotFound(id) => ApiError::NotFound(format!("track {id} not found")),

            CatalogError::Storage(e) => {
                log::error!("storage failure: {e}");
                ApiError::Internal("internal server error".into())
            }
        }
    }
}

/// Every failure body has the same shape: `{"success": false, "error": ...}`.
#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl ApiError {
    pub fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::BadRequest(msg) => (400, msg),
            ApiError::Unauthorized(msg) => (401, msg),
            ApiError::Forbidden(msg) => (403, msg),
            ApiError::NotFound(msg) => (404, msg),
            ApiError::Internal(msg) => (500, msg),
        };

        Response::json(&ErrorBody {
            success: false,
            error,
        })
        .with_status_code(status)
    }
}
