use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use shared::SharedError;
use std::fmt;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ApiError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl ApiError {
    pub fn new(error: &str, message: &str, status_code: u16) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            status_code,
        }
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BAD_REQUEST", message, 400)
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NOT_FOUND", message, 404)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("INTERNAL_ERROR", message, 500)
    }

    pub fn validation_error(message: &str) -> Self {
        Self::new("VALIDATION_ERROR", message, 400)
    }

    pub fn query_error(message: &str) -> Self {
        Self::new("QUERY_ERROR", message, 400)
    }

    pub fn malformed_record(message: &str) -> Self {
        Self::new("MALFORMED_RECORD", message, 502)
    }

    pub fn data_source_unavailable(message: &str) -> Self {
        Self::new("DATA_SOURCE_UNAVAILABLE", message, 503)
    }
}

impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        let status = match actix_web::http::StatusCode::from_u16(self.status_code) {
            Ok(status) => status,
            Err(_) => {
                log::warn!("Invalid status code {}, defaulting to 500", self.status_code);
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        HttpResponse::build(status).json(self)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl From<SharedError> for ApiError {
    fn from(err: SharedError) -> Self {
        match err {
            SharedError::DataSourceUnavailable(msg) => Self::data_source_unavailable(&msg),
            SharedError::NotFound(msg) => Self::not_found(&msg),
            SharedError::MalformedRecord(msg) => Self::malformed_record(&msg),
            SharedError::Query(msg) => Self::query_error(&msg),
            SharedError::Validation(msg) => Self::validation_error(&msg),
            SharedError::BadRequest(msg) => Self::bad_request(&msg),
            SharedError::Conversion(msg) => Self::bad_request(&format!("Conversion error: {}", msg)),
            SharedError::Internal(msg) => Self::internal_error(&msg),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::bad_request(&format!("JSON error: {}", err))
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::validation_error(&format!("Validation error: {}", err))
    }
}
