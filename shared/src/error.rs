use thiserror::Error;
use validator::ValidationErrors;
use serde_json::Error as JsonError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq)]
pub enum SharedError {
    /// Connection, authentication or network failure talking to the database
    #[error("Data source unavailable: {0}")]
    DataSourceUnavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A row returned by the data source is missing an expected field
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// The database accepted the connection but rejected the statement
    #[error("Query error: {0}")]
    Query(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conversion error: {0}")]
    Conversion(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl SharedError {
    /// Short machine-readable tag, used in logs and metrics labels
    pub fn kind(&self) -> &'static str {
        match self {
            SharedError::DataSourceUnavailable(_) => "data_source_unavailable",
            SharedError::NotFound(_) => "not_found",
            SharedError::MalformedRecord(_) => "malformed_record",
            SharedError::Query(_) => "query",
            SharedError::Validation(_) => "validation",
            SharedError::BadRequest(_) => "bad_request",
            SharedError::Conversion(_) => "conversion",
            SharedError::Internal(_) => "internal",
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl actix_web::ResponseError for SharedError {
    fn error_response(&self) -> actix_web::HttpResponse {
        match self {
            SharedError::DataSourceUnavailable(_) => actix_web::HttpResponse::ServiceUnavailable().json(self),
            SharedError::NotFound(_) => actix_web::HttpResponse::NotFound().json(self),
            SharedError::MalformedRecord(_) => actix_web::HttpResponse::BadGateway().json(self),
            SharedError::Query(_) => actix_web::HttpResponse::BadRequest().json(self),
            SharedError::Validation(_) => actix_web::HttpResponse::BadRequest().json(self),
            SharedError::BadRequest(_) => actix_web::HttpResponse::BadRequest().json(self),
            SharedError::Conversion(_) => actix_web::HttpResponse::BadRequest().json(self),
            SharedError::Internal(_) => actix_web::HttpResponse::InternalServerError().json(self),
        }
    }
}

impl From<ValidationErrors> for SharedError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

impl From<JsonError> for SharedError {
    fn from(error: JsonError) -> Self {
        Self::Conversion(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SharedError>;
