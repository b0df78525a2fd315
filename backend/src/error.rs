use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::{ErrorBody, StatusBody};

/// Failure to coerce a request value into a number.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("{field} is required")]
    Missing { field: String },

    #[error("invalid numeric value for {field}: {value}")]
    NotNumeric { field: String, value: String },

    #[error("{field} is out of range")]
    OutOfRange { field: String },

    #[error("{field} must be a finite number")]
    NotFinite { field: String },
}

/// Error returned by every handler.
///
/// `BadRequest` and `InvalidInput` are both client errors (400); they only
/// differ in the JSON shape clients receive.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// `{"error": msg}`
    #[error("{0}")]
    BadRequest(String),

    /// `{"status": "error", "message": msg}`
    #[error("{0}")]
    InvalidInput(String),

    /// 500 with `{"status": "error", "message": msg}`
    #[error("{0}")]
    Server(String),

    /// 500 with `{"error": "Server logic failed", "message": msg}`
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn no_data() -> Self {
        ApiError::BadRequest("No data is provided".to_string())
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, ApiError::BadRequest(_) | ApiError::InvalidInput(_))
    }
}

impl From<ParseError> for ApiError {
    fn from(err: ParseError) -> Self {
        ApiError::InvalidInput(err.to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        match self {
            ApiError::BadRequest(message) => response.json(ErrorBody::new(message)),
            ApiError::InvalidInput(message) | ApiError::Server(message) => {
                response.json(StatusBody::error(message))
            }
            ApiError::Internal(message) => {
                response.json(ErrorBody::with_message("Server logic failed", message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_of(err: ApiError) -> serde_json::Value {
        let bytes = to_bytes(err.error_response().into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn status_codes_follow_tiers() {
        assert_eq!(ApiError::no_data().status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::InvalidInput("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Server("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn parse_errors_become_invalid_input() {
        let err: ApiError = ParseError::Missing {
            field: "pH".to_string(),
        }
        .into();
        assert_eq!(err, ApiError::InvalidInput("pH is required".to_string()));
    }

    #[actix_web::test]
    async fn bodies_match_wire_shapes() {
        assert_eq!(
            body_of(ApiError::no_data()).await,
            serde_json::json!({ "error": "No data is provided" })
        );
        assert_eq!(
            body_of(ApiError::InvalidInput("bad".into())).await,
            serde_json::json!({ "status": "error", "message": "bad" })
        );
        assert_eq!(
            body_of(ApiError::Internal("boom".into())).await,
            serde_json::json!({ "error": "Server logic failed", "message": "boom" })
        );
    }
}
