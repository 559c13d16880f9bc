use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Detail message returned when no model was loaded at startup
pub const MODEL_UNAVAILABLE_DETAIL: &str = "Model tidak tersedia.";

/// One failed field of a request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    /// Location of the failure, e.g. `["body", "Tahun"]`
    pub loc: Vec<String>,

    /// Human readable message
    pub msg: String,

    /// Machine readable error type
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    pub fn new(loc: &[&str], msg: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            loc: loc.iter().map(|s| s.to_string()).collect(),
            msg: msg.into(),
            kind: kind.into(),
        }
    }

    pub fn missing(field: &str) -> Self {
        Self::new(&["body", field], "field required", "value_error.missing")
    }

    pub fn not_float(field: &str) -> Self {
        Self::new(&["body", field], "value is not a valid float", "type_error.float")
    }

    pub fn not_integer(field: &str) -> Self {
        Self::new(
            &["body", field],
            "value is not a valid integer",
            "type_error.integer",
        )
    }

    /// Name of the offending field, if the error points at one
    pub fn field(&self) -> Option<&str> {
        self.loc.get(1).map(String::as_str)
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Request body failed the input schema
    #[error("Validation error: {} field(s) failed", .0.len())]
    Validation(Vec<FieldError>),

    /// No model was loaded at startup
    #[error("Model tidak tersedia.")]
    ModelUnavailable,

    /// Vector assembly or the model call failed
    #[error("Terjadi kesalahan saat prediksi: {0}")]
    Prediction(String),
}

impl AppError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ModelUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Prediction(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::ModelUnavailable => "model_unavailable",
            AppError::Prediction(_) => "prediction_failed",
        }
    }
}

/// Convert AppError to HTTP response
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code().to_string();

        let body = match self {
            AppError::Validation(errors) => {
                tracing::debug!(
                    error_code = %error_code,
                    status_code = status.as_u16(),
                    fields = errors.len(),
                    "Request rejected"
                );
                json!({ "detail": errors })
            }
            other => {
                let message = other.to_string();
                tracing::error!(
                    error_code = %error_code,
                    status_code = status.as_u16(),
                    message = %message,
                    "Request error"
                );
                json!({ "detail": message })
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AppError>;
