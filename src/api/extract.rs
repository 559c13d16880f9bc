use crate::api::AppState;
use crate::error::{AppError, FieldError};
use crate::metrics::PREDICTION_ERRORS_TOTAL;
use crate::ml::FeatureRow;
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header, HeaderMap},
};
use serde_json::Value;

/// Request body validated against the active feature layout.
///
/// Rejections are `AppError::Validation` (422) carrying one entry per failed
/// field, so handler code only ever sees a complete row.
#[derive(Debug, Clone)]
pub struct ValidatedFeatures(pub FeatureRow);

#[async_trait]
impl FromRequest<AppState> for ValidatedFeatures {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let json_body = is_json_body(req.headers());

        let result = match Bytes::from_request(req, state).await {
            Ok(_) if !json_body => Err(body_error(
                "Expected request with `Content-Type: application/json`",
            )),
            Ok(bytes) => match serde_json::from_slice::<Value>(&bytes) {
                Ok(body) => state
                    .predictor
                    .layout()
                    .parse(&body)
                    .map_err(AppError::Validation),
                Err(e) => Err(body_error(e.to_string())),
            },
            Err(rejection) => Err(body_error(rejection.body_text())),
        };

        if result.is_err() {
            PREDICTION_ERRORS_TOTAL
                .with_label_values(&["validation"])
                .inc();
        }

        result.map(ValidatedFeatures)
    }
}

/// A missing content type is read as JSON, otherwise it must be
/// `application/json` or `application/*+json`
fn is_json_body(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(header::CONTENT_TYPE) else {
        return true;
    };
    let Ok(value) = value.to_str() else {
        return false;
    };

    let essence = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.split_once('/') {
        Some(("application", subtype)) => subtype == "json" || subtype.ends_with("+json"),
        _ => false,
    }
}

fn body_error(msg: impl Into<String>) -> AppError {
    AppError::Validation(vec![FieldError::new(
        &["body"],
        msg,
        "value_error.jsondecode",
    )])
}
