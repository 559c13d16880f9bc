use crate::api::extract::ValidatedFeatures;
use crate::api::AppState;
use crate::error::Result;
use crate::ml::{FeatureLayout, ModelMetadata, Prediction};
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

/// Health check endpoint
///
/// Always 200; `model_loaded` tells whether `/predict` can succeed.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let model_loaded = state.predictor.is_model_loaded();

    Json(HealthResponse {
        status: if model_loaded { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model_loaded,
        feature_layout: state.predictor.layout(),
        model: state.predictor.model_metadata().cloned(),
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub model_loaded: bool,
    pub feature_layout: FeatureLayout,
    pub model: Option<ModelMetadata>,
}

/// Predict the achievement category of one case
pub async fn predict(
    State(state): State<AppState>,
    ValidatedFeatures(row): ValidatedFeatures,
) -> Result<Json<Prediction>> {
    let prediction = state.predictor.predict(&row)?;
    Ok(Json(prediction))
}

/// Prometheus metrics endpoint
///
/// Returns metrics in Prometheus text exposition format
pub async fn metrics() -> (StatusCode, String) {
    let metrics = crate::metrics::gather_metrics();
    (StatusCode::OK, metrics)
}
