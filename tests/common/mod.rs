//! Shared fixtures for the HTTP integration tests
//!
//! Fixture models are trained on synthetic data at test time and written to
//! a temporary directory, then loaded through the same path the server uses.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use rkt_predictor::{
    api::{build_router, AppState},
    ml::{
        load_classifier, Classifier, Estimator, FeatureLayout, ModelArtifact, ModelMetadata,
        ModelType, PredictionService,
    },
};
use serde_json::{json, Value};
use smartcore::ensemble::random_forest_classifier::{
    RandomForestClassifier, RandomForestClassifierParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

/// Input of the regression scenario, 13-field layout
pub fn rkt13_input() -> Value {
    json!({
        "Tahun": 2024,
        "Jenis_Hutan": 1,
        "Luas_PBPH": 15000,
        "Target_Murni_Luas": 950,
        "Target_Murni_Volume": 60000,
        "Target_Carry_Luas": 700,
        "Target_Carry_Volume": 20000,
        "Target_Jumlah_Luas": 1000,
        "Realisasi_Alam": 30000,
        "Realisasi_Tanaman": 5000,
        "log_Realisasi_Produksi": 10.2,
        "Rasio_Realisasi": 0.7,
        "Skala_PBPH": 2e8
    })
}

/// Same case with all 14 fields
pub fn rkt14_input() -> Value {
    let mut input = rkt13_input();
    input["Flag_Prosentase_Tinggi"] = json!(0);
    input
}

/// Synthetic training rows: the class follows the realization ratio bucket
fn training_rows(layout: FeatureLayout) -> (Vec<f64>, Vec<i32>, usize) {
    let names = layout.feature_names();
    let n_samples = 80;
    let mut data = Vec::with_capacity(n_samples * names.len());
    let mut labels = Vec::with_capacity(n_samples);

    for i in 0..n_samples {
        let class = (i % 4) as i32;
        let ratio = match class {
            0 => 0.0,
            1 => 0.25 + (i % 5) as f64 * 0.05,
            2 => 0.6 + (i % 5) as f64 * 0.08,
            _ => 1.2 + (i % 5) as f64 * 0.1,
        };

        for name in &names {
            let value = match *name {
                "Rasio_Realisasi" => ratio,
                "Tahun" => 2018.0 + (i % 7) as f64,
                "Jenis_Hutan" => (i % 2) as f64,
                "Flag_Prosentase_Tinggi" => (class == 3) as i32 as f64,
                "log_Realisasi_Produksi" => 8.0 + ratio * 2.0,
                _ => 1000.0 + (i * 37 % 101) as f64,
            };
            data.push(value);
        }
        labels.push(class);
    }

    (data, labels, n_samples)
}

/// Train a small random forest for `layout` and write it to `path`
pub fn write_fixture_model(path: &Path, layout: FeatureLayout) {
    let (data, labels, n_samples) = training_rows(layout);
    let x = DenseMatrix::new(n_samples, layout.len(), data, false);
    let params = RandomForestClassifierParameters::default()
        .with_n_trees(15)
        .with_seed(42);
    let forest = RandomForestClassifier::fit(&x, &labels, params).unwrap();

    let metadata = ModelMetadata::new("fixture-rf", ModelType::RandomForest, layout.len())
        .with_hyperparameter("n_trees", 15);
    let names = layout
        .feature_names()
        .into_iter()
        .map(String::from)
        .collect();

    ModelArtifact::new(metadata, names, Estimator::RandomForest(forest))
        .save(path)
        .unwrap();
}

/// Router plus the classifier it serves and the directory holding the artifact
pub struct TestApp {
    pub router: Router,
    pub model: Option<Arc<dyn Classifier>>,
    pub dir: TempDir,
}

/// App with a freshly trained fixture model for `layout`
pub fn app_with_model(layout: FeatureLayout) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model_rf.bin");
    write_fixture_model(&path, layout);

    let model = load_classifier(&path, layout).unwrap();
    let service = PredictionService::new(layout, Some(model.clone()));

    TestApp {
        router: build_router(AppState::new(Arc::new(service))),
        model: Some(model),
        dir,
    }
}

/// App serving an arbitrary classifier, bypassing the artifact loader
pub fn app_with_classifier(layout: FeatureLayout, model: Arc<dyn Classifier>) -> Router {
    build_router(AppState::new(Arc::new(PredictionService::new(
        layout,
        Some(model),
    ))))
}

/// App whose model could not be loaded at startup
pub fn app_without_model(layout: FeatureLayout) -> Router {
    build_router(AppState::new(Arc::new(PredictionService::unavailable(
        layout,
    ))))
}

pub async fn post_json(router: Router, uri: &str, body: &Value) -> (u16, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    read_json(router.oneshot(request).await.unwrap()).await
}

pub async fn post_raw(router: Router, uri: &str, body: &'static str) -> (u16, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();

    read_json(router.oneshot(request).await.unwrap()).await
}

/// POST `body` with the given `Content-Type`, or with no such header at all
pub async fn post_with_content_type(
    router: Router,
    uri: &str,
    content_type: Option<&'static str>,
    body: &Value,
) -> (u16, Value) {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    let request = builder
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    read_json(router.oneshot(request).await.unwrap()).await
}

pub async fn get(router: Router, uri: &str) -> (u16, Vec<u8>) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status().as_u16();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn read_json(response: Response<Body>) -> (u16, Value) {
    let status = response.status().as_u16();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}
