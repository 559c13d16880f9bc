/// Machine learning module for achievement-category prediction
///
/// This module provides:
/// - The request schema and feature layouts (`features`)
/// - The opaque classifier handle and its smartcore implementation (`classifier`)
/// - The on-disk model artifact and label table (`models`)
/// - The one-shot startup loader (`loader`)
/// - Single-row prediction orchestration (`service`)

pub mod classifier;
pub mod features;
pub mod loader;
pub mod models;
pub mod service;

pub use classifier::{Classifier, TreeClassifier};
pub use features::{FeatureKind, FeatureLayout, FeatureRow, FeatureSpec};
pub use loader::{load_classifier, load_model, read_artifact, verify_artifact, ModelLoadError};
pub use models::{
    capaian_label, AchievementCategory, DecisionTree, Estimator, ModelArtifact, ModelMetadata,
    ModelType, Prediction, RandomForest, UNKNOWN_LABEL,
};
pub use service::PredictionService;
