use crate::config::ModelConfig;
use crate::ml::classifier::{Classifier, TreeClassifier};
use crate::ml::features::FeatureLayout;
use crate::ml::models::ModelArtifact;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// Reasons a model artifact could not be loaded
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("model artifact not found at {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode model artifact: {0}")]
    Decode(#[from] bincode::Error),

    #[error("artifact declares {declared} features but lists {listed} feature names")]
    InconsistentMetadata { declared: usize, listed: usize },

    #[error("artifact feature order {found:?} does not match layout {layout} {expected:?}")]
    LayoutMismatch {
        layout: FeatureLayout,
        expected: Vec<String>,
        found: Vec<String>,
    },
}

/// Read and decode an artifact without checking it against a layout
pub fn read_artifact(path: &Path) -> Result<ModelArtifact, ModelLoadError> {
    if !path.exists() {
        return Err(ModelLoadError::NotFound(path.to_path_buf()));
    }

    let bytes = std::fs::read(path).map_err(|source| ModelLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(ModelArtifact::from_bytes(&bytes)?)
}

/// Check that an artifact was trained on exactly the configured feature order
pub fn verify_artifact(
    artifact: &ModelArtifact,
    layout: FeatureLayout,
) -> Result<(), ModelLoadError> {
    if artifact.metadata.n_features != artifact.feature_names.len() {
        return Err(ModelLoadError::InconsistentMetadata {
            declared: artifact.metadata.n_features,
            listed: artifact.feature_names.len(),
        });
    }

    if !layout.matches(&artifact.feature_names) {
        return Err(ModelLoadError::LayoutMismatch {
            layout,
            expected: layout.feature_names().into_iter().map(String::from).collect(),
            found: artifact.feature_names.clone(),
        });
    }

    Ok(())
}

/// Load a classifier for `layout` from `path`
pub fn load_classifier(
    path: &Path,
    layout: FeatureLayout,
) -> Result<Arc<dyn Classifier>, ModelLoadError> {
    let artifact = read_artifact(path)?;
    verify_artifact(&artifact, layout)?;
    Ok(Arc::new(TreeClassifier::from_artifact(artifact)))
}

/// Startup model load.
///
/// Never fails: a missing or unreadable artifact is logged and the service
/// runs without a model, answering every prediction with "model unavailable".
pub fn load_model(config: &ModelConfig) -> Option<Arc<dyn Classifier>> {
    let model = match load_classifier(&config.path, config.feature_layout) {
        Ok(model) => {
            let metadata = model.metadata();
            info!(
                path = %config.path.display(),
                name = %metadata.name,
                version = %metadata.version,
                model_type = %metadata.model_type,
                n_features = metadata.n_features,
                layout = %config.feature_layout,
                "✅ Model loaded"
            );
            Some(model)
        }
        Err(ModelLoadError::NotFound(path)) => {
            warn!(
                path = %path.display(),
                "⚠️  Model artifact not found, predictions are unavailable"
            );
            None
        }
        Err(e) => {
            error!(path = %config.path.display(), "❌ Failed to load model: {}", e);
            None
        }
    };

    crate::metrics::MODEL_LOADED.set(if model.is_some() { 1.0 } else { 0.0 });
    model
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::models::{Estimator, ModelMetadata, ModelType};
    use smartcore::linalg::basic::matrix::DenseMatrix;
    use smartcore::tree::decision_tree_classifier::{
        DecisionTreeClassifier, DecisionTreeClassifierParameters,
    };

    fn artifact_for(layout: FeatureLayout) -> ModelArtifact {
        let n_features = layout.len();
        let n_samples = 8;
        let mut data = Vec::with_capacity(n_samples * n_features);
        let mut labels = Vec::with_capacity(n_samples);
        for i in 0..n_samples {
            for j in 0..n_features {
                data.push((i * (j + 1)) as f64);
            }
            labels.push((i % 4) as i32);
        }
        let x = DenseMatrix::new(n_samples, n_features, data, false);
        let model =
            DecisionTreeClassifier::fit(&x, &labels, DecisionTreeClassifierParameters::default())
                .unwrap();

        ModelArtifact::new(
            ModelMetadata::new("fixture", ModelType::DecisionTree, n_features),
            layout.feature_names().into_iter().map(String::from).collect(),
            Estimator::DecisionTree(model),
        )
    }

    #[test]
    fn test_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.bin");

        let err = load_classifier(&path, FeatureLayout::Rkt14).err().unwrap();
        assert!(matches!(err, ModelLoadError::NotFound(_)));

        let config = ModelConfig {
            path,
            feature_layout: FeatureLayout::Rkt14,
        };
        assert!(load_model(&config).is_none());
    }

    #[test]
    fn test_corrupt_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model_rf.bin");
        std::fs::write(&path, b"not a model").unwrap();

        let err = load_classifier(&path, FeatureLayout::Rkt14).err().unwrap();
        assert!(matches!(err, ModelLoadError::Decode(_)));
    }

    #[test]
    fn test_artifact_loads_for_matching_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model_rf.bin");
        artifact_for(FeatureLayout::Rkt13).save(&path).unwrap();

        let model = load_classifier(&path, FeatureLayout::Rkt13).unwrap();
        assert_eq!(model.metadata().name, "fixture");
        assert_eq!(model.metadata().n_features, 13);

        let config = ModelConfig {
            path,
            feature_layout: FeatureLayout::Rkt13,
        };
        assert!(load_model(&config).is_some());
    }

    #[test]
    fn test_layout_mismatch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model_rf.bin");
        artifact_for(FeatureLayout::Rkt14).save(&path).unwrap();

        let err = load_classifier(&path, FeatureLayout::Rkt13).err().unwrap();
        assert!(matches!(
            err,
            ModelLoadError::LayoutMismatch {
                layout: FeatureLayout::Rkt13,
                ..
            }
        ));
    }

    #[test]
    fn test_inconsistent_metadata_is_rejected() {
        let mut artifact = artifact_for(FeatureLayout::Rkt14);
        artifact.metadata.n_features = 3;

        let err = verify_artifact(&artifact, FeatureLayout::Rkt14).err().unwrap();
        assert!(matches!(
            err,
            ModelLoadError::InconsistentMetadata {
                declared: 3,
                listed: 14
            }
        ));
    }
}
