use crate::error::{AppError, Result};
use crate::ml::models::{Estimator, ModelArtifact, ModelMetadata, ModelType};
use ndarray::Array2;
use smartcore::linalg::basic::matrix::DenseMatrix;

/// Trait for classifiers
pub trait Classifier: Send + Sync {
    /// Predict class labels, one per row
    fn predict(&self, features: &Array2<f64>) -> Result<Vec<i64>>;

    /// Get model metadata
    fn metadata(&self) -> &ModelMetadata;

    /// Get model type
    fn model_type(&self) -> ModelType {
        self.metadata().model_type
    }
}

/// Classifier backed by a deserialized smartcore tree model
pub struct TreeClassifier {
    metadata: ModelMetadata,
    feature_names: Vec<String>,
    estimator: Estimator,
}

impl TreeClassifier {
    pub fn from_artifact(artifact: ModelArtifact) -> Self {
        Self {
            metadata: artifact.metadata,
            feature_names: artifact.feature_names,
            estimator: artifact.estimator,
        }
    }

    fn ndarray_to_densematrix(arr: &Array2<f64>) -> DenseMatrix<f64> {
        let shape = arr.shape();
        let data: Vec<f64> = arr.iter().copied().collect();
        DenseMatrix::new(shape[0], shape[1], data, false)
    }
}

impl Classifier for TreeClassifier {
    fn predict(&self, features: &Array2<f64>) -> Result<Vec<i64>> {
        if features.ncols() != self.feature_names.len() {
            return Err(AppError::Prediction(format!(
                "model expects {} features, got {}",
                self.feature_names.len(),
                features.ncols()
            )));
        }

        let x = Self::ndarray_to_densematrix(features);
        let predictions = match &self.estimator {
            Estimator::RandomForest(model) => model.predict(&x),
            Estimator::DecisionTree(model) => model.predict(&x),
        }
        .map_err(|e| AppError::Prediction(e.to_string()))?;

        Ok(predictions.iter().map(|&class| class as i64).collect())
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}
