use crate::error::{AppError, Result};
use crate::metrics;
use crate::ml::classifier::Classifier;
use crate::ml::features::{FeatureLayout, FeatureRow};
use crate::ml::models::{ModelMetadata, Prediction};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Prediction service.
///
/// Holds the model handle chosen at startup. The handle is never replaced,
/// so the service is shared between requests without locking.
pub struct PredictionService {
    /// Loaded model, `None` when the startup load did not succeed
    model: Option<Arc<dyn Classifier>>,

    /// Feature order requests are validated and assembled in
    layout: FeatureLayout,
}

impl PredictionService {
    pub fn new(layout: FeatureLayout, model: Option<Arc<dyn Classifier>>) -> Self {
        Self { model, layout }
    }

    /// Service with no model; every prediction fails with `ModelUnavailable`
    pub fn unavailable(layout: FeatureLayout) -> Self {
        Self::new(layout, None)
    }

    pub fn layout(&self) -> FeatureLayout {
        self.layout
    }

    pub fn is_model_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn model_metadata(&self) -> Option<&ModelMetadata> {
        self.model.as_deref().map(|model| model.metadata())
    }

    /// Classify a single validated row
    pub fn predict(&self, row: &FeatureRow) -> Result<Prediction> {
        let result = self.predict_inner(row);

        match &result {
            Ok(prediction) => {
                metrics::PREDICTIONS_TOTAL
                    .with_label_values(&[&prediction.kategori.to_string()])
                    .inc();
            }
            Err(e) => {
                metrics::PREDICTION_ERRORS_TOTAL
                    .with_label_values(&[e.error_code()])
                    .inc();
            }
        }

        result
    }

    fn predict_inner(&self, row: &FeatureRow) -> Result<Prediction> {
        let model = self.model.as_ref().ok_or(AppError::ModelUnavailable)?;

        if row.layout() != self.layout {
            return Err(AppError::Prediction(format!(
                "row uses layout {} but the model expects {}",
                row.layout(),
                self.layout
            )));
        }

        let start = Instant::now();
        let features = row
            .to_matrix()
            .map_err(|e| AppError::Prediction(e.to_string()))?;
        let classes = model.predict(&features)?;
        metrics::PREDICTION_DURATION_SECONDS.observe(start.elapsed().as_secs_f64());

        let class = classes
            .first()
            .copied()
            .ok_or_else(|| AppError::Prediction("model returned no prediction".to_string()))?;

        debug!(class, "Model prediction complete");
        Ok(Prediction::from_class(class))
    }
}
