use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_classifier::RandomForestClassifier;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_classifier::DecisionTreeClassifier;
use std::collections::HashMap;
use std::io::Write;

/// Random forest as stored in a model artifact
pub type RandomForest = RandomForestClassifier<f64, i32, DenseMatrix<f64>, Vec<i32>>;

/// Single decision tree as stored in a model artifact
pub type DecisionTree = DecisionTreeClassifier<f64, i32, DenseMatrix<f64>, Vec<i32>>;

/// Label returned for classes outside the known table
pub const UNKNOWN_LABEL: &str = "Tidak diketahui";

/// Realization-rate bucket predicted by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AchievementCategory {
    /// No realization at all
    None,
    /// 1–50% realized
    Low,
    /// 51–100% realized
    High,
    /// Over target
    Exceeded,
}

impl AchievementCategory {
    pub fn from_class(class: i64) -> Option<Self> {
        match class {
            0 => Some(AchievementCategory::None),
            1 => Some(AchievementCategory::Low),
            2 => Some(AchievementCategory::High),
            3 => Some(AchievementCategory::Exceeded),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AchievementCategory::None => "0% (Tidak Ada Realisasi)",
            AchievementCategory::Low => "1–50%",
            AchievementCategory::High => "51–100%",
            AchievementCategory::Exceeded => ">100%",
        }
    }
}

/// Display label for a raw model class, never fails
pub fn capaian_label(class: i64) -> &'static str {
    AchievementCategory::from_class(class)
        .map(|category| category.label())
        .unwrap_or(UNKNOWN_LABEL)
}

/// Body of a successful `/predict` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(rename = "Kategori")]
    pub kategori: i64,

    #[serde(rename = "Capaian")]
    pub capaian: String,
}

impl Prediction {
    pub fn from_class(class: i64) -> Self {
        Self {
            kategori: class,
            capaian: capaian_label(class).to_string(),
        }
    }
}

/// Estimator family stored in an artifact
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    RandomForest,
    DecisionTree,
}

impl std::fmt::Display for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelType::RandomForest => write!(f, "Random Forest"),
            ModelType::DecisionTree => write!(f, "Decision Tree"),
        }
    }
}

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelMetadata {
    /// Model name
    pub name: String,

    /// Model version
    pub version: String,

    /// Model type
    pub model_type: ModelType,

    /// Training timestamp
    pub trained_at: chrono::DateTime<chrono::Utc>,

    /// Number of features
    pub n_features: usize,

    /// Number of target classes
    pub n_classes: usize,

    /// Hyperparameters
    pub hyperparameters: HashMap<String, String>,
}

impl ModelMetadata {
    pub fn new(name: impl Into<String>, model_type: ModelType, n_features: usize) -> Self {
        Self {
            name: name.into(),
            version: "1.0".to_string(),
            model_type,
            trained_at: chrono::Utc::now(),
            n_features,
            n_classes: 4,
            hyperparameters: HashMap::new(),
        }
    }

    pub fn with_hyperparameter(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.hyperparameters.insert(key.into(), value.to_string());
        self
    }
}

/// Fitted estimator carried by an artifact
#[derive(Serialize, Deserialize)]
pub enum Estimator {
    RandomForest(RandomForest),
    DecisionTree(DecisionTree),
}

impl Estimator {
    pub fn model_type(&self) -> ModelType {
        match self {
            Estimator::RandomForest(_) => ModelType::RandomForest,
            Estimator::DecisionTree(_) => ModelType::DecisionTree,
        }
    }
}

impl std::fmt::Debug for Estimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Estimator({})", self.model_type())
    }
}

/// On-disk model artifact (bincode)
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub metadata: ModelMetadata,

    /// Feature names in the column order used for training
    pub feature_names: Vec<String>,

    pub estimator: Estimator,
}

impl ModelArtifact {
    pub fn new(metadata: ModelMetadata, feature_names: Vec<String>, estimator: Estimator) -> Self {
        Self {
            metadata,
            feature_names,
            estimator,
        }
    }

    /// Decode an artifact from its serialized bytes
    pub fn from_bytes(bytes: &[u8]) -> bincode::Result<Self> {
        bincode::deserialize(bytes)
    }

    pub fn write_to<W: Write>(&self, writer: W) -> bincode::Result<()> {
        bincode::serialize_into(writer, self)
    }

    /// Write the artifact to `path`, replacing any existing file
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> bincode::Result<()> {
        let mut writer = std::io::BufWriter::new(std::fs::File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
