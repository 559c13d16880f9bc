use crate::error::FieldError;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Primitive type a feature accepts on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Float,
    Integer,
}

/// One named feature column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSpec {
    pub name: &'static str,
    pub kind: FeatureKind,
}

const fn float(name: &'static str) -> FeatureSpec {
    FeatureSpec {
        name,
        kind: FeatureKind::Float,
    }
}

const fn integer(name: &'static str) -> FeatureSpec {
    FeatureSpec {
        name,
        kind: FeatureKind::Integer,
    }
}

const RKT14_FEATURES: [FeatureSpec; 14] = [
    float("Rasio_Realisasi"),
    float("log_Realisasi_Produksi"),
    float("Realisasi_Alam"),
    float("Target_Jumlah_Luas"),
    float("Skala_PBPH"),
    float("Target_Murni_Volume"),
    float("Realisasi_Tanaman"),
    float("Target_Murni_Luas"),
    float("Target_Carry_Volume"),
    float("Target_Carry_Luas"),
    float("Luas_PBPH"),
    integer("Tahun"),
    integer("Jenis_Hutan"), // 0 = Hutan Alam, 1 = Hutan Tanaman
    integer("Flag_Prosentase_Tinggi"),
];

const RKT13_FEATURES: [FeatureSpec; 13] = [
    integer("Tahun"),
    integer("Jenis_Hutan"),
    float("Luas_PBPH"),
    float("Target_Murni_Luas"),
    float("Target_Murni_Volume"),
    float("Target_Carry_Luas"),
    float("Target_Carry_Volume"),
    float("Target_Jumlah_Luas"),
    float("Realisasi_Alam"),
    float("Realisasi_Tanaman"),
    float("log_Realisasi_Produksi"),
    float("Rasio_Realisasi"),
    float("Skala_PBPH"),
];

/// Ordered feature list a model artifact was trained on.
///
/// The order is owned by whoever trained the model. The service never infers
/// it; the configured layout is checked against the names recorded in the
/// artifact when the model is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FeatureLayout {
    /// 14 features, ratio-first ordering
    #[default]
    Rkt14,

    /// 13 features, year-first ordering without `Flag_Prosentase_Tinggi`
    Rkt13,
}

impl FeatureLayout {
    /// Feature columns in model order
    pub fn specs(&self) -> &'static [FeatureSpec] {
        match self {
            FeatureLayout::Rkt14 => &RKT14_FEATURES,
            FeatureLayout::Rkt13 => &RKT13_FEATURES,
        }
    }

    pub fn feature_names(&self) -> Vec<&'static str> {
        self.specs().iter().map(|spec| spec.name).collect()
    }

    pub fn len(&self) -> usize {
        self.specs().len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs().is_empty()
    }

    /// True when `names` lists exactly this layout's features in the same order
    pub fn matches<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.len() == self.len()
            && self
                .specs()
                .iter()
                .zip(names)
                .all(|(spec, name)| spec.name == name.as_ref())
    }

    /// Validate a JSON request body against this layout.
    ///
    /// Every failing field is reported, not just the first one. Fields that
    /// are not part of the layout are ignored.
    pub fn parse(&self, body: &Value) -> Result<FeatureRow, Vec<FieldError>> {
        let object = match body.as_object() {
            Some(object) => object,
            None => {
                return Err(vec![FieldError::new(
                    &["body"],
                    "value is not a valid dict",
                    "type_error.dict",
                )])
            }
        };

        let mut values = Vec::with_capacity(self.len());
        let mut errors = Vec::new();

        for spec in self.specs() {
            let parsed = match object.get(spec.name) {
                None => Err(FieldError::missing(spec.name)),
                Some(value) => match spec.kind {
                    FeatureKind::Float => {
                        parse_float(value).ok_or_else(|| FieldError::not_float(spec.name))
                    }
                    FeatureKind::Integer => parse_integer(value)
                        .map(|v| v as f64)
                        .ok_or_else(|| FieldError::not_integer(spec.name)),
                },
            };

            match parsed {
                Ok(value) => values.push(value),
                Err(error) => errors.push(error),
            }
        }

        if errors.is_empty() {
            Ok(FeatureRow {
                layout: *self,
                values,
            })
        } else {
            Err(errors)
        }
    }
}

impl std::fmt::Display for FeatureLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureLayout::Rkt14 => write!(f, "rkt14"),
            FeatureLayout::Rkt13 => write!(f, "rkt13"),
        }
    }
}

fn parse_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        _ => None,
    }
}

fn parse_integer(value: &Value) -> Option<i64> {
    let number = match value {
        Value::Number(number) => number,
        _ => return None,
    };

    if let Some(v) = number.as_i64() {
        return Some(v);
    }

    // Accept integral floats such as 2024.0
    let v = number.as_f64()?;
    if v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}

/// A validated request body, values already in model order
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    layout: FeatureLayout,
    values: Vec<f64>,
}

impl FeatureRow {
    pub fn layout(&self) -> FeatureLayout {
        self.layout
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// One-row matrix handed to the classifier
    pub fn to_matrix(&self) -> Result<Array2<f64>, ndarray::ShapeError> {
        Array2::from_shape_vec((1, self.values.len()), self.values.clone())
    }
}
