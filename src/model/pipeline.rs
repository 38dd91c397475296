//! Preprocessing + logistic regression artifact.
//!
//! The artifact is a JSON document produced offline by the training script.
//! Numeric columns are standardized, categorical columns are one-hot encoded
//! over the categories seen during fitting, and the encoded row is scored by
//! a binary logistic regression.

use serde::Deserialize;
use std::collections::HashSet;

use super::Classifier;
use super::error::{InferenceError, LoadError};
use super::table::{Table, Value};

/// Artifact format version this build understands.
pub const FORMAT_VERSION: u32 = 1;

/// Version field only, read before the full document.
#[derive(Deserialize)]
pub(crate) struct ArtifactHeader {
    pub format_version: u32,
}

/// One input column and how it is encoded.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Feature {
    Numeric {
        name: String,
        mean: f64,
        scale: f64,
    },
    Categorical {
        name: String,
        categories: Vec<String>,
    },
}

impl Feature {
    pub fn name(&self) -> &str {
        match self {
            Feature::Numeric { name, .. } | Feature::Categorical { name, .. } => name,
        }
    }

    /// Number of encoded slots this column occupies.
    fn width(&self) -> usize {
        match self {
            Feature::Numeric { .. } => 1,
            Feature::Categorical { categories, .. } => categories.len(),
        }
    }

    fn encode(&self, value: &Value, out: &mut Vec<f64>) -> Result<(), InferenceError> {
        match self {
            Feature::Numeric { name, mean, scale } => {
                let x = value.as_f64().ok_or_else(|| InferenceError::TypeMismatch {
                    column: name.clone(),
                    expected: "numeric",
                })?;
                if !x.is_finite() {
                    return Err(InferenceError::NonFinite(name.clone()));
                }
                out.push((x - mean) / scale);
            }
            Feature::Categorical { name, categories } => {
                let s = value.as_str().ok_or_else(|| InferenceError::TypeMismatch {
                    column: name.clone(),
                    expected: "string",
                })?;
                let hit = categories.iter().position(|c| c == s).ok_or_else(|| {
                    InferenceError::UnknownCategory {
                        column: name.clone(),
                        value: s.to_string(),
                        expected: categories.join(", "),
                    }
                })?;
                out.extend((0..categories.len()).map(|i| if i == hit { 1.0 } else { 0.0 }));
            }
        }
        Ok(())
    }
}

/// Fitted preprocessing + logistic regression.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogisticPipeline {
    pub format_version: u32,
    #[serde(default)]
    pub model: String,
    pub features: Vec<Feature>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LogisticPipeline {
    /// Structural checks run once at load time. `known_columns` is the set of
    /// column names the caller is able to supply.
    pub fn validate(&self, known_columns: &[&str]) -> Result<(), LoadError> {
        if self.format_version != FORMAT_VERSION {
            return Err(LoadError::UnsupportedVersion {
                found: self.format_version,
                supported: FORMAT_VERSION,
            });
        }
        if self.features.is_empty() {
            return Err(LoadError::Invalid("artifact declares no features".into()));
        }

        let mut seen = HashSet::new();
        for feature in &self.features {
            let name = feature.name();
            if !known_columns.contains(&name) {
                return Err(LoadError::Invalid(format!(
                    "feature '{name}' is not one of the input columns ({})",
                    known_columns.join(", ")
                )));
            }
            if !seen.insert(name) {
                return Err(LoadError::Invalid(format!("feature '{name}' declared twice")));
            }
            match feature {
                Feature::Numeric { mean, scale, .. } => {
                    if !mean.is_finite() || !scale.is_finite() || *scale == 0.0 {
                        return Err(LoadError::Invalid(format!(
                            "feature '{name}' has a degenerate scaler (mean {mean}, scale {scale})"
                        )));
                    }
                }
                Feature::Categorical { categories, .. } => {
                    if categories.is_empty() {
                        return Err(LoadError::Invalid(format!(
                            "feature '{name}' has no categories"
                        )));
                    }
                    let distinct: HashSet<_> = categories.iter().collect();
                    if distinct.len() != categories.len() {
                        return Err(LoadError::Invalid(format!(
                            "feature '{name}' has duplicate categories"
                        )));
                    }
                }
            }
        }

        let width = self.encoded_width();
        if self.coefficients.len() != width {
            return Err(LoadError::Invalid(format!(
                "expected {width} coefficients for the encoded features, found {}",
                self.coefficients.len()
            )));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|w| !w.is_finite()) {
            return Err(LoadError::Invalid("non-finite model weights".into()));
        }
        Ok(())
    }

    fn encoded_width(&self) -> usize {
        self.features.iter().map(Feature::width).sum()
    }

    fn encode_row(&self, table: &Table, row: &[Value]) -> Result<Vec<f64>, InferenceError> {
        let mut encoded = Vec::with_capacity(self.encoded_width());
        for feature in &self.features {
            let idx = table
                .column_index(feature.name())
                .ok_or_else(|| InferenceError::MissingColumn(feature.name().to_string()))?;
            feature.encode(&row[idx], &mut encoded)?;
        }
        Ok(encoded)
    }

    fn decision(&self, encoded: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(encoded)
                .map(|(w, x)| w * x)
                .sum::<f64>()
    }
}

/// Logistic function without overflow for large |z|.
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

impl Classifier for LogisticPipeline {
    fn predict(&self, table: &Table) -> Result<Vec<u8>, InferenceError> {
        Ok(self
            .predict_proba(table)?
            .into_iter()
            .map(|[p0, p1]| u8::from(p1 > p0))
            .collect())
    }

    fn predict_proba(&self, table: &Table) -> Result<Vec<[f64; 2]>, InferenceError> {
        table
            .rows()
            .iter()
            .map(|row| {
                let encoded = self.encode_row(table, row)?;
                let p1 = sigmoid(self.decision(&encoded));
                Ok([1.0 - p1, p1])
            })
            .collect()
    }
}
