//! Pretrained classifiers.
//!
//! Models are exported offline as JSON documents tagged by `kind`. The only
//! kind shipped today is a multinomial logistic regression carrying its own
//! preprocessing (standardised numerics, one-hot categoricals).

use ndarray::{Array1, Array2};
use serde::Deserialize;

use crate::{errors::PredictionError, record::OrderedRecord};

/// A classifier over assembled patient records.
pub trait Classifier: Send + Sync {
    /// Number of classes the model scores.
    fn n_classes(&self) -> usize;

    /// Columns the model reads from a record.
    fn input_columns(&self) -> Vec<&str>;

    /// Probability of every class, in the model's class order.
    fn predict_proba(&self, record: &OrderedRecord) -> Result<Vec<f64>, PredictionError>;

    /// Most probable class index. Ties resolve to the lowest index.
    fn predict(&self, record: &OrderedRecord) -> Result<usize, PredictionError> {
        let probabilities = self.predict_proba(record)?;
        argmax(&probabilities)
            .ok_or_else(|| PredictionError::Model("empty probability vector".into()))
    }
}

/// Model document as persisted on disk.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    /// Multinomial logistic regression.
    SoftmaxLinear(SoftmaxLinearModel),
}

impl Classifier for ModelArtifact {
    fn n_classes(&self) -> usize {
        match self {
            Self::SoftmaxLinear(model) => model.n_classes(),
        }
    }

    fn input_columns(&self) -> Vec<&str> {
        match self {
            Self::SoftmaxLinear(model) => model.input_columns(),
        }
    }

    fn predict_proba(&self, record: &OrderedRecord) -> Result<Vec<f64>, PredictionError> {
        match self {
            Self::SoftmaxLinear(model) => model.predict_proba(record),
        }
    }
}

/// Standardisation parameters of a numeric column.
#[derive(Debug, Clone, Deserialize)]
pub struct NumericFeature {
    /// Source column.
    pub column: String,
    /// Training mean.
    pub mean: f64,
    /// Training standard deviation.
    pub scale: f64,
}

/// One-hot levels of a categorical column.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoricalFeature {
    /// Source column.
    pub column: String,
    /// Known levels, one indicator per level.
    pub levels: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct SoftmaxLinearDocument {
    #[serde(default)]
    numeric: Vec<NumericFeature>,
    #[serde(default)]
    categorical: Vec<CategoricalFeature>,
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
}

/// Multinomial logistic regression with embedded preprocessing.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "SoftmaxLinearDocument")]
pub struct SoftmaxLinearModel {
    numeric: Vec<NumericFeature>,
    categorical: Vec<CategoricalFeature>,
    weights: Array2<f64>,
    bias: Array1<f64>,
}

impl TryFrom<SoftmaxLinearDocument> for SoftmaxLinearModel {
    type Error = String;

    fn try_from(doc: SoftmaxLinearDocument) -> Result<Self, Self::Error> {
        let n_features =
            doc.numeric.len() + doc.categorical.iter().map(|f| f.levels.len()).sum::<usize>();
        let n_classes = doc.bias.len();
        if n_classes == 0 || n_features == 0 {
            return Err("model has no classes or no features".into());
        }
        if doc.weights.len() != n_classes {
            return Err(format!(
                "weights have {} rows, bias has {n_classes} entries",
                doc.weights.len()
            ));
        }
        if let Some((idx, row)) = doc
            .weights
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != n_features)
        {
            return Err(format!(
                "weight row {idx} has {} columns, expected {n_features}",
                row.len()
            ));
        }
        if let Some(feature) = doc
            .numeric
            .iter()
            .find(|f| !f.mean.is_finite() || !f.scale.is_finite() || f.scale <= 0.0)
        {
            return Err(format!("invalid standardisation for {}", feature.column));
        }
        let flat: Vec<f64> = doc.weights.into_iter().flatten().collect();
        if flat.iter().chain(doc.bias.iter()).any(|w| !w.is_finite()) {
            return Err("non-finite coefficient".into());
        }
        let weights = Array2::from_shape_vec((n_classes, n_features), flat)
            .map_err(|err| err.to_string())?;
        Ok(Self {
            numeric: doc.numeric,
            categorical: doc.categorical,
            weights,
            bias: Array1::from(doc.bias),
        })
    }
}

impl SoftmaxLinearModel {
    /// Length of the encoded feature vector.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.weights.ncols()
    }

    fn encode(&self, record: &OrderedRecord) -> Result<Array1<f64>, PredictionError> {
        let mut features = Vec::with_capacity(self.n_features());
        for feature in &self.numeric {
            let value = record.number(&feature.column).ok_or_else(|| {
                PredictionError::Model(format!("numeric column {} unavailable", feature.column))
            })?;
            features.push((value - feature.mean) / feature.scale);
        }
        for feature in &self.categorical {
            let value = record.category(&feature.column).ok_or_else(|| {
                PredictionError::Model(format!("categorical column {} unavailable", feature.column))
            })?;
            // Unseen levels encode as all zeros.
            features.extend(
                feature
                    .levels
                    .iter()
                    .map(|level| if level == value { 1.0 } else { 0.0 }),
            );
        }
        Ok(Array1::from(features))
    }
}

impl Classifier for SoftmaxLinearModel {
    fn n_classes(&self) -> usize {
        self.bias.len()
    }

    fn input_columns(&self) -> Vec<&str> {
        self.numeric
            .iter()
            .map(|f| f.column.as_str())
            .chain(self.categorical.iter().map(|f| f.column.as_str()))
            .collect()
    }

    fn predict_proba(&self, record: &OrderedRecord) -> Result<Vec<f64>, PredictionError> {
        let features = self.encode(record)?;
        let logits = self.weights.dot(&features) + &self.bias;
        Ok(softmax(logits.as_slice().unwrap_or_default()))
    }
}

/// Numerically stable softmax.
#[must_use]
pub fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|logit| (logit - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|value| value / total).collect()
}

/// Index of the first maximum.
#[must_use]
pub fn argmax(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (idx, &value)| match best {
            Some((_, top)) if value <= top => best,
            _ => Some((idx, value)),
        })
        .map(|(idx, _)| idx)
}
