use serde::Serialize;

use crate::{artifacts::ArtifactStore, errors::PredictionError, record::OrderedRecord};

/// Tolerance on the probability sum.
pub const PROBABILITY_TOLERANCE: f64 = 1e-3;

/// Decoded model output for one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Predicted class index.
    pub class_index: usize,
    /// Decoded label, e.g. `Obesity_Type_I`.
    pub label: String,
    /// Probability of every class, aligned with the label encoder.
    pub probabilities: Vec<f64>,
}

impl Prediction {
    /// Probability of the predicted class.
    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.probabilities
            .get(self.class_index)
            .copied()
            .unwrap_or_default()
    }
}

/// Runs the stored model and decodes its answer.
#[derive(Debug, Clone, Copy)]
pub struct Predictor<'a> {
    store: &'a ArtifactStore,
}

impl<'a> Predictor<'a> {
    /// Binds the invoker to a loaded store.
    #[must_use]
    pub const fn new(store: &'a ArtifactStore) -> Self {
        Self { store }
    }

    /// Classifies a record. No retries: any model failure is returned as is.
    pub fn predict(&self, record: &OrderedRecord) -> Result<Prediction, PredictionError> {
        let model = self.store.model();
        let encoder = self.store.label_encoder();

        let class_index = model.predict(record)?;
        let probabilities = model.predict_proba(record)?;
        check_distribution(&probabilities, encoder.len())?;

        let label = encoder
            .inverse_transform(class_index)
            .ok_or(PredictionError::UnknownClassIndex {
                index: class_index,
                classes: encoder.len(),
            })?
            .to_string();
        Ok(Prediction {
            class_index,
            label,
            probabilities,
        })
    }
}

/// Checks that `probabilities` is a distribution over `classes` classes.
pub fn check_distribution(probabilities: &[f64], classes: usize) -> Result<(), PredictionError> {
    if probabilities.len() != classes {
        return Err(PredictionError::InvalidProbabilities(format!(
            "{} values for {classes} classes",
            probabilities.len()
        )));
    }
    if let Some(value) = probabilities
        .iter()
        .find(|p| !p.is_finite() || !(0.0..=1.0).contains(*p))
    {
        return Err(PredictionError::InvalidProbabilities(format!(
            "value {value} outside [0, 1]"
        )));
    }
    let total: f64 = probabilities.iter().sum();
    if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(PredictionError::InvalidProbabilities(format!(
            "values sum to {total}"
        )));
    }
    Ok(())
}
