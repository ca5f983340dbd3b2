use std::path::PathBuf;

use thiserror::Error;

/// Failure loading one of the persisted artifacts. Fatal for the process.
#[derive(Debug, Error)]
pub enum ArtifactLoadError {
    /// The artifact file could not be read.
    #[error("reading artifact {path}: {source}")]
    Io {
        /// Artifact location.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The artifact file is not a valid document.
    #[error("parsing artifact {path}: {source}")]
    Parse {
        /// Artifact location.
        path: PathBuf,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },
    /// The artifact parsed but violates a structural invariant.
    #[error("invalid artifact {artifact}: {reason}")]
    Invalid {
        /// Artifact name.
        artifact: &'static str,
        /// Description of the violation.
        reason: String,
    },
}

/// Failure turning raw form inputs into an ordered record.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AssemblyError {
    /// A required field was not submitted.
    #[error("missing field `{0}`")]
    MissingField(String),
    /// A numeric field did not parse as a number.
    #[error("field `{field}` is not a number: {value:?}")]
    InvalidNumber {
        /// Field name.
        field: String,
        /// Submitted text.
        value: String,
    },
    /// A numeric field is outside its accepted range.
    #[error("field `{field}` = {value} is outside [{min}, {max}]")]
    OutOfRange {
        /// Field name.
        field: String,
        /// Parsed value.
        value: f64,
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
    },
    /// A categorical value is not one of the legal choices.
    #[error("field `{field}` does not accept {value:?} (expected one of {allowed:?})")]
    OutOfVocabulary {
        /// Field name.
        field: String,
        /// Submitted value.
        value: String,
        /// Legal values.
        allowed: Vec<String>,
    },
    /// The expected column order names a field the record schema lacks.
    #[error("expected column `{0}` is not part of the patient record")]
    UnknownColumn(String),
    /// A patient field has no slot in the expected column order.
    #[error("field `{0}` is absent from the expected columns")]
    UnmappedField(String),
}

/// Failure invoking the model or decoding its output.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PredictionError {
    /// The model rejected the record.
    #[error("model failure: {0}")]
    Model(String),
    /// The model returned a class index the label encoder does not know.
    #[error("class index {index} outside label encoder range (classes: {classes})")]
    UnknownClassIndex {
        /// Returned index.
        index: usize,
        /// Number of known classes.
        classes: usize,
    },
    /// The probability vector is not a distribution over the known classes.
    #[error("invalid probability distribution: {0}")]
    InvalidProbabilities(String),
}

/// Any failure of the prediction pipeline.
#[derive(Debug, Error)]
pub enum PredictorError {
    /// Loading artifacts failed.
    #[error(transparent)]
    ArtifactLoad(#[from] ArtifactLoadError),
    /// Assembling the record failed.
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
    /// Invoking the model failed.
    #[error(transparent)]
    Prediction(#[from] PredictionError),
}

impl PredictorError {
    /// Short machine-friendly kind used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ArtifactLoad(_) => "artifact_load",
            Self::Assembly(_) => "assembly",
            Self::Prediction(_) => "prediction",
        }
    }

    /// Whether a new submission can succeed after this error.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::ArtifactLoad(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_failures_are_fatal() {
        let err = PredictorError::from(ArtifactLoadError::Invalid {
            artifact: "model",
            reason: "model scores 5 classes, label encoder knows 6".into(),
        });
        assert_eq!(err.kind(), "artifact_load");
        assert!(!err.is_recoverable());
        assert!(err.to_string().starts_with("invalid artifact model"));
    }

    #[test]
    fn submission_failures_are_recoverable() {
        let assembly = PredictorError::from(AssemblyError::UnmappedField("TUE".into()));
        assert_eq!(assembly.kind(), "assembly");
        assert!(assembly.is_recoverable());
        let prediction = PredictorError::from(PredictionError::UnknownClassIndex {
            index: 9,
            classes: 6,
        });
        assert_eq!(prediction.kind(), "prediction");
        assert!(prediction.is_recoverable());
    }
}
