#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! Obesity level inference: derived BMI features, patient record assembly,
//! the read-only artifact store and the prediction pipeline.

/// Body-mass-index calculation and bucketing.
#[path = "../bmi.rs"]
pub mod bmi;

/// Typed error kinds for loading, assembly and prediction.
#[path = "../errors.rs"]
pub mod errors;

/// Patient record schema, assembly and export.
#[path = "../record/main.rs"]
pub mod record;

/// Pretrained model, label encoder and vocabularies loaded from disk.
#[path = "../artifacts/main.rs"]
pub mod artifacts;

/// Model invocation and label decoding.
#[path = "../invoker.rs"]
pub mod invoker;

/// Label translation and recommendation tables.
#[path = "../labels.rs"]
pub mod labels;

/// End-to-end submission pipeline.
#[path = "../pipeline.rs"]
pub mod pipeline;

/// TOML configuration loading.
#[path = "../config.rs"]
pub mod config;

/// Structured logging handle.
#[path = "../telemetry.rs"]
pub mod telemetry;

pub use artifacts::{
    label_encoder::LabelEncoder,
    model::{Classifier, ModelArtifact, SoftmaxLinearModel},
    ArtifactPaths, ArtifactStore, CategoryVocabulary,
};
pub use bmi::{calculate_bmi, classify_bmi, BmiCategory};
pub use config::{
    AppConfig, ArtifactSettings, LoggingSettings, ServerSettings, DEFAULT_CONFIG_FILE,
};
pub use errors::{ArtifactLoadError, AssemblyError, PredictionError, PredictorError};
pub use invoker::{Prediction, Predictor};
pub use labels::{recommend, translate, FALLBACK_RECOMMENDATION};
pub use pipeline::{ClassProbability, PredictionPipeline, PredictionReport};
pub use record::{
    assembler::RecordAssembler,
    schema::{FieldKind, FieldSpec, PATIENT_SCHEMA},
    FieldValue, OrderedRecord, RawInputs,
};
pub use telemetry::{PredictorTelemetry, PredictorTelemetryBuilder};
