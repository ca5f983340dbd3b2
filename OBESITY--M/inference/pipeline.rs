use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use shared_logging::LogLevel;
use uuid::Uuid;

use crate::{
    artifacts::ArtifactStore,
    bmi::{calculate_bmi, classify_bmi, BmiCategory},
    errors::{AssemblyError, PredictorError},
    invoker::{Prediction, Predictor},
    labels::{recommend, translate},
    record::{assembler::RecordAssembler, OrderedRecord, RawInputs},
    telemetry::PredictorTelemetry,
};

/// One bar of the probability chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassProbability {
    /// Model label.
    pub label: String,
    /// Portuguese label.
    pub translated_label: String,
    /// Raw probability in [0, 1].
    pub probability: f64,
    /// Percentage rounded to one decimal.
    pub percent: f64,
}

/// Everything shown to the user after a successful submission.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionReport {
    /// Submission identifier used in logs.
    pub id: Uuid,
    /// Computed body-mass-index.
    pub bmi: f64,
    /// BMI bucket.
    pub bmi_category: BmiCategory,
    /// Predicted model label.
    pub label: String,
    /// Portuguese label.
    pub translated_label: String,
    /// Probability of the predicted class, in percent.
    pub confidence_percent: f64,
    /// Per-class probabilities, highest first.
    pub probabilities: Vec<ClassProbability>,
    /// Static advice for the translated label.
    pub recommendation: String,
    /// The record handed to the model, in model column order.
    pub record: OrderedRecord,
}

impl PredictionReport {
    /// CSV export of the assembled record.
    pub fn csv(&self) -> anyhow::Result<String> {
        self.record.to_csv()
    }

    /// Console summary line.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "[predictor] bmi={:.2} ({}) label={} confidence={:.1}%",
            self.bmi, self.bmi_category, self.translated_label, self.confidence_percent
        )
    }
}

/// Stateless submission pipeline over a shared artifact store.
#[derive(Debug, Clone)]
pub struct PredictionPipeline {
    store: Arc<ArtifactStore>,
    telemetry: PredictorTelemetry,
}

impl PredictionPipeline {
    /// Creates a pipeline without telemetry.
    #[must_use]
    pub fn new(store: Arc<ArtifactStore>) -> Self {
        Self {
            store,
            telemetry: PredictorTelemetry::disabled("inference"),
        }
    }

    /// Attaches a telemetry handle.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: PredictorTelemetry) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// The shared artifact store.
    #[must_use]
    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Assembles a submission without invoking the model.
    pub fn assemble(&self, raw: &RawInputs) -> Result<OrderedRecord, AssemblyError> {
        RecordAssembler::for_store(&self.store).assemble(raw)
    }

    /// Runs BMI computation, assembly, prediction and label lookups.
    pub fn run(&self, raw: &RawInputs) -> Result<PredictionReport, PredictorError> {
        let id = Uuid::new_v4();
        let _ = self.telemetry.log(
            LogLevel::Debug,
            "prediction.start",
            json!({ "prediction_id": id }),
        );
        match self.execute(id, raw) {
            Ok(report) => {
                let _ = self.telemetry.log(
                    LogLevel::Info,
                    "prediction.completed",
                    json!({
                        "prediction_id": id,
                        "bmi": report.bmi,
                        "bmi_category": report.bmi_category.label(),
                        "label": report.label,
                        "confidence_percent": report.confidence_percent,
                    }),
                );
                Ok(report)
            }
            Err(err) => {
                let _ = self.telemetry.log(
                    LogLevel::Warn,
                    "prediction.failed",
                    json!({ "prediction_id": id, "kind": err.kind(), "error": err.to_string() }),
                );
                Err(err)
            }
        }
    }

    fn execute(&self, id: Uuid, raw: &RawInputs) -> Result<PredictionReport, PredictorError> {
        let record = self.assemble(raw)?;
        let (weight, height) = match (record.number("Weight"), record.number("Height")) {
            (Some(weight), Some(height)) => (weight, height),
            _ => return Err(AssemblyError::MissingField("Weight/Height".into()).into()),
        };
        let bmi = calculate_bmi(weight, height);
        let bmi_category = classify_bmi(bmi);

        let prediction = Predictor::new(&self.store).predict(&record)?;
        let translated_label = translate(&prediction.label).to_string();
        let recommendation = recommend(&translated_label).to_string();
        let probabilities = self.chart(&prediction);

        Ok(PredictionReport {
            id,
            bmi,
            bmi_category,
            confidence_percent: prediction.confidence() * 100.0,
            label: prediction.label,
            translated_label,
            probabilities,
            recommendation,
            record,
        })
    }

    fn chart(&self, prediction: &Prediction) -> Vec<ClassProbability> {
        let mut bars: Vec<ClassProbability> = self
            .store
            .label_encoder()
            .classes()
            .iter()
            .zip(&prediction.probabilities)
            .map(|(label, &probability)| ClassProbability {
                label: label.clone(),
                translated_label: translate(label).to_string(),
                probability,
                percent: (probability * 1000.0).round() / 10.0,
            })
            .collect();
        bars.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        bars
    }
}
