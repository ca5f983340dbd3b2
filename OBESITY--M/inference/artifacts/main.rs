//! Read-only artifact store.
//!
//! Holds the pretrained model, its label encoder, the column order the model
//! was trained with and the vocabularies of the categorical fields. Loaded
//! once at start-up and shared behind an `Arc`; nothing mutates it afterwards.

/// Class index to label mapping.
pub mod label_encoder;
/// Classifier trait and model documents.
pub mod model;

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    errors::ArtifactLoadError,
    record::schema::{vocabulary_fields, PATIENT_SCHEMA},
};
use label_encoder::LabelEncoder;
use model::{Classifier, ModelArtifact};

/// Default file name of the model document.
pub const MODEL_FILE: &str = "modelo_obesidade.json";
/// Default file name of the label encoder.
pub const LABEL_ENCODER_FILE: &str = "label_encoder.json";
/// Default file name of the expected column order.
pub const EXPECTED_COLUMNS_FILE: &str = "expected_columns.json";
/// Default file name of the category vocabularies.
pub const CATEGORIES_FILE: &str = "categories.json";

/// Legal values of each vocabulary-backed categorical field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryVocabulary(IndexMap<String, Vec<String>>);

impl CategoryVocabulary {
    /// Builds a vocabulary from `(field, values)` pairs.
    #[must_use]
    pub fn from_pairs<F, V, S>(pairs: impl IntoIterator<Item = (F, V)>) -> Self
    where
        F: Into<String>,
        V: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(field, values)| (field.into(), values.into_iter().map(Into::into).collect()))
                .collect(),
        )
    }

    /// Ordered legal values of a field.
    #[must_use]
    pub fn values(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Whether `value` is legal for `field`.
    #[must_use]
    pub fn contains(&self, field: &str, value: &str) -> bool {
        self.values(field)
            .is_some_and(|values| values.iter().any(|candidate| candidate == value))
    }
}

/// Locations of the four artifact files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// Model document.
    pub model: PathBuf,
    /// Label encoder.
    pub label_encoder: PathBuf,
    /// Expected column order.
    pub expected_columns: PathBuf,
    /// Category vocabularies.
    pub categories: PathBuf,
}

impl ArtifactPaths {
    /// Default file names inside `dir`.
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            model: dir.join(MODEL_FILE),
            label_encoder: dir.join(LABEL_ENCODER_FILE),
            expected_columns: dir.join(EXPECTED_COLUMNS_FILE),
            categories: dir.join(CATEGORIES_FILE),
        }
    }
}

/// Loaded, validated artifacts.
#[derive(Debug)]
pub struct ArtifactStore {
    model: ModelArtifact,
    label_encoder: LabelEncoder,
    expected_columns: Vec<String>,
    vocabulary: CategoryVocabulary,
}

impl ArtifactStore {
    /// Loads and validates all four artifacts.
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ArtifactLoadError> {
        let model: ModelArtifact = read_json(&paths.model)?;
        let label_encoder: LabelEncoder = read_json(&paths.label_encoder)?;
        let expected_columns: Vec<String> = read_json(&paths.expected_columns)?;
        let vocabulary: CategoryVocabulary = read_json(&paths.categories)?;
        Self::from_parts(model, label_encoder, expected_columns, vocabulary)
    }

    /// Loads the default file names from a directory.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, ArtifactLoadError> {
        Self::load(&ArtifactPaths::in_dir(dir))
    }

    /// Assembles a store from in-memory parts, applying the same checks as
    /// [`ArtifactStore::load`].
    pub fn from_parts(
        model: ModelArtifact,
        label_encoder: LabelEncoder,
        expected_columns: Vec<String>,
        vocabulary: CategoryVocabulary,
    ) -> Result<Self, ArtifactLoadError> {
        label_encoder
            .validate()
            .map_err(|reason| invalid("label_encoder", reason))?;
        validate_columns(&expected_columns)?;
        validate_vocabulary(&vocabulary)?;
        if model.n_classes() != label_encoder.len() {
            return Err(invalid(
                "model",
                format!(
                    "model scores {} classes, label encoder knows {}",
                    model.n_classes(),
                    label_encoder.len()
                ),
            ));
        }
        if let Some(column) = model
            .input_columns()
            .into_iter()
            .find(|column| !expected_columns.iter().any(|expected| expected == *column))
        {
            return Err(invalid(
                "model",
                format!("model reads unknown column {column:?}"),
            ));
        }
        Ok(Self {
            model,
            label_encoder,
            expected_columns,
            vocabulary,
        })
    }

    /// The classifier.
    #[must_use]
    pub fn model(&self) -> &dyn Classifier {
        &self.model
    }

    /// The label encoder.
    #[must_use]
    pub const fn label_encoder(&self) -> &LabelEncoder {
        &self.label_encoder
    }

    /// Column order expected by the model.
    #[must_use]
    pub fn expected_columns(&self) -> &[String] {
        &self.expected_columns
    }

    /// Categorical vocabularies.
    #[must_use]
    pub const fn vocabulary(&self) -> &CategoryVocabulary {
        &self.vocabulary
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| ArtifactLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ArtifactLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn invalid(artifact: &'static str, reason: impl Into<String>) -> ArtifactLoadError {
    ArtifactLoadError::Invalid {
        artifact,
        reason: reason.into(),
    }
}

fn validate_columns(columns: &[String]) -> Result<(), ArtifactLoadError> {
    let mut seen = HashSet::new();
    if let Some(duplicate) = columns.iter().find(|column| !seen.insert(column.as_str())) {
        return Err(invalid(
            "expected_columns",
            format!("duplicate column {duplicate:?}"),
        ));
    }
    if let Some(spec) = PATIENT_SCHEMA.iter().find(|spec| !seen.contains(spec.name)) {
        return Err(invalid(
            "expected_columns",
            format!("missing column {:?}", spec.name),
        ));
    }
    if let Some(extra) = columns
        .iter()
        .find(|column| !PATIENT_SCHEMA.iter().any(|spec| spec.name == column.as_str()))
    {
        return Err(invalid(
            "expected_columns",
            format!("unknown column {extra:?}"),
        ));
    }
    Ok(())
}

fn validate_vocabulary(vocabulary: &CategoryVocabulary) -> Result<(), ArtifactLoadError> {
    for field in vocabulary_fields() {
        match vocabulary.values(field) {
            Some(values) if !values.is_empty() => {}
            _ => {
                return Err(invalid(
                    "categories",
                    format!("no legal values for {field}"),
                ))
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn dataset_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("dataset")
    }

    #[test]
    fn loads_bundled_artifacts() {
        let store = ArtifactStore::load_dir(dataset_dir()).unwrap();
        assert_eq!(store.expected_columns().len(), 16);
        assert_eq!(store.label_encoder().len(), 6);
        assert_eq!(store.model().n_classes(), 6);
        assert!(store.vocabulary().contains("CAEC", "Sometimes"));
        assert!(store.vocabulary().contains("CALC", "no"));
        assert!(!store.vocabulary().contains("CALC", "daily"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let err = ArtifactStore::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, ArtifactLoadError::Io { .. }));
    }

    #[test]
    fn corrupt_file_is_a_parse_error() {
        let dir = tempdir().unwrap();
        for file in [MODEL_FILE, LABEL_ENCODER_FILE, EXPECTED_COLUMNS_FILE, CATEGORIES_FILE] {
            fs::copy(dataset_dir().join(file), dir.path().join(file)).unwrap();
        }
        fs::write(dir.path().join(EXPECTED_COLUMNS_FILE), "[\"Gender\",").unwrap();
        let err = ArtifactStore::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, ArtifactLoadError::Parse { .. }));
    }

    #[test]
    fn column_set_must_match_schema() {
        let base = ArtifactStore::load_dir(dataset_dir()).unwrap();
        let mut columns = base.expected_columns().to_vec();
        columns.pop();
        let vocabulary = base.vocabulary().clone();
        let encoder = base.label_encoder().clone();
        let model: ModelArtifact = read_json(&dataset_dir().join(MODEL_FILE)).unwrap();

        let err = ArtifactStore::from_parts(
            model.clone(),
            encoder.clone(),
            columns.clone(),
            vocabulary.clone(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("missing column"));

        columns.push("MTRANS".into());
        columns.push("BMI".into());
        let err =
            ArtifactStore::from_parts(model.clone(), encoder.clone(), columns, vocabulary.clone())
                .unwrap_err();
        assert!(err.to_string().contains("unknown column"));

        let mut doubled = base.expected_columns().to_vec();
        doubled.push("Age".into());
        let err = ArtifactStore::from_parts(model, encoder, doubled, vocabulary).unwrap_err();
        assert!(err.to_string().contains("duplicate column"));
    }

    #[test]
    fn class_count_and_vocabulary_are_checked() {
        let base = ArtifactStore::load_dir(dataset_dir()).unwrap();
        let model: ModelArtifact =
            read_json(&dataset_dir().join(MODEL_FILE)).unwrap();
        let short_encoder = LabelEncoder::new(["a", "b"]);
        let err = ArtifactStore::from_parts(
            model.clone(),
            short_encoder,
            base.expected_columns().to_vec(),
            base.vocabulary().clone(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("label encoder knows 2"));

        let no_calc = CategoryVocabulary::from_pairs([("CAEC", vec!["no"])]);
        let err = ArtifactStore::from_parts(
            model,
            base.label_encoder().clone(),
            base.expected_columns().to_vec(),
            no_calc,
        )
        .unwrap_err();
        assert!(err.to_string().contains("CALC"));
    }
}
