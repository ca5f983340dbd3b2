use indexmap::IndexMap;

use crate::{
    artifacts::{ArtifactStore, CategoryVocabulary},
    errors::AssemblyError,
    record::{
        schema::{FieldKind, FieldSpec, PATIENT_SCHEMA},
        FieldValue, OrderedRecord, RawInputs,
    },
};

/// Builds model-ready records from raw form submissions.
///
/// Every categorical value is checked against its fixed option list or the
/// category vocabulary before the model sees it; numeric values must parse
/// and sit inside the form bounds.
#[derive(Debug, Clone, Copy)]
pub struct RecordAssembler<'a> {
    columns: &'a [String],
    vocabulary: &'a CategoryVocabulary,
}

impl<'a> RecordAssembler<'a> {
    /// Creates an assembler for an explicit column order and vocabulary.
    #[must_use]
    pub const fn new(columns: &'a [String], vocabulary: &'a CategoryVocabulary) -> Self {
        Self {
            columns,
            vocabulary,
        }
    }

    /// Creates an assembler bound to a loaded artifact store.
    #[must_use]
    pub fn for_store(store: &'a ArtifactStore) -> Self {
        Self::new(store.expected_columns(), store.vocabulary())
    }

    /// Validates and coerces every field, then reorders to the expected
    /// column order. Keys outside the schema are ignored.
    pub fn assemble(&self, raw: &RawInputs) -> Result<OrderedRecord, AssemblyError> {
        let mut parsed = IndexMap::with_capacity(PATIENT_SCHEMA.len());
        for spec in &PATIENT_SCHEMA {
            let text = raw
                .get(spec.name)
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .ok_or_else(|| AssemblyError::MissingField(spec.name.to_string()))?;
            parsed.insert(spec.name, self.coerce(spec, text)?);
        }

        let mut ordered = IndexMap::with_capacity(self.columns.len());
        for column in self.columns {
            let value = parsed
                .shift_remove(column.as_str())
                .ok_or_else(|| AssemblyError::UnknownColumn(column.clone()))?;
            ordered.insert(column.clone(), value);
        }
        if let Some((name, _)) = parsed.first() {
            return Err(AssemblyError::UnmappedField((*name).to_string()));
        }
        Ok(OrderedRecord::from_fields(ordered))
    }

    fn coerce(&self, spec: &FieldSpec, text: &str) -> Result<FieldValue, AssemblyError> {
        match spec.kind {
            FieldKind::Numeric {
                min, max, integer, ..
            } => {
                let invalid = || AssemblyError::InvalidNumber {
                    field: spec.name.to_string(),
                    value: text.to_string(),
                };
                let value: f64 = text.parse().map_err(|_| invalid())?;
                if integer && value.fract().abs() > 0.0 {
                    return Err(invalid());
                }
                if !(min..=max).contains(&value) {
                    return Err(AssemblyError::OutOfRange {
                        field: spec.name.to_string(),
                        value,
                        min,
                        max,
                    });
                }
                Ok(FieldValue::Number(value))
            }
            FieldKind::Choice(options) => {
                if options.contains(&text) {
                    Ok(FieldValue::Category(text.to_string()))
                } else {
                    Err(out_of_vocabulary(
                        spec.name,
                        text,
                        options.iter().map(ToString::to_string).collect(),
                    ))
                }
            }
            FieldKind::Vocabulary => {
                let allowed = self.vocabulary.values(spec.name).unwrap_or_default();
                if allowed.iter().any(|value| value == text) {
                    Ok(FieldValue::Category(text.to_string()))
                } else {
                    Err(out_of_vocabulary(spec.name, text, allowed.to_vec()))
                }
            }
        }
    }
}

fn out_of_vocabulary(field: &str, value: &str, allowed: Vec<String>) -> AssemblyError {
    AssemblyError::OutOfVocabulary {
        field: field.to_string(),
        value: value.to_string(),
        allowed,
    }
}

/// Form-default submission, handy for tests and the command line.
#[must_use]
pub fn default_inputs(vocabulary: &CategoryVocabulary) -> RawInputs {
    PATIENT_SCHEMA
        .iter()
        .filter_map(|spec| {
            let value = match spec.kind {
                FieldKind::Numeric { default, .. } => default.to_string(),
                FieldKind::Choice(options) => (*options.first()?).to_string(),
                FieldKind::Vocabulary => vocabulary.values(spec.name)?.first()?.clone(),
            };
            Some((spec.name, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<String> {
        // Model order differs from form order.
        [
            "Age", "Gender", "Height", "Weight", "CALC", "FAVC", "FCVC", "NCP", "SCC", "SMOKE",
            "CH2O", "family_history", "FAF", "TUE", "CAEC", "MTRANS",
        ]
        .iter()
        .map(ToString::to_string)
        .collect()
    }

    fn vocabulary() -> CategoryVocabulary {
        CategoryVocabulary::from_pairs([
            ("CAEC", vec!["Sometimes", "Frequently", "Always", "no"]),
            ("CALC", vec!["no", "Sometimes", "Frequently"]),
        ])
    }

    #[test]
    fn assembles_in_expected_order_and_preserves_values() {
        let columns = columns();
        let vocabulary = vocabulary();
        let assembler = RecordAssembler::new(&columns, &vocabulary);
        let raw = default_inputs(&vocabulary)
            .with("Age", "45")
            .with("Weight", " 82.5 ")
            .with("CALC", "Frequently")
            .with("submit", "Prever");
        let record = assembler.assemble(&raw).unwrap();

        assert_eq!(record.len(), 16);
        let expected: Vec<&str> = columns.iter().map(String::as_str).collect();
        assert_eq!(record.columns().collect::<Vec<_>>(), expected);
        assert_eq!(record.number("Age"), Some(45.0));
        assert_eq!(record.number("Weight"), Some(82.5));
        assert_eq!(record.number("Height"), Some(1.7));
        assert_eq!(record.category("Gender"), Some("Male"));
        assert_eq!(record.category("CAEC"), Some("Sometimes"));
        assert_eq!(record.category("CALC"), Some("Frequently"));
        assert_eq!(record.category("Age"), None);
        assert!(record.get("submit").is_none());
    }

    #[test]
    fn missing_and_blank_fields_are_rejected() {
        let columns = columns();
        let vocabulary = vocabulary();
        let assembler = RecordAssembler::new(&columns, &vocabulary);
        let mut raw = default_inputs(&vocabulary);
        raw.remove("SMOKE");
        assert_eq!(
            assembler.assemble(&raw),
            Err(AssemblyError::MissingField("SMOKE".into()))
        );
        let raw = default_inputs(&vocabulary).with("TUE", "   ");
        assert_eq!(
            assembler.assemble(&raw),
            Err(AssemblyError::MissingField("TUE".into()))
        );
    }

    #[test]
    fn numeric_fields_must_parse_and_fit_bounds() {
        let columns = columns();
        let vocabulary = vocabulary();
        let assembler = RecordAssembler::new(&columns, &vocabulary);
        let raw = default_inputs(&vocabulary).with("Height", "tall");
        assert!(matches!(
            assembler.assemble(&raw),
            Err(AssemblyError::InvalidNumber { field, .. }) if field == "Height"
        ));
        let raw = default_inputs(&vocabulary).with("Height", "0");
        assert!(matches!(
            assembler.assemble(&raw),
            Err(AssemblyError::OutOfRange { field, .. }) if field == "Height"
        ));
        let raw = default_inputs(&vocabulary).with("Weight", "NaN");
        assert!(matches!(
            assembler.assemble(&raw),
            Err(AssemblyError::OutOfRange { field, .. }) if field == "Weight"
        ));
    }

    #[test]
    fn age_must_be_a_whole_number() {
        let columns = columns();
        let vocabulary = vocabulary();
        let assembler = RecordAssembler::new(&columns, &vocabulary);
        let raw = default_inputs(&vocabulary).with("Age", "30.5");
        assert_eq!(
            assembler.assemble(&raw),
            Err(AssemblyError::InvalidNumber {
                field: "Age".into(),
                value: "30.5".into(),
            })
        );
        let raw = default_inputs(&vocabulary).with("Age", "31.0");
        assert_eq!(assembler.assemble(&raw).unwrap().number("Age"), Some(31.0));
        let raw = default_inputs(&vocabulary).with("Weight", "70.25");
        assert_eq!(assembler.assemble(&raw).unwrap().number("Weight"), Some(70.25));
    }

    #[test]
    fn out_of_vocabulary_values_are_rejected() {
        let columns = columns();
        let vocabulary = vocabulary();
        let assembler = RecordAssembler::new(&columns, &vocabulary);
        let raw = default_inputs(&vocabulary).with("CALC", "Always");
        match assembler.assemble(&raw) {
            Err(AssemblyError::OutOfVocabulary { field, value, allowed }) => {
                assert_eq!(field, "CALC");
                assert_eq!(value, "Always");
                assert_eq!(allowed, vec!["no", "Sometimes", "Frequently"]);
            }
            other => panic!("unexpected {other:?}"),
        }
        let raw = default_inputs(&vocabulary).with("MTRANS", "Teleport");
        assert!(matches!(
            assembler.assemble(&raw),
            Err(AssemblyError::OutOfVocabulary { field, .. }) if field == "MTRANS"
        ));
    }

    #[test]
    fn schema_field_missing_from_columns_is_reported() {
        let mut columns = columns();
        columns.retain(|column| column != "TUE");
        let vocabulary = vocabulary();
        let assembler = RecordAssembler::new(&columns, &vocabulary);
        assert_eq!(
            assembler.assemble(&default_inputs(&vocabulary)),
            Err(AssemblyError::UnmappedField("TUE".into()))
        );
    }

    #[test]
    fn column_outside_schema_is_reported() {
        let mut columns = columns();
        columns.push("BMI".into());
        let vocabulary = vocabulary();
        let assembler = RecordAssembler::new(&columns, &vocabulary);
        assert_eq!(
            assembler.assemble(&default_inputs(&vocabulary)),
            Err(AssemblyError::UnknownColumn("BMI".into()))
        );
    }
}
