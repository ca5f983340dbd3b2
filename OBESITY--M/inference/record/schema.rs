/// How a field is collected and validated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// Bounded numeric input.
    Numeric {
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
        /// Input granularity offered by the form.
        step: f64,
        /// Form default.
        default: f64,
        /// Rendered as a number box (`false` renders a slider).
        number_input: bool,
        /// Only whole numbers are accepted.
        integer: bool,
    },
    /// Single choice from a fixed list.
    Choice(&'static [&'static str]),
    /// Single choice from the artifact store's category vocabulary.
    Vocabulary,
}

/// Declaration of one patient field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    /// Column name used by the model.
    pub name: &'static str,
    /// Form label.
    pub label: &'static str,
    /// Collection and validation rules.
    pub kind: FieldKind,
}

const YES_NO: &[&str] = &["yes", "no"];

const fn numeric(
    name: &'static str,
    label: &'static str,
    bounds: (f64, f64, f64, f64),
    number_input: bool,
) -> FieldSpec {
    let (min, max, step, default) = bounds;
    FieldSpec {
        name,
        label,
        kind: FieldKind::Numeric {
            min,
            max,
            step,
            default,
            number_input,
            integer: false,
        },
    }
}

const fn whole_number(
    name: &'static str,
    label: &'static str,
    bounds: (f64, f64, f64),
) -> FieldSpec {
    let (min, max, default) = bounds;
    FieldSpec {
        name,
        label,
        kind: FieldKind::Numeric {
            min,
            max,
            step: 1.0,
            default,
            number_input: true,
            integer: true,
        },
    }
}

const fn choice(
    name: &'static str,
    label: &'static str,
    options: &'static [&'static str],
) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind: FieldKind::Choice(options),
    }
}

/// The sixteen patient fields in form order.
pub static PATIENT_SCHEMA: [FieldSpec; 16] = [
    choice("Gender", "Gênero", &["Male", "Female"]),
    whole_number("Age", "Idade", (14.0, 100.0, 30.0)),
    numeric("Height", "Altura (m)", (1.0, 2.5, 0.01, 1.70), true),
    numeric("Weight", "Peso (kg)", (30.0, 300.0, 0.1, 70.0), true),
    choice("family_history", "Histórico familiar de obesidade", YES_NO),
    choice("FAVC", "Consumo frequente de alimentos calóricos", YES_NO),
    numeric("FCVC", "Frequência de consumo de vegetais (1-3)", (1.0, 3.0, 0.1, 2.0), false),
    numeric("NCP", "Número de refeições principais (1-4)", (1.0, 4.0, 0.1, 3.0), false),
    FieldSpec {
        name: "CAEC",
        label: "Consumo de alimentos entre refeições",
        kind: FieldKind::Vocabulary,
    },
    choice("SMOKE", "Fuma?", YES_NO),
    numeric("CH2O", "Consumo diário de água (L)", (0.5, 3.0, 0.1, 1.5), false),
    choice("SCC", "Monitora calorias consumidas?", YES_NO),
    numeric("FAF", "Frequência de atividade física (0-3)", (0.0, 3.0, 0.1, 1.0), false),
    numeric("TUE", "Tempo usando dispositivos eletrônicos (0-2)", (0.0, 2.0, 0.1, 1.0), false),
    FieldSpec {
        name: "CALC",
        label: "Consumo de álcool",
        kind: FieldKind::Vocabulary,
    },
    choice(
        "MTRANS",
        "Meio de transporte principal",
        &["Automobile", "Bike", "Motorbike", "Public_Transportation", "Walking"],
    ),
];

/// Column names drawing their options from the category vocabulary.
pub fn vocabulary_fields() -> impl Iterator<Item = &'static str> {
    PATIENT_SCHEMA
        .iter()
        .filter(|spec| matches!(spec.kind, FieldKind::Vocabulary))
        .map(|spec| spec.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn schema_names_are_unique() {
        let names: HashSet<_> = PATIENT_SCHEMA.iter().map(|spec| spec.name).collect();
        assert_eq!(names.len(), PATIENT_SCHEMA.len());
    }

    #[test]
    fn defaults_sit_inside_bounds() {
        for spec in &PATIENT_SCHEMA {
            if let FieldKind::Numeric { min, max, default, .. } = spec.kind {
                assert!((min..=max).contains(&default), "{}", spec.name);
            }
        }
    }

    #[test]
    fn vocabulary_fields_are_caec_and_calc() {
        assert_eq!(vocabulary_fields().collect::<Vec<_>>(), vec!["CAEC", "CALC"]);
    }

    #[test]
    fn only_age_is_restricted_to_whole_numbers() {
        let integers: Vec<_> = PATIENT_SCHEMA
            .iter()
            .filter(|spec| matches!(spec.kind, FieldKind::Numeric { integer: true, .. }))
            .map(|spec| spec.name)
            .collect();
        assert_eq!(integers, vec!["Age"]);
    }
}
