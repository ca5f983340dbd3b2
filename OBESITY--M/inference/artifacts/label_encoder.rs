use serde::{Deserialize, Serialize};

/// Bidirectional mapping between class indices and label names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Creates an encoder; index `i` decodes to `classes[i]`.
    #[must_use]
    pub fn new<S: Into<String>>(classes: impl IntoIterator<Item = S>) -> Self {
        Self {
            classes: classes.into_iter().map(Into::into).collect(),
        }
    }

    /// Known labels in index order.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Number of classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// True when no class is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Decodes a class index.
    #[must_use]
    pub fn inverse_transform(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(String::as_str)
    }

    /// Encodes a label back to its index.
    #[must_use]
    pub fn transform(&self, label: &str) -> Option<usize> {
        self.classes.iter().position(|class| class == label)
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.classes.is_empty() {
            return Err("no classes".into());
        }
        for (idx, class) in self.classes.iter().enumerate() {
            if self.classes[..idx].contains(class) {
                return Err(format!("duplicate class {class:?}"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_and_encodes() {
        let encoder = LabelEncoder::new(["Normal_Weight", "Obesity_Type_I"]);
        assert_eq!(encoder.inverse_transform(1), Some("Obesity_Type_I"));
        assert_eq!(encoder.inverse_transform(2), None);
        assert_eq!(encoder.transform("Normal_Weight"), Some(0));
        assert!(encoder.validate().is_ok());
    }

    #[test]
    fn rejects_duplicates_and_empty() {
        assert!(LabelEncoder::new(["a", "b", "a"]).validate().is_err());
        assert!(LabelEncoder::new(Vec::<String>::new()).validate().is_err());
    }
}
