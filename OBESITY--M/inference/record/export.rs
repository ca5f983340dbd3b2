use std::{io, path::Path};

use anyhow::{Context, Result};
use csv::Writer;

use crate::record::{FieldValue, OrderedRecord};

/// File name offered for the downloaded record.
pub const EXPORT_FILE_NAME: &str = "dados_paciente.csv";

/// MIME type of the export.
pub const EXPORT_CONTENT_TYPE: &str = "text/csv";

impl OrderedRecord {
    /// Renders a header row and one data row, columns in model order.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = Writer::from_writer(Vec::new());
        self.write_rows(&mut writer)?;
        let bytes = writer.into_inner().map_err(csv::IntoInnerError::into_error)?;
        String::from_utf8(bytes).context("csv export is not valid UTF-8")
    }

    /// Writes the same rows as [`OrderedRecord::to_csv`] to a file.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut writer =
            Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
        self.write_rows(&mut writer)
            .and_then(|()| writer.flush().map_err(csv::Error::from))
            .with_context(|| format!("writing {}", path.display()))
    }

    fn write_rows<W: io::Write>(&self, writer: &mut Writer<W>) -> csv::Result<()> {
        writer.write_record(self.columns())?;
        writer.write_record(self.iter().map(|(_, value)| match value {
            FieldValue::Number(number) => format!("{number:?}"),
            FieldValue::Category(text) => text.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use std::fs;
    use tempfile::tempdir;

    fn record() -> OrderedRecord {
        let mut fields = IndexMap::new();
        fields.insert("Gender".to_string(), FieldValue::Category("Female".into()));
        fields.insert("Age".to_string(), FieldValue::Number(30.0));
        fields.insert("Height".to_string(), FieldValue::Number(1.7));
        fields.insert("MTRANS".to_string(), FieldValue::Category("Bus, \"city\"".into()));
        OrderedRecord::from_fields(fields)
    }

    #[test]
    fn csv_has_header_and_single_row() {
        let csv = record().to_csv().unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Gender,Age,Height,MTRANS");
        assert_eq!(lines[1], "Female,30.0,1.7,\"Bus, \"\"city\"\"\"");
    }

    #[test]
    fn export_reads_back_with_csv_reader() {
        let exported = record().to_csv().unwrap();
        let mut reader = csv::Reader::from_reader(exported.as_bytes());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), 4);
        let rows: Vec<_> = reader.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][3], "Bus, \"city\"");
    }

    #[test]
    fn writes_export_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(EXPORT_FILE_NAME);
        record().write_csv(&path).unwrap();
        let written = fs::read_to_string(path).unwrap();
        assert_eq!(written, record().to_csv().unwrap());
        assert!(written.starts_with("Gender,"));
    }
}
