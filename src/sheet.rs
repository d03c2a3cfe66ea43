use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::diagnostics::DiagnosticSink;
use crate::domain::{DEFAULT_PRIORITY, ExtraParams, SampleMetadata};
use crate::error::HubError;

pub const REQUIRED_COLUMNS: &[&str] = &["sample_id"];

pub const TEMPLATE_COLUMNS: &[&str] = &[
    "sample_id",
    "short_label",
    "long_label",
    "color",
    "visibility",
    "priority",
    "additional_params",
];

/// Sample metadata keyed by exact sample id.
#[derive(Debug, Clone, Default)]
pub struct SampleSheet {
    samples: HashMap<String, SampleMetadata>,
}

impl SampleSheet {
    pub fn load(path: &Path, sink: &dyn DiagnosticSink) -> Result<Self, HubError> {
        let file = File::open(path).map_err(|_| HubError::SheetRead(path.to_path_buf()))?;
        let sheet = Self::from_reader(file, sink)?;
        sink.info(format!(
            "Loaded metadata for {} samples from {}",
            sheet.len(),
            path.display()
        ));
        Ok(sheet)
    }

    pub fn from_reader<R: Read>(reader: R, sink: &dyn DiagnosticSink) -> Result<Self, HubError> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()
            .map_err(|err| HubError::SheetParse(err.to_string()))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|required| !headers.iter().any(|h| h == *required))
            .map(|required| required.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(HubError::MissingColumns(missing));
        }

        let columns = Columns::new(&headers);
        let mut samples = HashMap::new();
        for record in csv_reader.records() {
            let record = record.map_err(|err| HubError::SheetParse(err.to_string()))?;
            let Some(sample_id) = columns.cell(&record, "sample_id") else {
                continue;
            };
            let metadata = columns.build(sample_id, &record, sink);
            samples.insert(metadata.sample_id.clone(), metadata);
        }

        Ok(Self { samples })
    }

    pub fn get(&self, sample_id: &str) -> Option<&SampleMetadata> {
        self.samples.get(sample_id)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl FromIterator<SampleMetadata> for SampleSheet {
    fn from_iter<T: IntoIterator<Item = SampleMetadata>>(iter: T) -> Self {
        Self {
            samples: iter
                .into_iter()
                .map(|meta| (meta.sample_id.clone(), meta))
                .collect(),
        }
    }
}

struct Columns<'a> {
    headers: &'a [String],
}

impl<'a> Columns<'a> {
    fn new(headers: &'a [String]) -> Self {
        Self { headers }
    }

    /// Non-blank value of a named column.
    fn cell<'r>(&self, record: &'r StringRecord, column: &str) -> Option<&'r str> {
        let idx = self.headers.iter().position(|h| h == column)?;
        record.get(idx).filter(|value| !value.is_empty())
    }

    fn build(
        &self,
        sample_id: &str,
        record: &StringRecord,
        sink: &dyn DiagnosticSink,
    ) -> SampleMetadata {
        let text = |column: &str| self.cell(record, column).map(str::to_string);

        let additional_params = match self.cell(record, "additional_params") {
            Some(raw) => parse_params(raw).unwrap_or_else(|reason| {
                sink.warn(format!(
                    "Could not parse additional_params for {sample_id}: {raw} ({reason})"
                ));
                ExtraParams::new()
            }),
            None => ExtraParams::new(),
        };

        SampleMetadata {
            sample_id: sample_id.to_string(),
            short_label: text("short_label").unwrap_or_else(|| sample_id.to_string()),
            long_label: text("long_label").unwrap_or_else(|| sample_id.to_string()),
            color: text("color").unwrap_or_default(),
            visibility: text("visibility").unwrap_or_default(),
            priority: text("priority").unwrap_or_else(|| DEFAULT_PRIORITY.to_string()),
            additional_params,
        }
    }
}

fn parse_params(raw: &str) -> Result<ExtraParams, String> {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(_) => Err("expected a JSON object".to_string()),
        Err(err) => Err(err.to_string()),
    }
}

/// Writes a sample sheet with the full header and two example rows.
pub fn write_template(path: &Path) -> Result<(), HubError> {
    let mut writer =
        csv::Writer::from_path(path).map_err(|err| HubError::Filesystem(err.to_string()))?;
    writer
        .write_record(TEMPLATE_COLUMNS)
        .map_err(|err| HubError::Filesystem(err.to_string()))?;
    let rows = [
        [
            "Sample1",
            "Sample 1",
            "Sample 1 - Wild Type",
            "0,0,100",
            "full",
            "1",
            r#"{"autoScale":"on","alwaysZero":"on"}"#,
        ],
        [
            "Sample2",
            "Sample 2",
            "Sample 2 - Treatment",
            "100,0,0",
            "full",
            "2",
            r#"{"autoScale":"on","alwaysZero":"on"}"#,
        ],
    ];
    for row in rows {
        writer
            .write_record(row)
            .map_err(|err| HubError::Filesystem(err.to_string()))?;
    }
    writer
        .flush()
        .map_err(|err| HubError::Filesystem(err.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::diagnostics::MemorySink;

    fn parse(text: &str) -> (Result<SampleSheet, HubError>, MemorySink) {
        let sink = MemorySink::new();
        let result = SampleSheet::from_reader(text.as_bytes(), &sink);
        (result, sink)
    }

    #[test]
    fn later_duplicate_rows_win() {
        let (sheet, sink) = parse("sample_id,short_label\nS1,first\nS1,second\n");
        let sheet = sheet.unwrap();
        assert_eq!(sheet.len(), 1);
        assert_eq!(sheet.get("S1").unwrap().short_label, "second");
        assert!(sink.warnings().is_empty());
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let (result, _) = parse("id,short_label\nS1,x\n");
        assert_matches!(result, Err(HubError::MissingColumns(cols)) if cols == vec!["sample_id".to_string()]);
    }

    #[test]
    fn blank_sample_rows_are_skipped() {
        let (sheet, _) = parse("sample_id,color\n  ,1,2,3\nS2,\"255,0,0\"\n");
        let sheet = sheet.unwrap();
        assert_eq!(sheet.len(), 1);
        assert_eq!(sheet.get("S2").unwrap().color, "255,0,0");
    }

    #[test]
    fn malformed_params_degrade_to_empty() {
        let (sheet, sink) = parse("sample_id,additional_params\nS1,{not json\nS2,\"[1,2]\"\n");
        let sheet = sheet.unwrap();
        assert!(sheet.get("S1").unwrap().additional_params.is_empty());
        assert!(sheet.get("S2").unwrap().additional_params.is_empty());
        assert_eq!(sink.warnings().len(), 2);
        assert!(sink.warnings()[0].contains("S1"));
    }

    #[test]
    fn params_parse_as_object() {
        let (sheet, _) = parse(
            "sample_id,additional_params\nS1,\"{\"\"autoScale\"\":\"\"off\"\",\"\"maxHeightPixels\"\":\"\"100:50:8\"\"}\"\n",
        );
        let sheet = sheet.unwrap();
        let params = &sheet.get("S1").unwrap().additional_params;
        assert_eq!(params["autoScale"], "off");
        assert_eq!(params["maxHeightPixels"], "100:50:8");
    }

    #[test]
    fn optional_columns_default() {
        let (sheet, _) = parse("sample_id,short_label,priority\nS1,,\n");
        let meta = sheet.unwrap().get("S1").cloned().unwrap();
        assert_eq!(meta.short_label, "S1");
        assert_eq!(meta.long_label, "S1");
        assert_eq!(meta.priority, "1");
        assert!(meta.visibility.is_empty());
    }

    #[test]
    fn template_loads_back() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("samples.csv");
        write_template(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(
            "sample_id,short_label,long_label,color,visibility,priority,additional_params"
        ));

        let sheet = SampleSheet::load(&path, &MemorySink::new()).unwrap();
        assert_eq!(sheet.len(), 2);
        let treatment = sheet.get("Sample2").unwrap();
        assert_eq!(treatment.long_label, "Sample 2 - Treatment");
        assert_eq!(treatment.additional_params["alwaysZero"], "on");
    }

    #[test]
    fn unreadable_file_is_fatal() {
        let result = SampleSheet::load(Path::new("/definitely/not/here.csv"), &MemorySink::new());
        assert_matches!(result, Err(HubError::SheetRead(_)));
    }
}
