//! Export of retained record history.
//!
//! Each record becomes one line in arrival order. [`ExportFormat::JsonLines`]
//! keeps the flat wire shape; [`ExportFormat::Csv`] writes one column per
//! field, with extra fields appended in the order they were first seen.

use std::{
    borrow::Cow,
    collections::HashSet,
    ffi::OsStr,
    io::{self, Write},
    path::Path,
};

use serde_json::Value;
use thiserror::Error;

use crate::record::Record;

/// Layout of an exported history.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    /// One JSON object per line.
    #[default]
    JsonLines,
    /// Comma-separated values with a header row.
    Csv,
}

impl ExportFormat {
    /// Choose a format from the destination's extension; `.csv` selects
    /// [`ExportFormat::Csv`], anything else JSON Lines.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(OsStr::to_str) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Csv,
            _ => Self::JsonLines,
        }
    }
}

/// Errors raised while exporting history.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Writing to the destination failed.
    #[error("failed to write export: {0}")]
    Io(#[from] io::Error),

    /// A record could not be serialized.
    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Write `records` to `writer`, one JSON object per line.
///
/// Returns the number of records written.
///
/// # Errors
///
/// Returns [`ExportError`] if serialization or the underlying write fails.
pub fn write_json_lines<'a, W, I>(mut writer: W, records: I) -> Result<usize, ExportError>
where
    W: Write,
    I: IntoIterator<Item = &'a Record>,
{
    let mut written = 0;
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}

/// Render `records` as an in-memory JSON Lines document.
///
/// # Errors
///
/// Returns [`ExportError::Serialize`] if a record cannot be serialized.
pub fn to_json_lines<'a, I>(records: I) -> Result<Vec<u8>, ExportError>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut buffer = Vec::new();
    write_json_lines(&mut buffer, records)?;
    Ok(buffer)
}

/// Write `records` to `writer` as CSV.
///
/// The header is `id,outcomeCode,totalRecords` followed by every extra field
/// present in any record. Missing values are left empty. Returns the number
/// of records written, excluding the header.
///
/// # Errors
///
/// Returns [`ExportError::Io`] if the underlying write fails.
pub fn write_csv<'a, W, I>(mut writer: W, records: I) -> Result<usize, ExportError>
where
    W: Write,
    I: IntoIterator<Item = &'a Record>,
{
    let records: Vec<&Record> = records.into_iter().collect();
    let mut seen = HashSet::new();
    let extra_columns: Vec<&str> = records
        .iter()
        .flat_map(|record| record.extra().keys())
        .map(String::as_str)
        .filter(|key| seen.insert(*key))
        .collect();

    let header = ["id", "outcomeCode", "totalRecords"]
        .into_iter()
        .chain(extra_columns.iter().copied())
        .map(csv_field)
        .collect::<Vec<_>>()
        .join(",");
    writeln!(writer, "{header}")?;

    for record in &records {
        let mut row = vec![
            csv_field(&record.id().to_string()).into_owned(),
            record.outcome_code().to_string(),
            record.total_records().map(|total| total.to_string()).unwrap_or_default(),
        ];
        row.extend(extra_columns.iter().map(|key| match record.extra().get(*key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(text)) => csv_field(text).into_owned(),
            Some(other) => csv_field(&other.to_string()).into_owned(),
        }));
        writeln!(writer, "{}", row.join(","))?;
    }
    writer.flush()?;
    Ok(records.len())
}

/// Render `records` in `format` as an in-memory document.
///
/// # Errors
///
/// Returns [`ExportError::Serialize`] if a record cannot be serialized.
pub fn render<'a, I>(format: ExportFormat, records: I) -> Result<Vec<u8>, ExportError>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut buffer = Vec::new();
    match format {
        ExportFormat::JsonLines => write_json_lines(&mut buffer, records)?,
        ExportFormat::Csv => write_csv(&mut buffer, records)?,
    };
    Ok(buffer)
}

fn csv_field(text: &str) -> Cow<'_, str> {
    if text.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", text.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(text)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use rstest::rstest;

    use super::{ExportFormat, render, to_json_lines, write_csv, write_json_lines};
    use crate::{frame::FrameReassembler, record::Record};

    #[rstest]
    #[case("results.csv", ExportFormat::Csv)]
    #[case("RESULTS.CSV", ExportFormat::Csv)]
    #[case("results.jsonl", ExportFormat::JsonLines)]
    #[case("results", ExportFormat::JsonLines)]
    fn format_follows_extension(#[case] path: &str, #[case] expected: ExportFormat) {
        assert_eq!(ExportFormat::from_path(Path::new(path)), expected);
    }

    #[test]
    fn csv_has_one_column_per_field_in_first_seen_order() {
        let records = vec![
            Record::new(1, 200)
                .with_total_records(2)
                .with_extra("domain", "example.com"),
            Record::new("two", 503)
                .with_extra("protocol", "https")
                .with_extra("response_time", 1.5),
        ];
        let document = render(ExportFormat::Csv, &records).expect("export succeeds");

        assert_eq!(
            String::from_utf8(document).expect("utf-8"),
            "id,outcomeCode,totalRecords,domain,protocol,response_time\n\
             1,200,2,example.com,,\n\
             two,503,,,https,1.5\n"
        );
    }

    #[test]
    fn csv_quotes_fields_with_separators() {
        let records = vec![Record::new("a,b", 200).with_extra("note", "say \"hi\"\nthen go")];
        let mut out = Vec::new();
        assert_eq!(write_csv(&mut out, &records).expect("export succeeds"), 1);

        assert_eq!(
            String::from_utf8(out).expect("utf-8"),
            "id,outcomeCode,totalRecords,note\n\"a,b\",200,,\"say \"\"hi\"\"\nthen go\"\n"
        );
    }

    #[test]
    fn empty_history_writes_only_the_csv_header() {
        let document = render(ExportFormat::Csv, &Vec::<Record>::new()).expect("export succeeds");
        assert_eq!(document, b"id,outcomeCode,totalRecords\n");
    }

    #[test]
    fn exported_lines_decode_back_in_order() {
        let records = vec![
            Record::new(1, 200).with_total_records(2),
            Record::new("two", 500).with_extra("domain", "example.net"),
        ];
        let document = to_json_lines(&records).expect("export succeeds");

        let mut reassembler: FrameReassembler<Record> = FrameReassembler::default();
        assert_eq!(reassembler.feed(&document), records);
    }

    #[test]
    fn empty_history_writes_nothing() {
        let mut out = Vec::new();
        let written = write_json_lines(&mut out, &Vec::<Record>::new()).expect("export succeeds");
        assert_eq!(written, 0);
        assert!(out.is_empty());
    }
}
