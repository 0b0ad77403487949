//! Result records reported by the remote batch service.
//!
//! A [`Record`] describes the outcome of one processed input item. Two wire
//! shapes decode into it:
//!
//! - the flat form `{"id":1,"outcomeCode":200,"totalRecords":2}` (snake_case field names and
//!   `response_code` are accepted as aliases);
//! - the progress-update form, where the per-item fields live in a nested `result` object and
//!   `total_records` sits at the top level.
//!
//! Fields beyond the identifier, outcome code, and declared total are kept in
//! [`Record::extra`] so exports can reproduce them.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use serde_json::{Map, Value};

/// Identifier of a processed input item.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    /// Numeric identifier.
    Number(i64),
    /// Textual identifier.
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self { Self::Number(value) }
}

impl From<i32> for RecordId {
    fn from(value: i32) -> Self { Self::Number(i64::from(value)) }
}

impl From<u32> for RecordId {
    fn from(value: u32) -> Self { Self::Number(i64::from(value)) }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self { Self::Text(value.to_owned()) }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self { Self::Text(value) }
}

/// One decoded result.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Record {
    id: RecordId,
    #[serde(rename = "outcomeCode")]
    outcome_code: u16,
    #[serde(rename = "totalRecords", skip_serializing_if = "Option::is_none")]
    total_records: Option<u64>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Record {
    /// Construct a record without a declared total or extra fields.
    #[must_use]
    pub fn new(id: impl Into<RecordId>, outcome_code: u16) -> Self {
        Self {
            id: id.into(),
            outcome_code,
            total_records: None,
            extra: Map::new(),
        }
    }

    /// Attach the batch size declared alongside this record.
    #[must_use]
    pub fn with_total_records(mut self, total: u64) -> Self {
        self.total_records = Some(total);
        self
    }

    /// Attach an additional field carried through to exports.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Identifier of the processed item.
    #[must_use]
    pub fn id(&self) -> &RecordId { &self.id }

    /// Outcome code reported for the item.
    #[must_use]
    pub const fn outcome_code(&self) -> u16 { self.outcome_code }

    /// Batch size declared by the service, if present on this record.
    #[must_use]
    pub const fn total_records(&self) -> Option<u64> { self.total_records }

    /// Fields not interpreted by the aggregator.
    #[must_use]
    pub fn extra(&self) -> &Map<String, Value> { &self.extra }
}

#[derive(Deserialize)]
struct FlatRecord {
    id: RecordId,
    #[serde(rename = "outcomeCode", alias = "outcome_code", alias = "response_code")]
    outcome_code: u16,
    #[serde(default, rename = "totalRecords", alias = "total_records")]
    total_records: Option<u64>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<FlatRecord> for Record {
    fn from(flat: FlatRecord) -> Self {
        Self {
            id: flat.id,
            outcome_code: flat.outcome_code,
            total_records: flat.total_records,
            extra: flat.extra,
        }
    }
}

fn from_fields(fields: Map<String, Value>) -> Result<Record, serde_json::Error> {
    serde_json::from_value::<FlatRecord>(Value::Object(fields)).map(Record::from)
}

fn declared_total(fields: &Map<String, Value>) -> Result<Option<u64>, serde_json::Error> {
    match fields.get("total_records").or_else(|| fields.get("totalRecords")) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => u64::deserialize(value).map(Some),
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut fields = Map::deserialize(deserializer)?;
        match fields.remove("result") {
            Some(Value::Object(result)) => {
                let total = declared_total(&fields).map_err(D::Error::custom)?;
                let mut record = from_fields(result).map_err(D::Error::custom)?;
                if record.total_records.is_none() {
                    record.total_records = total;
                }
                Ok(record)
            }
            Some(other) => {
                fields.insert("result".to_owned(), other);
                from_fields(fields).map_err(D::Error::custom)
            }
            None => from_fields(fields).map_err(D::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::{Record, RecordId};

    fn parse(text: &str) -> Record { serde_json::from_str(text).expect("record should decode") }

    #[rstest]
    #[case(r#"{"id":1,"outcomeCode":200,"totalRecords":2}"#)]
    #[case(r#"{"id":1,"outcome_code":200,"total_records":2}"#)]
    #[case(r#"{"id":1,"response_code":200,"total_records":2}"#)]
    fn flat_shapes_decode(#[case] text: &str) {
        let record = parse(text);
        assert_eq!(record.id(), &RecordId::Number(1));
        assert_eq!(record.outcome_code(), 200);
        assert_eq!(record.total_records(), Some(2));
        assert!(record.extra().is_empty());
    }

    #[test]
    fn total_is_optional() {
        let record = parse(r#"{"id":"a-7","outcomeCode":404}"#);
        assert_eq!(record.id(), &RecordId::from("a-7"));
        assert_eq!(record.total_records(), None);
    }

    #[test]
    fn nested_progress_update_decodes() {
        let record = parse(
            r#"{"success_count":1,"unsuccess_count":0,"total_records":3,"records_processed":1,
                "result":{"id":"9","domain":"example.com","protocol":"http","response_code":200,
                "response_time":12,"full_response":"Headers: {}"},
                "status_code_stats":{"200":1}}"#,
        );
        assert_eq!(record.id(), &RecordId::from("9"));
        assert_eq!(record.outcome_code(), 200);
        assert_eq!(record.total_records(), Some(3));
        assert_eq!(record.extra().get("domain"), Some(&json!("example.com")));
        assert!(record.extra().get("status_code_stats").is_none());
    }

    #[test]
    fn non_object_result_field_is_extra() {
        let record = parse(r#"{"id":2,"outcomeCode":500,"result":"timeout"}"#);
        assert_eq!(record.extra().get("result"), Some(&json!("timeout")));
    }

    #[rstest]
    #[case(r#"{"outcomeCode":200}"#)]
    #[case(r#"{"id":1}"#)]
    #[case(r#"{"id":1,"outcomeCode":"ok"}"#)]
    #[case(r#"{"id":1,"outcomeCode":70000}"#)]
    #[case(r#"{"id":1,"outcomeCode":200,"totalRecords":-1}"#)]
    #[case(r#"{"result":{"id":1},"total_records":2}"#)]
    #[case("[1,2]")]
    fn invalid_shapes_are_rejected(#[case] text: &str) {
        assert!(serde_json::from_str::<Record>(text).is_err(), "{text} should fail");
    }

    #[test]
    fn serializes_flat_with_extra_fields() {
        let record = Record::new(3, 200)
            .with_total_records(4)
            .with_extra("domain", "example.org");
        let value = serde_json::to_value(&record).expect("serialize");
        assert_eq!(
            value,
            json!({"id":3,"outcomeCode":200,"totalRecords":4,"domain":"example.org"})
        );
    }
}
