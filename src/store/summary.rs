//! Result summary entries for `/api/results`
//!
//! Derived from standardized documents on every call, never stored.

use serde::Serialize;
use serde_json::{Map, Value};

use super::document::{DEFAULT_RUN_ID, DOCUMENT_EXTENSION};
use super::error::{StoreError, StoreResult};

const UNKNOWN: &str = "unknown";

/// One row of the aggregate result listing
///
/// Meta fields are passed through as found in the document; only `pk` is
/// rendered to text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultSummary {
    pub pk: String,
    pub benchmark_name: Value,
    pub model_id: Value,
    pub source: Value,
    pub timestamp: Value,
    pub tokenizer_id: Value,
    pub file_name: String,
}

impl ResultSummary {
    /// Build the entry for one parsed document.
    ///
    /// Documents carrying a `meta` object are described by it; anything else
    /// falls back to the `<benchmark>-<run_id>.json` file name.
    pub fn from_document(file_name: &str, document: &Value) -> StoreResult<Self> {
        match document.get("meta") {
            Some(Value::Object(meta)) => Ok(Self::from_meta(file_name, meta)),
            Some(_) => Err(StoreError::InvalidMeta(file_name.to_string())),
            None => Ok(Self::from_file_name(file_name)),
        }
    }

    fn from_meta(file_name: &str, meta: &Map<String, Value>) -> Self {
        let timestamp = field(meta, "timestamp", "");
        let benchmark_name = field(meta, "benchmark_name", "");
        let run_id = field(meta, "run_id", DEFAULT_RUN_ID);

        let (model_id, source, tokenizer_id) = match meta.get("model") {
            Some(Value::Object(model)) => (
                field(model, "id", ""),
                field(model, "source", ""),
                field(model, "tokenizer_id", ""),
            ),
            _ => (Value::from(""), Value::from(""), Value::from("")),
        };

        Self {
            pk: format!(
                "{}-{}-{}",
                key_text(&timestamp),
                key_text(&benchmark_name),
                key_text(&run_id)
            ),
            benchmark_name,
            model_id,
            source,
            timestamp,
            tokenizer_id,
            file_name: file_name.to_string(),
        }
    }

    fn from_file_name(file_name: &str) -> Self {
        let stem = file_name.replace(DOCUMENT_EXTENSION, "");
        let mut parts = stem.split('-');
        let benchmark_name = parts.next().unwrap_or_default();
        let run_id = parts.next().unwrap_or(DEFAULT_RUN_ID);

        Self {
            pk: format!("{UNKNOWN}-{benchmark_name}-{run_id}"),
            benchmark_name: Value::from(benchmark_name),
            model_id: Value::from(UNKNOWN),
            source: Value::from(UNKNOWN),
            timestamp: Value::from(UNKNOWN),
            tokenizer_id: Value::from(UNKNOWN),
            file_name: file_name.to_string(),
        }
    }
}

/// Field value, or `default` as a string when the key is missing
fn field(map: &Map<String, Value>, key: &str, default: &str) -> Value {
    map.get(key).cloned().unwrap_or_else(|| Value::from(default))
}

/// Text of a value inside `pk`: strings unquoted, `null` as `None`,
/// booleans as `True`/`False`, anything else in JSON form.
fn key_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => DEFAULT_RUN_ID.to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summary_from_meta() {
        let doc = json!({
            "meta": {
                "timestamp": "T",
                "benchmark_name": "bn",
                "run_id": "r1",
                "model": {"id": "m1", "source": "s1", "tokenizer_id": "tk1"}
            },
            "results": []
        });
        let entry = ResultSummary::from_document("bn-r1.json", &doc).unwrap();
        assert_eq!(
            entry,
            ResultSummary {
                pk: "T-bn-r1".to_string(),
                benchmark_name: json!("bn"),
                model_id: json!("m1"),
                source: json!("s1"),
                timestamp: json!("T"),
                tokenizer_id: json!("tk1"),
                file_name: "bn-r1.json".to_string(),
            }
        );
    }

    #[test]
    fn test_summary_meta_defaults() {
        let doc = json!({"meta": {"benchmark_name": "bn", "model": "not-an-object"}});
        let entry = ResultSummary::from_document("x.json", &doc).unwrap();
        assert_eq!(entry.pk, "-bn-None");
        assert_eq!(entry.timestamp, "");
        assert_eq!(entry.model_id, "");
        assert_eq!(entry.source, "");
        assert_eq!(entry.tokenizer_id, "");
    }

    #[test]
    fn test_summary_meta_non_string_values() {
        let doc = json!({
            "meta": {
                "timestamp": 1_700_000_000,
                "benchmark_name": "bn",
                "run_id": null,
                "model": {"id": null, "source": true, "tokenizer_id": ["a", "b"]}
            }
        });
        let entry = ResultSummary::from_document("bn.json", &doc).unwrap();
        assert_eq!(entry.pk, "1700000000-bn-None");
        assert_eq!(entry.timestamp, json!(1_700_000_000));
        assert_eq!(entry.model_id, Value::Null);
        assert_eq!(entry.source, json!(true));
        assert_eq!(entry.tokenizer_id, json!(["a", "b"]));

        let serialized = serde_json::to_value(&entry).unwrap();
        assert_eq!(serialized["timestamp"], json!(1_700_000_000));
        assert_eq!(serialized["model_id"], Value::Null);
    }

    #[test]
    fn test_summary_pk_renders_booleans_like_python() {
        let doc = json!({"meta": {"timestamp": "T", "benchmark_name": false, "run_id": 3}});
        let entry = ResultSummary::from_document("x.json", &doc).unwrap();
        assert_eq!(entry.pk, "T-False-3");
        assert_eq!(entry.benchmark_name, json!(false));
    }

    #[test]
    fn test_summary_from_file_name() {
        let entry = ResultSummary::from_document("mmlu-r7.json", &json!({"scores": [1, 2]})).unwrap();
        assert_eq!(entry.pk, "unknown-mmlu-r7");
        assert_eq!(entry.benchmark_name, "mmlu");
        assert_eq!(entry.model_id, "unknown");
        assert_eq!(entry.source, "unknown");
        assert_eq!(entry.timestamp, "unknown");
        assert_eq!(entry.tokenizer_id, "unknown");
        assert_eq!(entry.file_name, "mmlu-r7.json");
    }

    #[test]
    fn test_summary_file_name_without_run_id() {
        let entry = ResultSummary::from_document("lonely.json", &json!([1, 2, 3])).unwrap();
        assert_eq!(entry.pk, "unknown-lonely-None");
        assert_eq!(entry.benchmark_name, "lonely");
    }

    #[test]
    fn test_summary_rejects_non_object_meta() {
        let err = ResultSummary::from_document("bad.json", &json!({"meta": [1]})).unwrap_err();
        assert!(matches!(err, StoreError::InvalidMeta(name) if name == "bad.json"));
    }
}
