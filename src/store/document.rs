//! Document naming and payload normalization
//!
//! A document is addressed by `(benchmark_name, run_id)` and stored as
//! `<benchmark_name>-<run_id>.json`.

use serde_json::Value;

/// Run id used when the client does not send one
pub const DEFAULT_RUN_ID: &str = "None";

pub const DOCUMENT_EXTENSION: &str = ".json";

/// Strip everything up to and including the last `/`.
///
/// `"../secret.json"` becomes `"secret.json"`, `"a/b/"` becomes `""`.
pub fn base_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Resolve the effective run id: absent or empty means [`DEFAULT_RUN_ID`].
pub fn effective_run_id(run_id: Option<&str>) -> String {
    match run_id {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => DEFAULT_RUN_ID.to_string(),
    }
}

/// Compose the on-disk file name for a document
pub fn compose_file_name(benchmark_name: &str, run_id: &str) -> String {
    format!(
        "{}-{}{DOCUMENT_EXTENSION}",
        base_name(benchmark_name),
        base_name(run_id)
    )
}

/// Whether a directory entry name is a stored document
pub fn is_document_name(name: &str) -> bool {
    name.ends_with(DOCUMENT_EXTENSION)
}

/// Turn a JSON-encoded string payload into the value it encodes.
///
/// Anything that is not a string, or a string that does not parse as JSON,
/// is kept as it is.
pub fn normalize_payload(data: Value) -> Value {
    match data {
        Value::String(text) => serde_json::from_str(&text).unwrap_or(Value::String(text)),
        other => other,
    }
}
