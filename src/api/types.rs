// API type definitions
// Request payloads and response bodies of the results API

use serde::Serialize;
use serde_json::{Map, Value};

/// Submission accepted by `POST /raw_input` and `POST /standardized_output`
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationPayload {
    pub run_id: Option<String>,
    pub benchmark_name: String,
    /// Arbitrary JSON; a JSON-encoded string is decoded before storage
    pub data: Value,
}

impl EvaluationPayload {
    /// Parse and validate a request body.
    ///
    /// Every problem found is reported, not just the first one.
    pub fn from_body(body: &[u8]) -> Result<Self, Vec<ValidationIssue>> {
        let value: Value = serde_json::from_slice(body).map_err(|e| {
            vec![ValidationIssue::new(
                &["body"],
                &format!("JSON decode error: {e}"),
                "json_invalid",
            )]
        })?;

        let Value::Object(mut fields) = value else {
            return Err(vec![ValidationIssue::new(
                &["body"],
                "Input should be a valid dictionary or object to extract fields from",
                "model_attributes_type",
            )]);
        };

        let mut issues = Vec::new();
        let benchmark_name = match take_string(&mut fields, "benchmark_name") {
            Ok(Some(name)) => Some(name),
            Ok(None) => {
                issues.push(ValidationIssue::new(
                    &["body", "benchmark_name"],
                    "Field required",
                    "missing",
                ));
                None
            }
            Err(issue) => {
                issues.push(issue);
                None
            }
        };
        let run_id = take_string(&mut fields, "run_id").unwrap_or_else(|issue| {
            issues.push(issue);
            None
        });

        match benchmark_name {
            Some(benchmark_name) if issues.is_empty() => Ok(Self {
                run_id,
                benchmark_name,
                data: fields.remove("data").unwrap_or(Value::Null),
            }),
            _ => Err(issues),
        }
    }
}

/// Remove an optional string field; `null` counts as absent.
fn take_string(fields: &mut Map<String, Value>, key: &str) -> Result<Option<String>, ValidationIssue> {
    match fields.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(ValidationIssue::new(
            &["body", key],
            "Input should be a valid string",
            "string_type",
        )),
    }
}

/// One field-level validation problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ValidationIssue {
    pub fn new(loc: &[&str], msg: &str, kind: &str) -> Self {
        Self {
            loc: loc.iter().map(ToString::to_string).collect(),
            msg: msg.to_string(),
            kind: kind.to_string(),
        }
    }
}

/// Body of a 400 validation response
#[derive(Debug, Serialize)]
pub struct ValidationErrorBody<'a> {
    pub detail: &'a [ValidationIssue],
}

/// Response to a successful submission
#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub status: &'static str,
    pub run_id: String,
    pub saved_as: String,
}

/// Response to a single document fetch
#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub file_name: String,
    pub data: Value,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
