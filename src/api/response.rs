// API error mapping
// Turns handler failures into HTTP responses in one place

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use super::types::{ValidationErrorBody, ValidationIssue};
use crate::http;
use crate::logger;
use crate::store::StoreError;

/// Everything a route handler can fail with
#[derive(Debug)]
pub enum ApiError {
    /// Request body failed validation (400)
    Validation(Vec<ValidationIssue>),
    /// Request body exceeded the configured limit (413)
    PayloadTooLarge(u64),
    /// Request body could not be read
    BodyRead(String),
    Store(StoreError),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl ApiError {
    pub fn into_response(self) -> Response<Full<Bytes>> {
        match self {
            Self::Validation(issues) => http::build_json_response(
                StatusCode::BAD_REQUEST,
                &ValidationErrorBody { detail: &issues },
            ),
            Self::PayloadTooLarge(limit) => http::build_413_response(limit),
            Self::BodyRead(reason) => {
                logger::log_warning(&format!("Failed to read request body: {reason}"));
                http::build_detail_response(StatusCode::BAD_REQUEST, "Failed to read request body")
            }
            Self::Store(StoreError::NotFound(_)) => {
                http::build_detail_response(StatusCode::NOT_FOUND, "File not found")
            }
            Self::Store(e) => {
                logger::log_error(&e.to_string());
                http::build_detail_response(StatusCode::INTERNAL_SERVER_ERROR, &client_detail(&e))
            }
        }
    }
}

/// Message safe to return to clients: names the document at most, never a path
fn client_detail(e: &StoreError) -> String {
    match e {
        StoreError::MalformedDocument { file_name, .. } => format!("Malformed JSON in {file_name}"),
        StoreError::InvalidMeta(file_name) => format!("Unsupported meta block in {file_name}"),
        StoreError::NotFound(_) | StoreError::Io { .. } | StoreError::Serialize(_) => {
            "Internal Server Error".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let not_found = ApiError::from(StoreError::NotFound("x.json".to_string()));
        assert_eq!(not_found.into_response().status(), StatusCode::NOT_FOUND);

        let malformed = ApiError::from(StoreError::MalformedDocument {
            file_name: "x.json".to_string(),
            source: serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
        });
        assert_eq!(
            malformed.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let io = ApiError::from(StoreError::io(
            "/srv/evals/public/results/parsed/.0f3a9c.tmp",
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        ));
        assert_eq!(io.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let invalid = ApiError::Validation(vec![ValidationIssue::new(&["body"], "bad", "json_invalid")]);
        assert_eq!(invalid.into_response().status(), StatusCode::BAD_REQUEST);

        assert_eq!(
            ApiError::PayloadTooLarge(10).into_response().status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[test]
    fn test_server_errors_hide_paths() {
        let io = StoreError::io(
            "/srv/evals/public/results/raw/x.json",
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        assert_eq!(client_detail(&io), "Internal Server Error");

        let malformed = StoreError::MalformedDocument {
            file_name: "x.json".to_string(),
            source: serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
        };
        assert_eq!(client_detail(&malformed), "Malformed JSON in x.json");
    }
}
