use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use miette::Diagnostic;
use serde_json::json;
use thiserror::Error;

/// Errors from policy loading and catalog lookups. Evaluation itself never
/// errors; abnormal evaluator input yields `false`.
#[derive(Debug, Error, Diagnostic)]
pub enum AccessError {
    #[error("Failed to load policy file `{path}`")]
    #[diagnostic(
        code(breakwater::access::policy_load),
        help("Check that the file exists and is readable")
    )]
    PolicyLoadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid policy document `{path}`: {source}")]
    #[diagnostic(
        code(breakwater::access::invalid_policy),
        help("Policy documents are IAM-style JSON with `Version` and `Statement` fields")
    )]
    InvalidPolicy {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Policies directory `{0}` does not exist or is not a directory")]
    #[diagnostic(
        code(breakwater::access::policies_dir),
        help("Point `policies.dir` at a directory of `.json` policy documents")
    )]
    InvalidPoliciesDir(String),

    #[error("Unknown policy `{0}`")]
    #[diagnostic(
        code(breakwater::access::unknown_policy),
        help("Request only policy names returned by GET /api/v1/policies")
    )]
    UnknownPolicy(String),

    #[error("I/O error: {0}")]
    #[diagnostic(code(breakwater::access::io))]
    Io(#[from] std::io::Error),
}

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AccessError::UnknownPolicy(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };
        let body = json!({ "error": message });
        (status, Json(body)).into_response()
    }
}
