use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use miette::Diagnostic;
use serde_json::json;
use thiserror::Error;

use crate::access::errors::AccessError;

#[derive(Debug, Error, Diagnostic)]
pub enum BreakwaterError {
    #[error("I/O error: {0}")]
    #[diagnostic(code(breakwater::io))]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    #[diagnostic(code(breakwater::config))]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(breakwater::serde))]
    Serde(#[from] serde_json::Error),

    #[error("Invalid or expired session")]
    #[diagnostic(
        code(breakwater::invalid_session),
        help("Mint a session with POST /api/v1/session and send its cookie")
    )]
    InvalidSession,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Access(#[from] AccessError),

    #[error("{0}")]
    #[diagnostic(code(breakwater::other))]
    Other(String),
}

impl IntoResponse for BreakwaterError {
    fn into_response(self) -> Response {
        match self {
            BreakwaterError::InvalidSession => {
                let body = json!({ "error": self.to_string() });
                (StatusCode::UNAUTHORIZED, Json(body)).into_response()
            }
            BreakwaterError::Access(e) => e.into_response(),
            _ => {
                let body = json!({ "error": self.to_string() });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}
