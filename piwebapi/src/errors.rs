//! Error types for the PI Web API client.

use std::fmt;

use serde_json::Value;

/// `ErrorCode` the server reports while its database is being crawled.
pub const CRAWLING_ERROR_CODE: i64 = 20;

/// Errors that can occur when making API requests.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The server answered 401.
    #[error("Authorization denied - incorrect username or password.")]
    Unauthorized,
    /// The server answered with a status other than the one the call expects.
    #[error("Wrong server response: {status} {reason}")]
    HttpStatus { status: u16, reason: String },
    /// The response body carried a non-empty `Errors` list.
    #[error("PI Web API returned an error: {}", join_errors(.errors))]
    PiWebApi { errors: Vec<ServerError> },
    /// A JSON body was expected but could not be decoded.
    #[error("No JSON object could be decoded")]
    MalformedBody(#[source] serde_json::Error),
    /// The database was still being crawled after the last permitted attempt.
    #[error("Database is still being crawled after {attempts} attempts")]
    CrawlTimeout { attempts: u32 },
    /// The request never produced a response (connect, TLS, timeout, body read).
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// A request or batch resource URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// A request body could not be encoded as JSON.
    #[error("Could not encode request body: {0}")]
    EncodeBody(#[source] serde_json::Error),
}

impl Error {
    /// The server error entries, when this is a `PiWebApi` error.
    pub fn server_errors(&self) -> &[ServerError] {
        match self {
            Error::PiWebApi { errors } => errors,
            _ => &[],
        }
    }
}

/// One entry of a response body's `Errors` list.
///
/// The server does not use a fixed schema here: entries are usually plain
/// strings, sometimes objects with `ErrorCode` and `Message`. The raw JSON is
/// kept so nothing is lost.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerError(pub Value);

impl ServerError {
    /// Numeric `ErrorCode`, if the entry carries one.
    pub fn code(&self) -> Option<i64> {
        self.0.get("ErrorCode").and_then(Value::as_i64)
    }

    /// Human readable message: the `Message` field, or the entry itself when
    /// it is a bare string.
    pub fn message(&self) -> Option<&str> {
        match &self.0 {
            Value::String(s) => Some(s),
            other => other.get("Message").and_then(Value::as_str),
        }
    }

    pub fn is_crawling(&self) -> bool {
        self.code() == Some(CRAWLING_ERROR_CODE)
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code(), self.message()) {
            (Some(code), Some(msg)) => write!(f, "[{}] {}", code, msg),
            (None, Some(msg)) => write!(f, "{}", msg),
            _ => write!(f, "{}", self.0),
        }
    }
}

/// Extracts a non-empty top-level `Errors` list from a decoded body.
pub(crate) fn embedded_errors(body: &Value) -> Option<Vec<ServerError>> {
    match body.get("Errors") {
        Some(Value::Array(entries)) if !entries.is_empty() => {
            Some(entries.iter().cloned().map(ServerError).collect())
        }
        _ => None,
    }
}

fn join_errors(errors: &[ServerError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
