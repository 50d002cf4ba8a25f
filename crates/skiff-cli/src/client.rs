//! Shared HTTP client construction, error classification, and logging setup.

use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use rand::{Rng, distr::Alphanumeric};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use skiff_sync::{DaemonClient, SyncError};
use tracing_subscriber::EnvFilter;

use crate::cli::OutputFormat;

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<SyncError> for CliError {
    fn from(err: SyncError) -> Self {
        if let SyncError::Status {
            status, message, ..
        } = &err
            && matches!(
                *status,
                StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY
            )
        {
            return Self::Validation(message.clone());
        }
        Self::Failure(err.into())
    }
}

/// Application context passed to command handlers.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub(crate) daemon: DaemonClient,
    pub(crate) output: OutputFormat,
}

/// Construct the HTTP client shared by every command.
pub(crate) fn build_http_client(timeout_secs: u64, trace_id: &str) -> CliResult<Client> {
    let mut default_headers = HeaderMap::new();
    let request_id = HeaderValue::from_str(trace_id).map_err(|_| {
        CliError::failure(anyhow::anyhow!("trace identifier contains invalid characters"))
    })?;
    default_headers.insert(HEADER_REQUEST_ID, request_id);

    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .default_headers(default_headers)
        .build()
        .map_err(|err| CliError::failure(anyhow::anyhow!("failed to build HTTP client: {err}")))
}

/// Generate a random alphanumeric string of the requested length.
#[must_use]
pub(crate) fn random_string(len: usize) -> String {
    let mut rng = rand::rng();
    std::iter::repeat_with(|| rng.sample(Alphanumeric) as char)
        .take(len)
        .collect()
}

/// Install the global tracing subscriber; silently a no-op when one exists.
pub(crate) fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_string_produces_expected_length() {
        let generated = random_string(16);
        assert_eq!(generated.len(), 16);
        assert!(generated.chars().all(|ch| ch.is_ascii_alphanumeric()));
    }

    #[test]
    fn validation_statuses_map_to_validation_errors() {
        let err = CliError::from(SyncError::Status {
            endpoint: "/api/routes".to_string(),
            status: StatusCode::BAD_REQUEST,
            message: "route name required".to_string(),
        });
        assert!(matches!(err, CliError::Validation(message) if message == "route name required"));
        assert_eq!(err_code(StatusCode::BAD_REQUEST), 2);
        assert_eq!(err_code(StatusCode::INTERNAL_SERVER_ERROR), 3);
    }

    fn err_code(status: StatusCode) -> i32 {
        CliError::from(SyncError::Status {
            endpoint: "/api/routes".to_string(),
            status,
            message: "boom".to_string(),
        })
        .exit_code()
    }

    #[test]
    fn build_http_client_rejects_bad_trace_id() {
        let err = build_http_client(5, "bad\nid").expect_err("newline is not a header value");
        assert_eq!(err.exit_code(), 3);
    }
}
