use thiserror::Error;

use crate::types::RequestInfo;

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Common error types used across the application.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing required environment variable: {0}")]
    MissingConfig(String),

    #[error("Invalid value for environment variable {name}: {value:?}")]
    InvalidConfig { name: String, value: String },

    #[error("Status endpoint {url} is unavailable: {source}")]
    EndpointUnavailable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Network failure: {source}; {request}")]
    Network {
        #[source]
        source: reqwest::Error,
        request: RequestInfo,
    },

    #[error("Malformed JSON in response: {source}; {request}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
        request: RequestInfo,
    },

    #[error("Denial of service: code={code}, error={error}; {request}")]
    DenialOfService {
        code: String,
        error: String,
        request: RequestInfo,
    },

    #[error("Unexpected endpoint status: status={status}; {request}")]
    UnexpectedStatus { status: u16, request: RequestInfo },

    #[error("Response is missing field `{0}`")]
    MissingField(String),

    #[error("Field `{field}` has unexpected type, expected {expected}")]
    InvalidField {
        field: String,
        expected: &'static str,
    },

    #[error("No new homework statuses")]
    NoNewStatus,

    #[error("Unknown homework status: {0}")]
    UnknownStatus(String),

    #[error("Message delivery failed: {0}")]
    Delivery(String),
}
