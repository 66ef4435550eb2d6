//! Homework status API client.
//!
//! Classifies every outcome of a status request into the shared error
//! taxonomy. A JSON error envelope is checked before the HTTP status because
//! the API sends it with both 200 and non-200 replies.

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;

use homework_common::error::{AppError, Result};
use homework_common::types::{RequestInfo, StatusResponse};

/// Source of homework status responses.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetch statuses updated since `since` (Unix seconds).
    async fn fetch_status(&self, since: i64) -> Result<StatusResponse>;
}

/// Client for the Practicum homework status endpoint.
pub struct PracticumClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl PracticumClient {
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            token: token.into(),
        }
    }

    /// Check that the endpoint is reachable at all.
    ///
    /// Any HTTP reply counts as reachable; only transport failures are reported.
    pub async fn probe(&self) -> Result<()> {
        let response = self
            .http
            .get(&self.endpoint)
            .header(AUTHORIZATION, self.authorization())
            .send()
            .await
            .map_err(|source| AppError::EndpointUnavailable {
                url: self.endpoint.clone(),
                source,
            })?;

        tracing::info!(
            url = %self.endpoint,
            status = response.status().as_u16(),
            "Status endpoint is reachable"
        );
        Ok(())
    }

    fn authorization(&self) -> String {
        format!("OAuth {}", self.token)
    }
}

#[async_trait]
impl StatusSource for PracticumClient {
    async fn fetch_status(&self, since: i64) -> Result<StatusResponse> {
        let request = RequestInfo::new(self.endpoint.clone(), since);

        let response = self
            .http
            .get(&self.endpoint)
            .header(AUTHORIZATION, self.authorization())
            .query(&[("from_date", since)])
            .send()
            .await
            .map_err(|source| AppError::Network {
                source,
                request: request.clone(),
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|source| AppError::Network {
            source,
            request: request.clone(),
        })?;

        let body: Value = match serde_json::from_str(&text) {
            Ok(body) => body,
            Err(_) if status != StatusCode::OK => {
                return Err(AppError::UnexpectedStatus {
                    status: status.as_u16(),
                    request,
                });
            }
            Err(source) => return Err(AppError::InvalidJson { source, request }),
        };

        classify(status, body, request)
    }
}

/// Turn a decoded reply into a response or the matching error.
fn classify(status: StatusCode, body: Value, request: RequestInfo) -> Result<StatusResponse> {
    if body.get("code").is_some() || body.get("error").is_some() {
        return Err(AppError::DenialOfService {
            code: envelope_field(&body, "code"),
            error: envelope_field(&body, "error"),
            request,
        });
    }

    if status != StatusCode::OK {
        return Err(AppError::UnexpectedStatus {
            status: status.as_u16(),
            request,
        });
    }

    tracing::debug!(from_date = request.from_date, "Status API answered");
    Ok(StatusResponse::new(body))
}

fn envelope_field(body: &Value, key: &str) -> String {
    match body.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
