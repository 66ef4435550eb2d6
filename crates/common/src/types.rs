use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Review status of a homework submission as reported by the status API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HomeworkStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl HomeworkStatus {
    /// Every known status, in verdict-table order.
    pub const ALL: [HomeworkStatus; 3] = [
        HomeworkStatus::Approved,
        HomeworkStatus::Reviewing,
        HomeworkStatus::Rejected,
    ];

    /// Fixed human-readable verdict for this status.
    pub fn verdict(&self) -> &'static str {
        match self {
            HomeworkStatus::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            HomeworkStatus::Reviewing => "Работа взята на проверку ревьюером.",
            HomeworkStatus::Rejected => "Работа проверена, в ней нашлись ошибки.",
        }
    }
}

impl std::fmt::Display for HomeworkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HomeworkStatus::Approved => write!(f, "approved"),
            HomeworkStatus::Reviewing => write!(f, "reviewing"),
            HomeworkStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for HomeworkStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(HomeworkStatus::Approved),
            "reviewing" => Ok(HomeworkStatus::Reviewing),
            "rejected" => Ok(HomeworkStatus::Rejected),
            other => Err(AppError::UnknownStatus(other.to_string())),
        }
    }
}

/// The most recent homework record taken from a status response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Homework {
    pub homework_name: String,
    pub status: HomeworkStatus,
}

/// Decoded body of a successful status API response.
///
/// The body is kept as raw JSON so the validator can tell an absent field
/// apart from a field of the wrong type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusResponse {
    pub body: serde_json::Value,
}

impl StatusResponse {
    pub fn new(body: serde_json::Value) -> Self {
        Self { body }
    }

    /// Server-reported time the response is valid up to, if any.
    pub fn current_date(&self) -> Option<i64> {
        self.body.get("current_date").and_then(|v| v.as_i64())
    }
}

/// Request parameters attached to status API errors for diagnostics.
///
/// The authorization token is never stored here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    pub url: String,
    pub from_date: i64,
}

impl RequestInfo {
    pub fn new(url: impl Into<String>, from_date: i64) -> Self {
        Self {
            url: url.into(),
            from_date,
        }
    }
}

impl std::fmt::Display for RequestInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "url={}, headers={{Authorization: OAuth ***}}, params={{from_date={}}}",
            self.url, self.from_date
        )
    }
}
