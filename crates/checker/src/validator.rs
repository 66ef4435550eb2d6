use serde_json::Value;

use homework_common::error::{AppError, Result};
use homework_common::types::{Homework, HomeworkStatus, StatusResponse};

/// Extract the most recent homework from a status response.
///
/// The API lists homeworks newest first, so only element 0 is inspected.
/// An empty list means nothing changed and yields `AppError::NoNewStatus`.
pub fn extract_homework(response: &StatusResponse) -> Result<Homework> {
    let homeworks = response
        .body
        .get("homeworks")
        .ok_or_else(|| AppError::MissingField("homeworks".to_string()))?
        .as_array()
        .ok_or_else(|| invalid("homeworks", "array"))?;

    let latest = homeworks.first().ok_or(AppError::NoNewStatus)?;

    let status: HomeworkStatus = string_field(latest, "status")?.parse()?;
    let homework_name = string_field(latest, "homework_name")?.to_string();

    Ok(Homework {
        homework_name,
        status,
    })
}

fn string_field<'a>(record: &'a Value, field: &str) -> Result<&'a str> {
    record
        .get(field)
        .ok_or_else(|| AppError::MissingField(field.to_string()))?
        .as_str()
        .ok_or_else(|| invalid(field, "string"))
}

fn invalid(field: &str, expected: &'static str) -> AppError {
    AppError::InvalidField {
        field: field.to_string(),
        expected,
    }
}
