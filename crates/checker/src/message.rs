//! Fixed notification texts sent to the chat.

use homework_common::error::AppError;
use homework_common::types::Homework;

/// Sent when the status API reports no homework updates.
pub const NO_NEW_STATUS: &str = "No new homework statuses.";

/// Render a status change notification.
pub fn format_status_changed(homework: &Homework) -> String {
    format!(
        "Status of check for work \"{}\" changed. {}",
        homework.homework_name,
        homework.status.verdict()
    )
}

/// Render an error into the generic failure notification.
pub fn format_failure(error: &AppError) -> String {
    format!("Program failure: {}", error)
}
