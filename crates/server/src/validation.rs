//! Request payload limits.
//!
//! Lengths are counted in chars. Blank strings count as empty.

use crate::error::{ServerError, ServerResult};
use crate::store::WidgetPosition;

pub const MAX_MESSAGE_CHARS: usize = 1000;
pub const MAX_QUESTION_CHARS: usize = 500;
pub const MAX_ANSWER_CHARS: usize = 2000;
pub const MAX_DESCRIPTION_CHARS: usize = 10_000;
pub const MAX_NAME_CHARS: usize = 100;
pub const MAX_GREETING_CHARS: usize = 200;

/// Check that `value` is non-blank and at most `max` chars.
pub fn require_text(field: &str, value: &str, max: usize) -> ServerResult<()> {
    if value.trim().is_empty() {
        return Err(ServerError::Validation(format!("{field} must not be empty")));
    }
    let len = value.chars().count();
    if len > max {
        return Err(ServerError::Validation(format!(
            "{field} must be at most {max} characters (got {len})"
        )));
    }
    Ok(())
}

pub fn validate_message(message: &str) -> ServerResult<()> {
    require_text("message", message, MAX_MESSAGE_CHARS)
}

pub fn validate_faq(question: &str, answer: &str) -> ServerResult<()> {
    require_text("question", question, MAX_QUESTION_CHARS)?;
    require_text("answer", answer, MAX_ANSWER_CHARS)
}

pub fn validate_description(description: &str) -> ServerResult<()> {
    require_text("description", description, MAX_DESCRIPTION_CHARS)
}

pub fn validate_id(field: &str, id: &str) -> ServerResult<()> {
    if id.trim().is_empty() {
        return Err(ServerError::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// `#RRGGBB` with hex digits of either case.
pub fn validate_color(color: &str) -> ServerResult<()> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        Ok(())
    } else {
        Err(ServerError::Validation(format!(
            "color must be a hex color like #3b82f6 (got {color:?})"
        )))
    }
}

pub fn parse_position(position: &str) -> ServerResult<WidgetPosition> {
    WidgetPosition::parse(position).ok_or_else(|| {
        ServerError::Validation(format!("position must be 'left' or 'right' (got {position:?})"))
    })
}
