use axum::{
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};

use crate::error::{AppError, AppResult};

/// Reject an empty (after trimming) or overlong required field
pub fn validate_required(field: &str, value: &str, max_len: usize) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    validate_optional(field, Some(value), max_len)
}

/// Reject an overlong optional field; lengths count characters, not bytes
pub fn validate_optional(field: &str, value: Option<&str>, max_len: usize) -> AppResult<()> {
    match value {
        Some(v) if v.chars().count() > max_len => Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            field, max_len
        ))),
        _ => Ok(()),
    }
}

/// Downloadable file response with the given content type
pub fn attachment(content_type: &'static str, filename: &str, body: Vec<u8>) -> Response {
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(content_type)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}

/// Reduce a user-supplied name to characters safe in a download filename
pub fn safe_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "export".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_limits_count_characters() {
        assert!(validate_optional("nickname", Some(&"é".repeat(50)), 50).is_ok());
        assert!(validate_optional("nickname", Some(&"a".repeat(51)), 50).is_err());
        assert!(validate_optional("nickname", None, 50).is_ok());
        assert!(validate_required("name", "   ", 100).is_err());
    }

    #[test]
    fn test_safe_filename() {
        assert_eq!(safe_filename("Team Rocket!"), "Team_Rocket_");
        assert_eq!(safe_filename(""), "export");
    }
}
