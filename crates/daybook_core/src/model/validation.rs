//! Field-level validation shared by write inputs.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rejection of one input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text is empty after trim.
    Blank { field: &'static str },
    /// Text exceeds the stored column width.
    TooLong { field: &'static str, max_chars: usize },
    /// Integer value outside the accepted closed range.
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
    /// Value does not match the expected textual format.
    InvalidFormat {
        field: &'static str,
        expected: &'static str,
    },
}

impl ValidationError {
    /// Name of the rejected field, as exposed in the JSON schema.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Blank { field }
            | Self::TooLong { field, .. }
            | Self::OutOfRange { field, .. }
            | Self::InvalidFormat { field, .. } => field,
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blank { field } => write!(f, "`{field}` must not be blank"),
            Self::TooLong { field, max_chars } => {
                write!(f, "`{field}` must be at most {max_chars} characters")
            }
            Self::OutOfRange {
                field,
                value,
                min,
                max,
            } => write!(f, "`{field}` must be between {min} and {max}, got {value}"),
            Self::InvalidFormat { field, expected } => {
                write!(f, "`{field}` must be {expected}")
            }
        }
    }
}

impl Error for ValidationError {}

/// Trims required text and enforces non-blank + max length.
pub fn required_text(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Blank { field });
    }
    ensure_max_chars(field, trimmed, max_chars)?;
    Ok(trimmed.to_string())
}

/// Trims optional text; blank values collapse to `None`.
pub fn optional_text(
    field: &'static str,
    value: Option<&str>,
    max_chars: Option<usize>,
) -> Result<Option<String>, ValidationError> {
    let Some(trimmed) = value.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    if let Some(max_chars) = max_chars {
        ensure_max_chars(field, trimmed, max_chars)?;
    }
    Ok(Some(trimmed.to_string()))
}

/// Enforces a closed integer range.
pub fn in_range(field: &'static str, value: i64, min: i64, max: i64) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

fn ensure_max_chars(field: &'static str, value: &str, max_chars: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max_chars {
        return Err(ValidationError::TooLong { field, max_chars });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{in_range, optional_text, required_text, ValidationError};

    #[test]
    fn required_text_trims_and_rejects_blank() {
        assert_eq!(required_text("title", "  Buy milk ", 10).unwrap(), "Buy milk");
        assert_eq!(
            required_text("title", "   ", 10).unwrap_err(),
            ValidationError::Blank { field: "title" }
        );
    }

    #[test]
    fn required_text_counts_chars_not_bytes() {
        assert!(required_text("title", "ééééé", 5).is_ok());
        let err = required_text("title", "ééééééé", 5).unwrap_err();
        assert_eq!(err.field(), "title");
    }

    #[test]
    fn optional_text_collapses_blank_to_none() {
        assert_eq!(optional_text("weather", Some("  "), Some(50)).unwrap(), None);
        assert_eq!(optional_text("weather", None, Some(50)).unwrap(), None);
        assert_eq!(
            optional_text("weather", Some(" sunny "), Some(50)).unwrap(),
            Some("sunny".to_string())
        );
    }

    #[test]
    fn in_range_reports_bounds() {
        let err = in_range("mood", 9, 1, 5).unwrap_err();
        assert_eq!(err.to_string(), "`mood` must be between 1 and 5, got 9");
    }
}
