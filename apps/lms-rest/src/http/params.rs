use crate::error::AppError;

/// A request parameter that must be present and non-blank.
pub fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, AppError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::missing_parameter(name))
}
