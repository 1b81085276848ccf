use crate::utils::error::{AppError, Result};
use url::Url;

/// Extensions accepted for uploaded or converted Markdown sources.
pub const MARKDOWN_EXTENSIONS: [&str; 3] = [".md", ".markdown", ".txt"];

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(AppError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(AppError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(AppError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(AppError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(AppError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Upload names must end in one of [`MARKDOWN_EXTENSIONS`]. The check is
/// case-sensitive, `NOTES.MD` is rejected.
pub fn validate_markdown_filename(file_name: Option<&str>) -> Result<&str> {
    match file_name {
        Some(name)
            if !name.is_empty() && MARKDOWN_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) =>
        {
            Ok(name)
        }
        other => Err(AppError::UnsupportedFile {
            name: other.unwrap_or_default().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("healthcheck.url", "https://example.com").is_ok());
        assert!(validate_url("healthcheck.url", "http://127.0.0.1:8000/health").is_ok());
        assert!(validate_url("healthcheck.url", "").is_err());
        assert!(validate_url("healthcheck.url", "invalid-url").is_err());
        assert!(validate_url("healthcheck.url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("server.workers", 2, 1).is_ok());
        assert!(validate_positive_number("server.workers", 0, 1).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("server.port", 8000u16, 1, u16::MAX).is_ok());
        assert!(validate_range("server.port", 0u16, 1, u16::MAX).is_err());
    }

    #[test]
    fn test_validate_markdown_filename() {
        assert_eq!(validate_markdown_filename(Some("notes.md")).unwrap(), "notes.md");
        assert!(validate_markdown_filename(Some("readme.markdown")).is_ok());
        assert!(validate_markdown_filename(Some("todo.txt")).is_ok());

        assert!(validate_markdown_filename(Some("report.pdf")).is_err());
        assert!(validate_markdown_filename(Some("NOTES.MD")).is_err());
        assert!(validate_markdown_filename(Some("")).is_err());
        assert!(validate_markdown_filename(None).is_err());
    }
}
