//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        actual: i64,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: i64, max: i64, actual: i64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    EmptyField,
    OutOfRange,
    InvalidFormat,

    // Redemption rejections
    CodeNotFound,
    CodeAlreadyUsed,
    CodeExpired,
    AlreadyRedeemedByUser,
    ProductMismatch,
    RedemptionDisabled,

    // Infrastructure errors
    DatabaseError,
    ExternalServiceError,
    Timeout,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::EmptyField => "EMPTY_FIELD",
            ErrorCode::OutOfRange => "OUT_OF_RANGE",
            ErrorCode::InvalidFormat => "INVALID_FORMAT",
            ErrorCode::CodeNotFound => "CODE_NOT_FOUND",
            ErrorCode::CodeAlreadyUsed => "CODE_ALREADY_USED",
            ErrorCode::CodeExpired => "CODE_EXPIRED",
            ErrorCode::AlreadyRedeemedByUser => "ALREADY_REDEEMED_BY_USER",
            ErrorCode::ProductMismatch => "PRODUCT_MISMATCH",
            ErrorCode::RedemptionDisabled => "REDEMPTION_DISABLED",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::ExternalServiceError => "EXTERNAL_SERVICE_ERROR",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
///
/// Ports return this type; application handlers translate it into their own
/// error taxonomy.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a validation error for a specific field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::ValidationFailed,
            message: message.into(),
            details: HashMap::new(),
        }
        .with_detail("field", field.into())
    }

    /// Shorthand for a persistence failure.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        let code = match &err {
            ValidationError::EmptyField { .. } => ErrorCode::EmptyField,
            ValidationError::OutOfRange { .. } => ErrorCode::OutOfRange,
            ValidationError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
        };
        DomainError::new(code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_empty_field_displays_correctly() {
        let err = ValidationError::empty_field("code");
        assert_eq!(format!("{}", err), "Field 'code' cannot be empty");
    }

    #[test]
    fn validation_error_out_of_range_displays_correctly() {
        let err = ValidationError::out_of_range("duration_days", 1, 3650, 0);
        assert_eq!(
            format!("{}", err),
            "Field 'duration_days' must be between 1 and 3650, got 0"
        );
    }

    #[test]
    fn domain_error_displays_code_and_message() {
        let err = DomainError::new(ErrorCode::CodeNotFound, "Code not found");
        assert_eq!(format!("{}", err), "[CODE_NOT_FOUND] Code not found");
    }

    #[test]
    fn domain_error_with_detail_adds_detail() {
        let err = DomainError::database("insert failed").with_detail("table", "redemption_records");

        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(
            err.details.get("table"),
            Some(&"redemption_records".to_string())
        );
    }

    #[test]
    fn validation_error_converts_with_matching_code() {
        let err: DomainError = ValidationError::invalid_format("code", "bad").into();
        assert_eq!(err.code, ErrorCode::InvalidFormat);
    }

    #[test]
    fn error_code_display_formats_correctly() {
        assert_eq!(
            format!("{}", ErrorCode::AlreadyRedeemedByUser),
            "ALREADY_REDEEMED_BY_USER"
        );
        assert_eq!(format!("{}", ErrorCode::Timeout), "TIMEOUT");
    }

    #[test]
    fn every_error_code_has_a_distinct_wire_name() {
        let all = [
            ErrorCode::ValidationFailed,
            ErrorCode::EmptyField,
            ErrorCode::OutOfRange,
            ErrorCode::InvalidFormat,
            ErrorCode::CodeNotFound,
            ErrorCode::CodeAlreadyUsed,
            ErrorCode::CodeExpired,
            ErrorCode::AlreadyRedeemedByUser,
            ErrorCode::ProductMismatch,
            ErrorCode::RedemptionDisabled,
            ErrorCode::DatabaseError,
            ErrorCode::ExternalServiceError,
            ErrorCode::Timeout,
            ErrorCode::InternalError,
        ];
        let names: std::collections::HashSet<String> =
            all.iter().map(|code| code.to_string()).collect();
        assert_eq!(names.len(), all.len());
        assert!(!names.contains("INVALID_STATE_TRANSITION"));
    }
}
