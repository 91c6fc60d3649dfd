//! # Error Types
//!
//! Domain-specific error types for merch-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  merch-core errors (this file)                                         │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── CodecError       - CSV import/export failures                     │
//! │                                                                         │
//! │  merch-store errors (separate crate)                                   │
//! │  └── StoreError       - InsufficientStock, Conflict, NotFound, ...     │
//! │                                                                         │
//! │  merch-cache errors (separate crate)                                   │
//! │  └── CacheError       - logged and swallowed, never surfaced           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Errors are enum variants, never strings; each variant maps to a
//! user-facing message. Expected outcomes are values, not panics.

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These are raised before any store interaction; a request that fails
/// validation never reaches the network.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: &'static str },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: &'static str },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: &'static str },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: &'static str, min: i64, max: i64 },

    /// Subcategory does not belong to the category's allowed set.
    #[error("subcategory '{subcategory}' is not valid for category {category}")]
    IllegalSubcategory { subcategory: String, category: String },
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Codec Error
// =============================================================================

/// CSV import/export failures.
///
/// Row-level parse failures are NOT errors: the codec skips the row and
/// reports the skipped count. Only a malformed header (import) or a writer
/// failure (export) produce a `CodecError`.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Import header does not match the fixed contract.
    #[error("malformed CSV header: expected '{expected}', found '{found}'")]
    Header { expected: String, found: String },

    /// Export writer failed.
    #[error("CSV write failed: {0}")]
    Write(String),
}

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required { field: "name" };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::MustBePositive { field: "price" };
        assert_eq!(err.to_string(), "price must be positive");

        let err = ValidationError::IllegalSubcategory {
            subcategory: "vinyl".to_string(),
            category: "Clothing".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "subcategory 'vinyl' is not valid for category Clothing"
        );
    }

    #[test]
    fn test_codec_header_error_message() {
        let err = CodecError::Header {
            expected: "Name,Price".to_string(),
            found: "nope".to_string(),
        };
        assert!(err.to_string().contains("malformed CSV header"));
    }
}
