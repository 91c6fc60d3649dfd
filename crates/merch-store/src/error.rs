//! # Store Error Types
//!
//! Error types for catalog, ledger, and coordinator operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  ValidationError (merch-core)   raised before any store interaction    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module)       typed, expected, user-facing outcomes  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UI layer renders a specific reason:                                   │
//! │    InsufficientStock → "only N left"                                   │
//! │    Conflict          → "busy, try again"                               │
//! │    AlreadyVoided     → "already processed"                             │
//! │    Transient         → "connection trouble, retry"                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `InsufficientStock`, `Conflict`, `NotFound`, and `AlreadyVoided` are
//! expected outcomes, not crashes. `Transient` is safe to retry at the
//! whole-operation level because every unit of work is all-or-nothing.

use thiserror::Error;

use merch_core::{Size, ValidationError};

/// Catalog, ledger, and coordinator errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Input rejected before any network interaction.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A sale would take more units than the size slot holds.
    #[error("insufficient stock for item {item_id} ({size}): available {available}, requested {requested}")]
    InsufficientStock {
        item_id: String,
        size: Size,
        available: i64,
        requested: i64,
    },

    /// Optimistic transaction lost its version race. The coordinator
    /// retries a bounded number of times before surfacing this; callers
    /// may re-issue the whole operation from fresh state.
    #[error("transaction conflict on document {id}")]
    Conflict { id: String },

    /// Referenced item or sale is missing.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Cancel requested on a sale that is no longer active. Idempotent
    /// rejection: no side effect.
    #[error("sale already processed: {sale_id}")]
    AlreadyVoided { sale_id: String },

    /// Network-level failure (timeout, connectivity). Safe to retry with
    /// backoff at the whole-operation level.
    #[error("transient store failure: {0}")]
    Transient(String),
}

impl StoreError {
    /// Creates a NotFound error for a given entity type and id.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        StoreError::NotFound { entity, id: id.into() }
    }

    /// True for version-race conflicts (retryable by the coordinator).
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = StoreError::InsufficientStock {
            item_id: "item-1".to_string(),
            size: Size::S,
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock for item item-1 (S): available 3, requested 5"
        );

        let err = StoreError::not_found("item", "item-9");
        assert_eq!(err.to_string(), "item not found: item-9");
    }

    #[test]
    fn test_validation_error_converts() {
        let err: StoreError = ValidationError::Required { field: "name" }.into();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn test_is_conflict() {
        assert!(StoreError::Conflict { id: "x".to_string() }.is_conflict());
        assert!(!StoreError::Transient("timeout".to_string()).is_conflict());
    }
}
