//! # Error Types
//!
//! Domain-specific error types for brecho-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                 │
//! │                                                                     │
//! │  brecho-core errors (this file)                                     │
//! │  ├── CoreError        - Domain rule violations                      │
//! │  └── ValidationError  - Input validation failures                   │
//! │                                                                     │
//! │  Collaborator errors (outside this crate)                           │
//! │  └── persistence / presentation wrap CoreError for their callers    │
//! │                                                                     │
//! │  Flow: ValidationError → CoreError → collaborator → user message    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (item id, counts, status)
//! 3. Errors are enum variants, never String
//! 4. Every failure leaves core state unchanged; the error is the whole story

use thiserror::Error;

use crate::types::DeliveryStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These represent business rule violations or unknown identifiers. They are
/// returned to the immediate caller; the core never retries or swallows them.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Item id is not present in the catalog.
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Sale id is not present in the open set or the shipped pool.
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// The sale exists but carries no line for the given item.
    #[error("Sale {sale_id} has no line for item {item_id}")]
    LineNotFound { sale_id: String, item_id: String },

    /// Requested reservation exceeds unreserved on-hand stock.
    ///
    /// ## When This Occurs
    /// - A sale line asks for more units than the item has on hand
    /// - Another open sale already holds part of the stock
    #[error("Insufficient stock for item {item_id}: available {available}, requested {requested}")]
    InsufficientStock {
        item_id: String,
        available: i64,
        requested: i64,
    },

    /// Delivery record is not in a state that allows the requested operation.
    ///
    /// ## When This Occurs
    /// - Confirming shipment without a scheduled date
    /// - Confirming delivery before shipment
    /// - Cancelling or deleting an already delivered record
    #[error("Delivery for sale {sale_id} is {status:?}, cannot {operation}")]
    InvalidDeliveryStatus {
        sale_id: String,
        status: DeliveryStatus,
        operation: &'static str,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when caller input does not meet requirements, before any
/// business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// A required collection is empty (e.g. a sale with no lines).
    #[error("{field} must not be empty")]
    Empty { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Monetary value is negative where only zero or more is allowed.
    #[error("{field} must not be negative")]
    NegativeAmount { field: String },

    /// Date lies in the past where today or later is required.
    #[error("{field} must not be in the past")]
    PastDate { field: String },

    /// Duplicate value (e.g. staging the same item twice).
    #[error("{field} '{value}' already present")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            item_id: "jacket-01".to_string(),
            available: 1,
            requested: 3,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for item jacket-01: available 1, requested 3"
        );
    }

    #[test]
    fn test_delivery_status_error_message() {
        let err = CoreError::InvalidDeliveryStatus {
            sale_id: "s-1".to_string(),
            status: DeliveryStatus::Pending,
            operation: "confirm shipment",
        };
        assert_eq!(
            err.to_string(),
            "Delivery for sale s-1 is Pending, cannot confirm shipment"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::Empty {
            field: "lines".to_string(),
        };
        assert_eq!(err.to_string(), "lines must not be empty");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::NegativeAmount {
            field: "freight".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
