//! # Error Types
//!
//! Domain-specific error types for inspire-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  inspire-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule failures                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  inspire-db errors (separate crate)                                    │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── ServiceError     - What callers see (kind + message)              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError ─┐                                  │
//! │                       sqlx::Error → DbError ─┴→ ServiceError → caller  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product, quantity, status)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Actor lacks the role or ownership required for the operation.
    #[error("Not authorized to {action}")]
    Unauthorized { action: String },

    /// A stock decrement would drive the quantity below zero.
    ///
    /// ## When This Occurs
    /// - Manual subtract adjustment larger than current stock
    /// - Invoice line quantity larger than current stock
    ///
    /// ## User Workflow
    /// ```text
    /// Adjust Stock (subtract 20, "damaged")
    ///      │
    ///      ▼
    /// Read stock: available=15
    ///      │
    ///      ▼
    /// InsufficientStock { product_id: 7, available: 15, requested: 20 }
    ///      │
    ///      ▼
    /// Page shows: "Cannot subtract more than current stock (15 units)"
    /// ```
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: i64,
        available: i64,
        requested: i64,
    },

    /// Product reference does not resolve.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// Customer reference does not resolve.
    #[error("Customer not found: {0}")]
    CustomerNotFound(i64),

    /// Invoice not found.
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(i64),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an Unauthorized error for the named action.
    pub fn unauthorized(action: impl Into<String>) -> Self {
        CoreError::Unauthorized {
            action: action.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These are detected before any transaction is opened.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed cart payload).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    /// Creates a Required error for a field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
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
            product_id: 7,
            available: 15,
            requested: 20,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product 7: available 15, requested 20"
        );

        let err = CoreError::unauthorized("adjust stock");
        assert_eq!(err.to_string(), "Not authorized to adjust stock");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::required("reason");
        assert_eq!(err.to_string(), "reason is required");

        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("customer").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
