//! # Service Errors
//!
//! What callers of [`BillingService`](super::BillingService) receive.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ValidationError ──► CoreError ──┐                                     │
//! │                                  ├──► ServiceError ──► ErrorReport     │
//! │  sqlx::Error ─────► DbError ─────┘        │              (kind,        │
//! │                                           │               message)     │
//! │                                      kind() ──► page picks a flash     │
//! │                                                  message / status      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialization
//! ```json
//! { "kind": "INSUFFICIENT_STOCK",
//!   "message": "Insufficient stock for product 7: available 15, requested 20" }
//! ```

use serde::Serialize;
use thiserror::Error;

use crate::error::DbError;
use inspire_core::{CoreError, ValidationError};

/// Failure of a billing operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Rejected by a business rule. Nothing was written.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The store failed. Any partial writes were rolled back.
    #[error(transparent)]
    Persistence(#[from] DbError),
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Core(err.into())
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Persistence(err.into())
    }
}

/// Broad category of a [`ServiceError`], for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Bad or missing input, unknown product or customer.
    Validation,
    /// The actor's role or ownership does not allow the operation.
    Authorization,
    /// A stock decrement would go below zero.
    InsufficientStock,
    /// The invoice addressed by the call does not exist.
    NotFound,
    /// The store failed mid-operation.
    Persistence,
}

/// Structured failure handed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
}

impl ServiceError {
    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Core(err) => match err {
                CoreError::Validation(_)
                | CoreError::ProductNotFound(_)
                | CoreError::CustomerNotFound(_) => ErrorKind::Validation,
                CoreError::Unauthorized { .. } => ErrorKind::Authorization,
                CoreError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
                CoreError::InvoiceNotFound(_) => ErrorKind::NotFound,
            },
            ServiceError::Persistence(_) => ErrorKind::Persistence,
        }
    }

    /// Builds the caller-facing report.
    ///
    /// Rule failures carry their own message. Store failures are logged in
    /// full and reported generically.
    pub fn report(&self) -> ErrorReport {
        let message = match self {
            ServiceError::Core(err) => err.to_string(),
            ServiceError::Persistence(err) => {
                tracing::error!(error = %err, "Database operation failed");
                "Database operation failed".to_string()
            }
        };

        ErrorReport {
            kind: self.kind(),
            message,
        }
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let cases: Vec<(ServiceError, ErrorKind)> = vec![
            (ValidationError::required("customer").into(), ErrorKind::Validation),
            (CoreError::ProductNotFound(3).into(), ErrorKind::Validation),
            (CoreError::CustomerNotFound(4).into(), ErrorKind::Validation),
            (CoreError::unauthorized("adjust stock").into(), ErrorKind::Authorization),
            (
                CoreError::InsufficientStock {
                    product_id: 1,
                    available: 0,
                    requested: 1,
                }
                .into(),
                ErrorKind::InsufficientStock,
            ),
            (CoreError::InvoiceNotFound(9).into(), ErrorKind::NotFound),
            (DbError::PoolExhausted.into(), ErrorKind::Persistence),
        ];

        for (err, kind) in cases {
            assert_eq!(err.kind(), kind, "{err}");
        }
    }

    #[test]
    fn test_report_serialization() {
        let err: ServiceError = CoreError::InsufficientStock {
            product_id: 7,
            available: 15,
            requested: 20,
        }
        .into();

        let json = serde_json::to_value(err.report()).unwrap();
        assert_eq!(json["kind"], "INSUFFICIENT_STOCK");
        assert_eq!(
            json["message"],
            "Insufficient stock for product 7: available 15, requested 20"
        );
    }

    #[test]
    fn test_persistence_report_hides_details() {
        let err: ServiceError = DbError::QueryFailed("near \"SELEC\": syntax error".into()).into();
        let report = err.report();
        assert_eq!(report.kind, ErrorKind::Persistence);
        assert_eq!(report.message, "Database operation failed");
    }
}
