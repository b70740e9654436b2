//! # Validation Module
//!
//! Input validation for the write operations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Browser (cart script, form `required`/`min` attributes)      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - checked before any transaction is opened       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                       │
//! │  ├── CHECK (stock_qty >= 0), CHECK (quantity > 0)                      │
//! │  └── Foreign keys (customer, product, user)                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_INVOICE_LINES, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_REASON_LEN: usize = 255;
const MAX_NOTES_LEN: usize = 1000;

// =============================================================================
// Reference Validators
// =============================================================================

/// Validates that a row reference was supplied.
///
/// Form fields that fail to parse arrive as `None`; ids are always positive.
///
/// ## Example
/// ```rust
/// use inspire_core::validation::validate_reference;
///
/// assert_eq!(validate_reference("customer", Some(3)).unwrap(), 3);
/// assert!(validate_reference("customer", None).is_err());
/// assert!(validate_reference("customer", Some(0)).is_err());
/// ```
pub fn validate_reference(field: &str, id: Option<i64>) -> ValidationResult<i64> {
    match id {
        Some(id) if id > 0 => Ok(id),
        _ => Err(ValidationError::required(field)),
    }
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name (as snapshotted onto an invoice line).
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required("product name"));
    }

    if name.len() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "product name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates the reason for a stock adjustment.
///
/// ## Returns
/// The trimmed reason. Blank input is rejected.
pub fn validate_reason(reason: &str) -> ValidationResult<String> {
    let reason = reason.trim();

    if reason.is_empty() {
        return Err(ValidationError::required("reason"));
    }

    if reason.len() > MAX_REASON_LEN {
        return Err(ValidationError::TooLong {
            field: "reason".to_string(),
            max: MAX_REASON_LEN,
        });
    }

    Ok(reason.to_string())
}

/// Normalizes optional invoice notes: trimmed, empty becomes `None`.
pub fn validate_notes(notes: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(notes) = notes.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };

    if notes.len() > MAX_NOTES_LEN {
        return Err(ValidationError::TooLong {
            field: "notes".to_string(),
            max: MAX_NOTES_LEN,
        });
    }

    Ok(Some(notes.to_string()))
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity (invoice line or stock adjustment).
///
/// ## Rules
/// - Must be at least 1
/// - Must not exceed MAX_ITEM_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a unit price in cents. Zero is allowed (free items).
///
/// ## Example
/// ```rust
/// use inspire_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(100_000).is_ok());
/// assert!(validate_price_cents(0).is_ok());
/// assert!(validate_price_cents(-1).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a discount amount. Must not be negative.
pub fn validate_discount(discount: Money) -> ValidationResult<()> {
    if discount.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the number of lines on an invoice.
///
/// ## Rules
/// - At least one line
/// - At most MAX_INVOICE_LINES
pub fn validate_line_count(lines: usize) -> ValidationResult<()> {
    if lines == 0 {
        return Err(ValidationError::required("items"));
    }

    if lines > MAX_INVOICE_LINES {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_INVOICE_LINES as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_reference() {
        assert_eq!(validate_reference("product", Some(1)).unwrap(), 1);
        assert!(validate_reference("product", Some(-4)).is_err());
        assert!(matches!(
            validate_reference("customer", None),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_validate_reason() {
        assert_eq!(validate_reason("  damaged  ").unwrap(), "damaged");
        assert!(validate_reason("").is_err());
        assert!(validate_reason("   ").is_err());
        assert!(validate_reason(&"x".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_notes() {
        assert_eq!(validate_notes(None).unwrap(), None);
        assert_eq!(validate_notes(Some("   ")).unwrap(), None);
        assert_eq!(
            validate_notes(Some(" deliver Friday ")).unwrap(),
            Some("deliver Friday".to_string())
        );
        assert!(validate_notes(Some(&"n".repeat(1001))).is_err());
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Runner Pro").is_ok());
        assert!(validate_product_name(" ").is_err());
        assert!(validate_product_name(&"A".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_discount() {
        assert!(validate_discount(Money::zero()).is_ok());
        assert!(validate_discount(Money::from_cents(10_000)).is_ok());
        assert!(validate_discount(Money::from_cents(-1)).is_err());
    }

    #[test]
    fn test_validate_tax_rate_bps() {
        assert!(validate_tax_rate_bps(0).is_ok());
        assert!(validate_tax_rate_bps(1600).is_ok());
        assert!(validate_tax_rate_bps(10000).is_ok());
        assert!(validate_tax_rate_bps(10001).is_err());
    }

    #[test]
    fn test_validate_line_count() {
        assert!(validate_line_count(1).is_ok());
        assert!(validate_line_count(0).is_err());
        assert!(validate_line_count(MAX_INVOICE_LINES + 1).is_err());
    }
}
