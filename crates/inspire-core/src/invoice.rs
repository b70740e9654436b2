//! # Invoice Math
//!
//! Turns a submitted cart into validated lines and frozen totals.
//!
//! ## Calculation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  line_total  = quantity × unit_price            (per line)             │
//! │  subtotal    = Σ line_total                                             │
//! │  tax_amount  = subtotal × tax_rate, half-up to the cent                │
//! │  grand_total = subtotal + tax_amount − discount                        │
//! │                                                                         │
//! │  Example: 2 × 1,000.00 + 1 × 500.00, 16% tax, 100.00 off               │
//! │    subtotal 2,500.00 │ tax 400.00 │ grand total 2,800.00               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Totals are computed once, here, and written with the invoice. Nothing
//! recomputes them afterwards.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::types::TaxRate;
use crate::validation::{
    validate_discount, validate_line_count, validate_notes, validate_price_cents,
    validate_product_name, validate_quantity, validate_reference, validate_tax_rate_bps,
    ValidationResult,
};

// =============================================================================
// Input
// =============================================================================

/// One cart line submitted for invoicing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewInvoiceLine {
    pub product_id: i64,
    /// Product name as shown in the cart; copied onto the invoice line.
    pub product_name: String,
    pub size: Option<String>,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

impl NewInvoiceLine {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    fn validate(&self) -> ValidationResult<()> {
        validate_reference("product", Some(self.product_id))?;
        validate_product_name(&self.product_name)?;
        validate_quantity(self.quantity)?;
        validate_price_cents(self.unit_price_cents)?;
        Ok(())
    }

    fn line_total(&self) -> ValidationResult<Money> {
        self.unit_price()
            .checked_multiply_quantity(self.quantity)
            .ok_or_else(|| amount_overflow("line total"))
    }
}

/// An invoice as submitted by the caller. Optional fields take shop defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewInvoice {
    pub customer_id: Option<i64>,
    pub items: Vec<NewInvoiceLine>,
    /// Defaults to 16%.
    pub tax_rate: Option<TaxRate>,
    /// Defaults to zero.
    pub discount: Option<Money>,
    pub notes: Option<String>,
}

impl NewInvoice {
    /// Validates the request and computes its totals.
    ///
    /// ## Errors
    /// `CoreError::Validation` when the customer is missing, there are no
    /// items, a line is malformed, or the discount/tax rate is out of range.
    pub fn validate(self) -> CoreResult<ValidatedInvoice> {
        let customer_id = validate_reference("customer", self.customer_id)?;
        validate_line_count(self.items.len())?;
        for line in &self.items {
            line.validate()?;
        }

        let notes = validate_notes(self.notes.as_deref())?;
        let totals = InvoiceTotals::compute(
            &self.items,
            self.tax_rate.unwrap_or_default(),
            self.discount.unwrap_or_default(),
        )?;

        Ok(ValidatedInvoice {
            customer_id,
            lines: self.items,
            totals,
            notes,
        })
    }
}

/// A request that passed validation, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedInvoice {
    pub customer_id: i64,
    pub lines: Vec<NewInvoiceLine>,
    pub totals: InvoiceTotals,
    pub notes: Option<String>,
}

impl ValidatedInvoice {
    /// Units requested per product, summed across lines, in first-seen order.
    pub fn quantities_by_product(&self) -> Vec<(i64, i64)> {
        let mut demand: Vec<(i64, i64)> = Vec::new();
        for line in &self.lines {
            match demand.iter_mut().find(|(id, _)| *id == line.product_id) {
                Some((_, qty)) => *qty += line.quantity,
                None => demand.push((line.product_id, line.quantity)),
            }
        }
        demand
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Frozen monetary totals of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceTotals {
    pub subtotal: Money,
    pub tax_rate: TaxRate,
    pub tax_amount: Money,
    pub discount: Money,
    pub grand_total: Money,
}

impl InvoiceTotals {
    /// Computes subtotal, tax and grand total for a set of lines.
    ///
    /// ## Example
    /// ```rust
    /// use inspire_core::invoice::{InvoiceTotals, NewInvoiceLine};
    /// use inspire_core::{Money, TaxRate};
    ///
    /// let lines = vec![NewInvoiceLine {
    ///     product_id: 1,
    ///     product_name: "Court Classic".into(),
    ///     size: Some("42".into()),
    ///     quantity: 2,
    ///     unit_price_cents: 100_000,
    /// }];
    /// let totals = InvoiceTotals::compute(&lines, TaxRate::from_bps(1600), Money::zero()).unwrap();
    /// assert_eq!(totals.tax_amount.cents(), 32_000);
    /// assert_eq!(totals.grand_total.cents(), 232_000);
    /// ```
    ///
    /// ## Errors
    /// - tax rate above 100%
    /// - negative discount, or a discount larger than subtotal + tax
    /// - amounts that overflow
    pub fn compute(
        lines: &[NewInvoiceLine],
        tax_rate: TaxRate,
        discount: Money,
    ) -> ValidationResult<InvoiceTotals> {
        validate_tax_rate_bps(tax_rate.bps())?;
        validate_discount(discount)?;

        let mut subtotal = Money::zero();
        for line in lines {
            subtotal = subtotal
                .checked_add(line.line_total()?)
                .ok_or_else(|| amount_overflow("subtotal"))?;
        }

        let tax_amount = subtotal.calculate_tax(tax_rate);
        let gross = subtotal
            .checked_add(tax_amount)
            .ok_or_else(|| amount_overflow("grand total"))?;

        if discount > gross {
            return Err(ValidationError::OutOfRange {
                field: "discount".to_string(),
                min: 0,
                max: gross.cents(),
            });
        }

        Ok(InvoiceTotals {
            subtotal,
            tax_rate,
            tax_amount,
            discount,
            grand_total: gross - discount,
        })
    }
}

fn amount_overflow(field: &str) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: i64::MAX,
    }
}

// =============================================================================
// Cart Payload
// =============================================================================

/// Cart entry as serialized by the invoice page script.
#[derive(Debug, Deserialize)]
struct CartEntry {
    id: i64,
    name: String,
    #[serde(default)]
    size: Option<String>,
    quantity: i64,
    /// Decimal rupees, e.g. `1000.5`.
    price: f64,
}

/// Parses the `cart_items` JSON posted by the invoice page.
///
/// The payload is `[{"id":1,"name":"...","size":"42","quantity":2,"price":1000.0}]`.
/// Prices arrive as decimal rupees and are rounded to the nearest paisa.
///
/// ## Example
/// ```rust
/// use inspire_core::invoice::parse_cart_items;
///
/// let lines = parse_cart_items(r#"[{"id":4,"name":"Trail X","size":"41","quantity":1,"price":499.99}]"#).unwrap();
/// assert_eq!(lines[0].unit_price_cents, 49_999);
/// ```
pub fn parse_cart_items(json: &str) -> ValidationResult<Vec<NewInvoiceLine>> {
    let entries: Vec<CartEntry> =
        serde_json::from_str(json).map_err(|e| ValidationError::InvalidFormat {
            field: "cart_items".to_string(),
            reason: e.to_string(),
        })?;

    entries
        .into_iter()
        .map(|entry| {
            if !entry.price.is_finite() {
                return Err(ValidationError::InvalidFormat {
                    field: "price".to_string(),
                    reason: "must be a number".to_string(),
                });
            }
            Ok(NewInvoiceLine {
                product_id: entry.id,
                product_name: entry.name.trim().to_string(),
                size: entry.size.filter(|s| !s.trim().is_empty()),
                quantity: entry.quantity,
                unit_price_cents: (entry.price * 100.0).round() as i64,
            })
        })
        .collect()
}

// =============================================================================
// Invoice Number
// =============================================================================

/// Formats an invoice id for display: `INV-` and six zero-padded digits.
///
/// ## Example
/// ```rust
/// use inspire_core::invoice::invoice_number;
///
/// assert_eq!(invoice_number(42), "INV-000042");
/// assert_eq!(invoice_number(1234567), "INV-1234567");
/// ```
pub fn invoice_number(id: i64) -> String {
    format!("{}{:06}", crate::INVOICE_PREFIX, id)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    fn line(product_id: i64, quantity: i64, unit_price_cents: i64) -> NewInvoiceLine {
        NewInvoiceLine {
            product_id,
            product_name: format!("Product {product_id}"),
            size: Some("42".to_string()),
            quantity,
            unit_price_cents,
        }
    }

    #[test]
    fn test_reference_scenario_totals() {
        let lines = vec![line(1, 2, 100_000), line(2, 1, 50_000)];
        let totals =
            InvoiceTotals::compute(&lines, TaxRate::from_bps(1600), Money::from_cents(10_000))
                .unwrap();

        assert_eq!(totals.subtotal.cents(), 250_000);
        assert_eq!(totals.tax_amount.cents(), 40_000);
        assert_eq!(totals.grand_total.cents(), 280_000);
    }

    #[test]
    fn test_grand_total_identity_holds() {
        let cases = [
            (vec![line(1, 3, 333)], 1600, 0),
            (vec![line(1, 1, 1), line(2, 7, 999)], 825, 50),
            (vec![line(1, 9, 12_345)], 0, 12_345),
            (vec![line(1, 1, 0)], 1600, 0),
        ];

        for (lines, bps, discount) in cases {
            let totals = InvoiceTotals::compute(
                &lines,
                TaxRate::from_bps(bps),
                Money::from_cents(discount),
            )
            .unwrap();
            let expected_subtotal: Money = lines
                .iter()
                .map(|l| l.unit_price().multiply_quantity(l.quantity))
                .sum();

            assert_eq!(totals.subtotal, expected_subtotal);
            assert_eq!(
                totals.grand_total,
                totals.subtotal + totals.tax_amount - totals.discount
            );
        }
    }

    #[test]
    fn test_tax_is_rounded_half_up() {
        // 1 × 0.03 at 16% = 0.0048 → 0.00; 1 × 0.04 at 12.5% = 0.005 → 0.01
        let totals =
            InvoiceTotals::compute(&[line(1, 1, 3)], TaxRate::from_bps(1600), Money::zero())
                .unwrap();
        assert_eq!(totals.tax_amount.cents(), 0);

        let totals =
            InvoiceTotals::compute(&[line(1, 1, 4)], TaxRate::from_bps(1250), Money::zero())
                .unwrap();
        assert_eq!(totals.tax_amount.cents(), 1);
    }

    #[test]
    fn test_discount_bounds() {
        let lines = vec![line(1, 1, 1000)];
        assert!(InvoiceTotals::compute(&lines, TaxRate::zero(), Money::from_cents(-1)).is_err());
        assert!(InvoiceTotals::compute(&lines, TaxRate::zero(), Money::from_cents(1001)).is_err());

        let totals =
            InvoiceTotals::compute(&lines, TaxRate::zero(), Money::from_cents(1000)).unwrap();
        assert!(totals.grand_total.is_zero());
    }

    #[test]
    fn test_overflow_is_rejected() {
        let lines = vec![line(1, 2, i64::MAX / 2 + 1)];
        assert!(InvoiceTotals::compute(&lines, TaxRate::zero(), Money::zero()).is_err());
    }

    #[test]
    fn test_validate_applies_defaults() {
        let invoice = NewInvoice {
            customer_id: Some(3),
            items: vec![line(1, 1, 10_000)],
            notes: Some("  ".to_string()),
            ..Default::default()
        };

        let validated = invoice.validate().unwrap();
        assert_eq!(validated.customer_id, 3);
        assert_eq!(validated.totals.tax_rate.bps(), 1600);
        assert_eq!(validated.totals.tax_amount.cents(), 1_600);
        assert!(validated.totals.discount.is_zero());
        assert_eq!(validated.notes, None);
    }

    #[test]
    fn test_validate_rejects_missing_customer_and_empty_items() {
        let no_customer = NewInvoice {
            items: vec![line(1, 1, 100)],
            ..Default::default()
        };
        assert!(matches!(
            no_customer.validate(),
            Err(CoreError::Validation(ValidationError::Required { .. }))
        ));

        let no_items = NewInvoice {
            customer_id: Some(1),
            ..Default::default()
        };
        assert!(matches!(
            no_items.validate(),
            Err(CoreError::Validation(ValidationError::Required { .. }))
        ));
    }

    #[test]
    fn test_quantities_by_product_sums_repeated_lines() {
        let validated = NewInvoice {
            customer_id: Some(1),
            items: vec![line(7, 6, 100), line(3, 1, 100), line(7, 6, 120)],
            ..Default::default()
        }
        .validate()
        .unwrap();

        assert_eq!(validated.quantities_by_product(), vec![(7, 12), (3, 1)]);
    }

    #[test]
    fn test_validate_rejects_bad_lines() {
        for bad in [line(1, 0, 100), line(1, 1, -5), line(0, 1, 100)] {
            let invoice = NewInvoice {
                customer_id: Some(1),
                items: vec![line(2, 1, 100), bad],
                ..Default::default()
            };
            assert!(invoice.validate().is_err());
        }
    }

    #[test]
    fn test_parse_cart_items() {
        let json = r#"[
            {"id": 1, "name": " Court Classic ", "size": "42", "quantity": 2, "price": 1000},
            {"id": 2, "name": "Slide", "size": "", "quantity": 1, "price": 500.5}
        ]"#;

        let lines = parse_cart_items(json).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].product_name, "Court Classic");
        assert_eq!(lines[0].unit_price_cents, 100_000);
        assert_eq!(lines[1].size, None);
        assert_eq!(lines[1].unit_price_cents, 50_050);
    }

    #[test]
    fn test_parse_cart_items_rejects_garbage() {
        assert!(matches!(
            parse_cart_items("not json"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(parse_cart_items(r#"[{"id": 1}]"#).is_err());
        assert!(parse_cart_items("[]").unwrap().is_empty());
    }

    #[test]
    fn test_invoice_number() {
        assert_eq!(invoice_number(1), "INV-000001");
        assert_eq!(invoice_number(999_999), "INV-999999");
    }
}
