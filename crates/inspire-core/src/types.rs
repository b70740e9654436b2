//! # Domain Types
//!
//! Core domain types used throughout the billing system.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    Invoice      │   │  InvoiceItem    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──┼── (by item)     │   │  invoice_id(FK) │       │
//! │  │  name/brand/... │   │  customer_id    │   │  product_id     │       │
//! │  │  price_cents    │   │  totals (cents) │   │  name snapshot  │       │
//! │  │  stock_qty ≥ 0  │   │  status         │   │  line_total     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ StockLogEntry   │   │ InvoiceStatus   │   │ AdjustmentType  │       │
//! │  │  before/after   │   │  Unpaid         │   │  add            │       │
//! │  │  reason, actor  │   │  Paid           │   │  subtract       │       │
//! │  │  (append-only)  │   │  Cancelled      │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::access::Role;
use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 1600 bps = 16.00% (the shop's default GST).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage as typed into the invoice form.
    ///
    /// Precision beyond two decimals is rounded to the nearest basis point.
    /// Negative input clamps to zero; range checks belong to validation.
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round().max(0.0) as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

/// The invoice form defaults to 16%.
impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::from_bps(crate::DEFAULT_TAX_RATE_BPS)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalogue.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    /// Selling price in cents.
    pub price_cents: i64,
    /// Purchase (cost) price in cents.
    pub purchase_price_cents: Option<i64>,
    /// Units on hand. Never negative; only changed by invoices and adjustments.
    pub stock_qty: i64,
    pub supplier_name: Option<String>,
    pub supplier_phone: Option<String>,
    /// Stored file name of the uploaded picture.
    pub image_path: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Returns the selling price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// Fields for inserting a product. `stock_qty` here is the opening stock.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub price_cents: i64,
    pub purchase_price_cents: Option<i64>,
    pub stock_qty: i64,
    pub supplier_name: Option<String>,
    pub supplier_phone: Option<String>,
    pub image_path: Option<String>,
}

// =============================================================================
// Customer & User
// =============================================================================

/// A customer an invoice is billed to.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: i64,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Fields for inserting a customer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCustomer {
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// A shop user. Credentials live with the login layer, not here.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub full_name: Option<String>,
    pub role: Role,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Fields for inserting a user.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewUser {
    pub username: String,
    pub full_name: Option<String>,
    pub role: Role,
}

// =============================================================================
// Invoice Status
// =============================================================================

/// Payment status of an invoice. Stored as `Unpaid`, `Paid`, `Cancelled`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum InvoiceStatus {
    #[default]
    Unpaid,
    Paid,
    Cancelled,
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 3] = [
        InvoiceStatus::Unpaid,
        InvoiceStatus::Paid,
        InvoiceStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Unpaid => "Unpaid",
            InvoiceStatus::Paid => "Paid",
            InvoiceStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InvoiceStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: InvoiceStatus::ALL.iter().map(|s| s.to_string()).collect(),
            })
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// A persisted invoice. Totals are frozen at creation.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Invoice {
    pub id: i64,
    pub customer_id: i64,
    /// User who created the invoice.
    pub user_id: i64,
    pub subtotal_cents: i64,
    pub tax_rate_bps: u32,
    pub tax_amount_cents: i64,
    pub discount_cents: i64,
    pub grand_total_cents: i64,
    pub status: InvoiceStatus,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    #[inline]
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }

    #[inline]
    pub fn tax_amount(&self) -> Money {
        Money::from_cents(self.tax_amount_cents)
    }

    #[inline]
    pub fn discount(&self) -> Money {
        Money::from_cents(self.discount_cents)
    }

    #[inline]
    pub fn grand_total(&self) -> Money {
        Money::from_cents(self.grand_total_cents)
    }

    /// Display number, e.g. `INV-000042`.
    pub fn number(&self) -> String {
        crate::invoice::invoice_number(self.id)
    }
}

/// A line on an invoice.
/// Name and size are snapshots taken when the invoice was written, so later
/// product edits do not rewrite what was sold.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct InvoiceItem {
    pub id: i64,
    pub invoice_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub size: Option<String>,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

impl InvoiceItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Stock Adjustment
// =============================================================================

/// Direction of a manual stock adjustment. Stored as `add` / `subtract`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentType {
    Add,
    Subtract,
}

impl AdjustmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentType::Add => "add",
            AdjustmentType::Subtract => "subtract",
        }
    }
}

impl fmt::Display for AdjustmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdjustmentType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "add" => Ok(AdjustmentType::Add),
            "subtract" => Ok(AdjustmentType::Subtract),
            _ => Err(ValidationError::NotAllowed {
                field: "adjustment_type".to_string(),
                allowed: vec!["add".to_string(), "subtract".to_string()],
            }),
        }
    }
}

/// A requested manual stock change, as submitted from the stock page.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockAdjustment {
    pub product_id: i64,
    pub adjustment_type: AdjustmentType,
    pub quantity: i64,
    pub reason: String,
}

/// One row of the append-only stock audit log.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockLogEntry {
    pub id: i64,
    pub product_id: i64,
    /// Actor who made the adjustment.
    pub user_id: i64,
    pub adjustment_type: AdjustmentType,
    pub quantity: i64,
    pub reason: String,
    pub stock_before: i64,
    pub stock_after: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_percentage() {
        assert_eq!(TaxRate::from_percentage(16.0).bps(), 1600);
        assert_eq!(TaxRate::from_percentage(8.25).bps(), 825);
        assert_eq!(TaxRate::from_percentage(-3.0).bps(), 0);
        assert!((TaxRate::from_bps(1600).percentage() - 16.0).abs() < 0.001);
    }

    #[test]
    fn test_tax_rate_default_is_sixteen_percent() {
        assert_eq!(TaxRate::default().bps(), 1600);
    }

    #[test]
    fn test_invoice_status_parse() {
        assert_eq!("Paid".parse::<InvoiceStatus>().unwrap(), InvoiceStatus::Paid);
        assert_eq!(" Unpaid ".parse::<InvoiceStatus>().unwrap(), InvoiceStatus::Unpaid);
        assert!("paid".parse::<InvoiceStatus>().is_err());
        assert_eq!(InvoiceStatus::default(), InvoiceStatus::Unpaid);
    }

    #[test]
    fn test_adjustment_type_parse() {
        assert_eq!("add".parse::<AdjustmentType>().unwrap(), AdjustmentType::Add);
        assert_eq!(
            "subtract".parse::<AdjustmentType>().unwrap(),
            AdjustmentType::Subtract
        );
        assert!(matches!(
            "remove".parse::<AdjustmentType>(),
            Err(ValidationError::NotAllowed { .. })
        ));
    }

    #[test]
    fn test_stock_adjustment_from_form_json() {
        let adj: StockAdjustment = serde_json::from_str(
            r#"{"product_id": 7, "adjustment_type": "subtract", "quantity": 20, "reason": "damaged"}"#,
        )
        .unwrap();
        assert_eq!(adj.adjustment_type, AdjustmentType::Subtract);
        assert_eq!(adj.quantity, 20);

        let bad = serde_json::from_str::<StockAdjustment>(
            r#"{"product_id": 7, "adjustment_type": "remove", "quantity": 1, "reason": "x"}"#,
        );
        assert!(bad.is_err());
    }
}
