//! # inspire-core: Billing Rules for Inspire Shoes
//!
//! Everything the billing workflow decides without touching the database:
//! money arithmetic, invoice totals, access rules and input validation.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Inspire Billing Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            Web pages / session layer (outside this repo)        │   │
//! │  │    invoice form ──► stock page ──► invoice list status select   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ NewInvoice / StockAdjustment + Actor   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ inspire-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────┐ │   │
//! │  │   │  types   │ │  money   │ │ invoice  │ │validation│ │access│ │   │
//! │  │   │ Product  │ │  Money   │ │ totals   │ │  rules   │ │ Role │ │   │
//! │  │   │ Invoice  │ │ TaxRate  │ │ cart json│ │  limits  │ │Actor │ │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘ └──────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • PURE FUNCTIONS                         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  inspire-db (Database Layer)                    │   │
//! │  │     SQLite schema, repositories, transactional BillingService  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Invoice, StockLogEntry, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`invoice`] - Invoice request, totals, cart payload parsing
//! - [`access`] - Roles and who may do what
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use inspire_core::money::Money;
//! use inspire_core::types::TaxRate;
//!
//! let subtotal = Money::from_cents(250_000); // Rs. 2,500.00
//! let tax = subtotal.calculate_tax(TaxRate::default()); // 16%
//! assert_eq!(tax.cents(), 40_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod error;
pub mod invoice;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use access::{Actor, Role};
pub use error::{CoreError, CoreResult, ValidationError};
pub use invoice::{InvoiceTotals, NewInvoice, NewInvoiceLine, ValidatedInvoice};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default tax rate on the invoice form: 16%.
pub const DEFAULT_TAX_RATE_BPS: u32 = 1600;

/// Maximum lines on a single invoice.
pub const MAX_INVOICE_LINES: usize = 100;

/// Maximum quantity on one invoice line or stock adjustment.
///
/// Catches typos like 10000 instead of 10.
pub const MAX_ITEM_QUANTITY: i64 = 99_999;

/// Prefix of the display invoice number.
pub const INVOICE_PREFIX: &str = "INV-";
