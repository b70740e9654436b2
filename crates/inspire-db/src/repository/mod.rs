//! # Repository Module
//!
//! Database repository implementations for Inspire Billing.
//!
//! ## Two Kinds of Methods
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  &self methods           run on the pool, one statement each           │
//! │  ├── get_by_id, items, recent, count ...                               │
//! │  └── insert (catalogue, customers, users)                              │
//! │                                                                         │
//! │  fn(conn: &mut SqliteConnection, ..)                                   │
//! │  └── run on a transaction owned by BillingService                      │
//! │      ├── ProductRepository::apply_stock_delta                          │
//! │      ├── InvoiceRepository::insert_invoice / insert_item               │
//! │      └── StockLogRepository::insert                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalogue and guarded stock changes
//! - [`CustomerRepository`](customer::CustomerRepository) - Invoice customers
//! - [`UserRepository`](user::UserRepository) - Invoice creators / stock actors
//! - [`InvoiceRepository`](invoice::InvoiceRepository) - Invoices and lines
//! - [`StockLogRepository`](stock::StockLogRepository) - Stock adjustment audit trail

pub mod customer;
pub mod invoice;
pub mod product;
pub mod stock;
pub mod user;
