//! # inspire-db: Database Layer for Inspire Billing
//!
//! SQLite storage for the billing workflow, through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Inspire Billing Data Flow                          │
//! │                                                                         │
//! │  Request handler (invoice form POST, stock form POST)                  │
//! │       │  NewInvoice / StockAdjustment + Actor                          │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     inspire-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │BillingService │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │ (service/)    │───►│ (repository/) │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ create_invoice│    │ ProductRepo   │    │ 001_initial_ │  │   │
//! │  │   │ adjust_stock  │    │ InvoiceRepo   │    │   schema.sql │  │   │
//! │  │   │ update_status │    │ StockLogRepo  │    │              │  │   │
//! │  │   └───────┬───────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │           └────────┬───────────┘                               │   │
//! │  │                    ▼                                           │   │
//! │  │             Database (pool.rs) ◄── DbConfig (config.rs)        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (WAL)                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - `DbConfig` builder and `INSPIRE_DB_*` environment loading
//! - [`pool`] - Connection pool and the `Database` handle
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Per-table access
//! - [`service`] - Transactional writes and caller-facing errors
//!
//! ## Usage
//!
//! ```rust,ignore
//! use inspire_core::{Actor, NewInvoice};
//! use inspire_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::from_env()?).await?;
//!
//! match db.billing().create_invoice(request, &actor).await {
//!     Ok(id) => redirect_to_invoice(id),
//!     Err(err) => render_form_with(err.report()),
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, DbConfig};
pub use error::{DbError, DbResult};
pub use pool::Database;
pub use service::{BillingService, ErrorKind, ErrorReport, ServiceError, ServiceResult};

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::invoice::InvoiceRepository;
pub use repository::product::ProductRepository;
pub use repository::stock::{StockLogRepository, StockLogView};
pub use repository::user::UserRepository;
