//! # Access Rules
//!
//! Roles, the acting user, and the rules that depend on them.
//!
//! The login/session layer resolves who is calling and hands an [`Actor`] to
//! every write operation. Nothing in this workspace reads a session.
//!
//! ## Who May Do What
//! ```text
//! ┌────────────────────────────┬───────────────┬────────────────────────────┐
//! │ Operation                  │ admin         │ staff                      │
//! ├────────────────────────────┼───────────────┼────────────────────────────┤
//! │ create invoice             │ yes           │ yes                        │
//! │ adjust stock               │ yes           │ no                         │
//! │ set invoice status         │ any status    │ own invoices, Unpaid↔Paid  │
//! └────────────────────────────┴───────────────┴────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::InvoiceStatus;

/// User role. Stored as `admin` / `staff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => f.write_str("admin"),
            Role::Staff => f.write_str("staff"),
        }
    }
}

/// The authenticated user performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Actor {
    pub user_id: i64,
    pub role: Role,
}

impl Actor {
    pub const fn admin(user_id: i64) -> Self {
        Actor {
            user_id,
            role: Role::Admin,
        }
    }

    pub const fn staff(user_id: i64) -> Self {
        Actor {
            user_id,
            role: Role::Staff,
        }
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fails with `Unauthorized` unless the actor is an admin.
    pub fn require_admin(&self, action: &str) -> CoreResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(CoreError::unauthorized(action))
        }
    }
}

/// Decides whether `actor` may move an invoice from `current` to `requested`.
///
/// ## Rules
/// - Admin may set Unpaid, Paid or Cancelled from any status.
/// - Staff may only touch invoices they created, and only Unpaid ↔ Paid.
///   A cancelled invoice is out of their reach.
/// - Re-selecting the current status is allowed (no-op).
///
/// ## Example
/// ```rust
/// use inspire_core::access::{authorize_status_change, Actor};
/// use inspire_core::InvoiceStatus;
///
/// let staff = Actor::staff(2);
/// // Own invoice, Unpaid → Paid: allowed
/// assert!(authorize_status_change(&staff, 2, InvoiceStatus::Unpaid, InvoiceStatus::Paid).is_ok());
/// // Someone else's invoice: refused
/// assert!(authorize_status_change(&staff, 1, InvoiceStatus::Unpaid, InvoiceStatus::Paid).is_err());
/// ```
pub fn authorize_status_change(
    actor: &Actor,
    invoice_creator_id: i64,
    current: InvoiceStatus,
    requested: InvoiceStatus,
) -> CoreResult<()> {
    if !actor.is_admin() {
        if invoice_creator_id != actor.user_id {
            return Err(CoreError::unauthorized(
                "update status of an invoice created by another user",
            ));
        }
        if requested == InvoiceStatus::Cancelled {
            return Err(CoreError::unauthorized("cancel invoices"));
        }
        if current == InvoiceStatus::Cancelled {
            return Err(CoreError::unauthorized("reopen cancelled invoices"));
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
