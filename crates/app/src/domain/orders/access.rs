//! Order Access Policy
//!
//! Callers who are neither the owner nor an admin are told the order does not exist,
//! never that they are forbidden from it. Status assignment and deletion are admin-only
//! and are refused from the caller's role alone, before any lookup.

use crate::domain::identity::{Caller, UserId};

/// A caller's relationship to one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderAccess {
    Admin,
    Owner,
    Stranger,
}

impl OrderAccess {
    /// Admin takes precedence over ownership.
    #[must_use]
    pub fn resolve(owner: UserId, caller: &Caller) -> Self {
        if caller.is_admin() {
            Self::Admin
        } else if owner == caller.user {
            Self::Owner
        } else {
            Self::Stranger
        }
    }

    #[must_use]
    pub const fn can_view(self) -> bool {
        matches!(self, Self::Admin | Self::Owner)
    }

    /// Whether the caller may ask for cancellation; the status rule is checked separately.
    #[must_use]
    pub const fn can_cancel(self) -> bool {
        matches!(self, Self::Admin | Self::Owner)
    }
}
