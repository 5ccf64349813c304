//! Caller Identity
//!
//! Credentials are verified upstream; this module only carries the resolved user and role.

use std::{fmt, str::FromStr};

use serde::Serialize;
use thiserror::Error;

use crate::ids::TypedId;

/// Marker for user ids. Users are owned by the account subsystem, not persisted here.
#[derive(Debug)]
pub struct User;

/// User Id
pub type UserId = TypedId<User>;

/// Caller role as resolved by the authentication layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown role `{0}`")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Authenticated caller of an order operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user: UserId,
    pub role: Role,
}

impl Caller {
    #[must_use]
    pub const fn user(user: UserId) -> Self {
        Self {
            user,
            role: Role::User,
        }
    }

    #[must_use]
    pub const fn admin(user: UserId) -> Self {
        Self {
            user,
            role: Role::Admin,
        }
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}
