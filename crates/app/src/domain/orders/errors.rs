//! Orders service errors.

use std::error::Error as StdError;

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::domain::{orders::status::InvalidStatus, products::records::ProductId};

/// `invalid_text_representation`
const PG_INVALID_TEXT_REPRESENTATION: &str = "22P02";

/// `datatype_mismatch`
const PG_DATATYPE_MISMATCH: &str = "42804";

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    /// The order does not exist, or the caller may not know that it does.
    #[error("order not found")]
    NotFound,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(
        "insufficient stock for product {product}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        product: ProductId,
        requested: u64,
        available: u64,
    },

    #[error("order already exists")]
    AlreadyExists,

    /// The caller lacks the role for an admin-only operation.
    #[error("operation not permitted")]
    Forbidden,

    #[error("internal error")]
    Internal(#[source] Box<dyn StdError + Send + Sync>),
}

impl OrdersServiceError {
    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput(reason.into())
    }

    /// Order creation only surfaces input, stock and uniqueness failures; anything else
    /// from inside the transaction is internal.
    pub(crate) fn into_creation_error(self) -> Self {
        match self {
            Self::InvalidInput(_)
            | Self::InsufficientStock { .. }
            | Self::AlreadyExists
            | Self::Internal(_) => self,
            Self::NotFound | Self::Forbidden => Self::Internal(Box::new(self)),
        }
    }
}

impl From<Error> for OrdersServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        let Some(database_error) = error.as_database_error() else {
            return Self::Internal(Box::new(error));
        };

        match database_error.kind() {
            ErrorKind::UniqueViolation => Self::AlreadyExists,
            ErrorKind::ForeignKeyViolation => Self::invalid_input("related resource not found"),
            ErrorKind::NotNullViolation => Self::invalid_input("missing required data"),
            ErrorKind::CheckViolation => Self::invalid_input("invalid data"),
            _ if is_malformed_value(database_error) => Self::invalid_input("malformed value"),
            _ => Self::Internal(Box::new(error)),
        }
    }
}

impl From<InvalidStatus> for OrdersServiceError {
    fn from(error: InvalidStatus) -> Self {
        Self::InvalidInput(error.to_string())
    }
}

impl From<jiff::Error> for OrdersServiceError {
    fn from(error: jiff::Error) -> Self {
        Self::Internal(Box::new(error))
    }
}

fn is_malformed_value(error: &dyn DatabaseError) -> bool {
    matches!(
        error.code().as_deref(),
        Some(PG_INVALID_TEXT_REPRESENTATION | PG_DATATYPE_MISMATCH)
    )
}
