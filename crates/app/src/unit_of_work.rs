//! Unit of Work

use sqlx::{PgConnection, Postgres, Transaction};

/// A transaction boundary shared by every repository call made through it.
///
/// Either [`UnitOfWork::commit`] makes all writes visible or none of them are: an explicit
/// [`UnitOfWork::rollback`], or dropping the value uncommitted, discards them.
#[derive(Debug)]
pub struct UnitOfWork {
    tx: Transaction<'static, Postgres>,
}

impl UnitOfWork {
    pub(crate) fn new(tx: Transaction<'static, Postgres>) -> Self {
        Self { tx }
    }

    /// Connection bound to this transaction.
    pub fn connection(&mut self) -> &mut PgConnection {
        &mut self.tx
    }

    /// Commit every write made through this unit of work.
    ///
    /// # Errors
    ///
    /// Returns an error when `COMMIT` fails; nothing is persisted in that case.
    pub async fn commit(self) -> Result<(), sqlx::Error> {
        self.tx.commit().await
    }

    /// Discard every write made through this unit of work.
    ///
    /// # Errors
    ///
    /// Returns an error when `ROLLBACK` cannot be sent; the server still aborts the
    /// transaction once the connection is closed or reused.
    pub async fn rollback(self) -> Result<(), sqlx::Error> {
        self.tx.rollback().await
    }
}
