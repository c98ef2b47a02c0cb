//! Shared Diesel error mapping for the repositories.

use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub(crate) fn map_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// True when the error is a unique constraint violation.
///
/// Pair-row inserts race: two clients can both pass the duplicate pre-check
/// and collide on the composite unique index. The loser's violation must be
/// surfaced as a duplicate, not as a generic query failure.
pub(crate) fn is_unique_violation(error: &diesel::result::Error) -> bool {
    matches!(
        error,
        diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        )
    )
}

/// Error carried through a transaction closure that can fail either with a
/// port error (rolls the transaction back) or a raw Diesel error.
///
/// Diesel's `transaction` requires `From<diesel::result::Error>` on the error
/// type, which port errors cannot implement without dragging Diesel into the
/// domain. Adapters wrap their port error in this and unpack it afterwards.
#[derive(Debug)]
pub(crate) enum TxError<E> {
    Port(E),
    Db(diesel::result::Error),
}

impl<E> From<diesel::result::Error> for TxError<E> {
    fn from(error: diesel::result::Error) -> Self {
        Self::Db(error)
    }
}

impl<E> TxError<E> {
    pub(crate) fn unpack<Q, C>(self, query: Q, connection: C) -> E
    where
        Q: Fn(String) -> E,
        C: Fn(String) -> E,
    {
        match self {
            Self::Port(error) => error,
            Self::Db(error) => map_diesel_error(error, query, connection),
        }
    }
}

/// Map common Diesel error variants into query/connection constructors.
pub(crate) fn map_diesel_error<E, Q, C>(error: diesel::result::Error, query: Q, connection: C) -> E
where
    Q: Fn(String) -> E,
    C: Fn(String) -> E,
{
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(error = %error, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => query("record not found".to_owned()),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            connection(info.message().to_owned())
        }
        DieselError::DatabaseError(_, info) => query(info.message().to_owned()),
        other => query(other.to_string()),
    }
}
