//! Shared Diesel and pool error mapping for the order adapter.

use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map Diesel errors onto a failure constructor and a connection
/// constructor, keeping the database message.
///
/// Closed connections go to `connection`; everything else, including
/// `NotFound` from `first`/`get_result`, goes to `failure`.
pub fn map_basic_diesel_error<E, F, C>(error: diesel::result::Error, failure: F, connection: C) -> E
where
    F: FnOnce(String) -> E,
    C: FnOnce(String) -> E,
{
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            debug!(message = info.message(), "database connection closed");
            connection(format!("database connection error: {}", info.message()))
        }
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
            let detail = info
                .constraint_name()
                .map(|constraint| format!(" ({constraint})"))
                .unwrap_or_default();
            failure(format!("database error: {}{detail}", info.message()))
        }
        DieselError::NotFound => failure("record not found".to_owned()),
        other => {
            debug!(error = %other, "diesel operation failed");
            failure(format!("database error: {other}"))
        }
    }
}
