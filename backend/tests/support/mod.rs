//! Shared helper utilities for order store integration tests.
//!
//! Integration tests compile as separate crates under `backend/tests/`; this
//! module is the common home for embedded cluster bootstrap, template
//! provisioning and error rendering.

pub mod atexit_cleanup;
pub mod cluster_skip;
pub mod embedded_postgres;

pub use cluster_skip::handle_cluster_setup_failure;
pub use embedded_postgres::provision_template_database;

/// Render a `postgres` error with enough detail to be useful in CI logs.
///
/// The `postgres::Error` `Display` implementation often collapses database
/// errors to a generic `db error`, which hides the message and SQLSTATE.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };

    let mut summary = format!(
        "postgres error {:?}: {}",
        db_error.code(),
        db_error.message()
    );

    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }

    if let Some(constraint) = db_error.constraint() {
        summary.push_str("; constraint: ");
        summary.push_str(constraint);
    }

    summary
}
