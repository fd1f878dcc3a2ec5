//! Embedded Diesel migrations for the order schema.

use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

/// Migrations compiled from `backend/migrations`.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised while applying migrations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MigrationError {
    /// The database could not be reached.
    #[error("failed to connect for migrations: {message}")]
    Connect { message: String },
    /// A migration failed to apply.
    #[error("failed to apply migrations: {message}")]
    Apply { message: String },
}

/// Apply every pending migration and return how many ran.
///
/// This opens a blocking connection; call it before serving traffic or from
/// `spawn_blocking`.
pub fn run_migrations(database_url: &str) -> Result<usize, MigrationError> {
    let mut connection =
        PgConnection::establish(database_url).map_err(|error| MigrationError::Connect {
            message: error.to_string(),
        })?;
    let applied = connection
        .run_pending_migrations(MIGRATIONS)
        .map_err(|error| MigrationError::Apply {
            message: error.to_string(),
        })?;
    for version in &applied {
        info!(%version, "applied migration");
    }
    Ok(applied.len())
}

#[cfg(test)]
mod tests {
    use diesel::migration::MigrationSource;
    use diesel::pg::Pg;
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn embeds_the_order_schema_migration() {
        let migrations = MigrationSource::<Pg>::migrations(&MIGRATIONS).expect("embedded");
        let names: Vec<String> = migrations
            .iter()
            .map(|migration| migration.name().to_string())
            .collect();
        assert!(names.iter().any(|name| name.contains("create_orders")));
    }

    #[rstest]
    fn unreachable_database_reports_connect_error() {
        let err = run_migrations("postgres://invalid host/orders").expect_err("bad url");
        assert!(matches!(err, MigrationError::Connect { .. }));
    }
}
