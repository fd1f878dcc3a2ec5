//! PostgreSQL persistence for orders using Diesel and `diesel-async`.
//!
//! Row structs (`models.rs`) and table definitions (`schema.rs`) stay private
//! to this module; the repository converts rows into validated domain orders
//! and maps Diesel failures onto `OrderRepositoryError`.
//!
//! # Example
//!
//! ```no_run
//! use orders_backend::outbound::persistence::{DbPool, DieselOrderRepository, PoolConfig};
//!
//! # async fn example() -> Result<(), orders_backend::outbound::persistence::PoolError> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/orders")).await?;
//! let repo = DieselOrderRepository::new(pool);
//! # let _ = repo;
//! # Ok(())
//! # }
//! ```

mod diesel_basic_error_mapping;
mod diesel_order_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_order_repository::DieselOrderRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_migrations};
pub use pool::{DEFAULT_CONNECTION_TIMEOUT, DEFAULT_MAX_SIZE, DbPool, PoolConfig, PoolError};
