//! Order management backend: domain model, ports, services and the
//! PostgreSQL adapter.

pub mod domain;
pub mod outbound;
pub mod settings;
