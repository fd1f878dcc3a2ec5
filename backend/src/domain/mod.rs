//! Domain primitives, aggregates, ports and services for order management.
//!
//! Public surface:
//! - Error / ErrorCode: failures returned by the driving ports.
//! - Order, OrderDraft, OrderLine and friends: the order aggregate.
//! - OrderCommandService / OrderQueryService: driving port implementations.

pub mod error;
pub mod order_service;
pub mod orders;
pub mod ports;
pub mod user;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::order_service::{OrderCommandService, OrderQueryService};
pub use self::orders::*;
pub use self::user::{UserId, UserValidationError};
