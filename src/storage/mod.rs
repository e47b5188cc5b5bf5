//! Storage backends implementing the persistence ports

pub mod in_memory;
pub mod postgres;

pub use in_memory::{InMemoryLoanTypeRepository, InMemoryOrdersRepository};
pub use postgres::{PgLoanTypeRepository, PgOrdersRepository, ensure_schema};
