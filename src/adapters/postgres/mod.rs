//! PostgreSQL adapters - Database implementations for the store port.
//!
//! - `PostgresPerformanceStore` - Read-only metric, observation, mastery,
//!   profile and badge queries

mod performance_store;

pub use performance_store::PostgresPerformanceStore;
