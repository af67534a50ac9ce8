//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the engine to external systems:
//! - `memory` - In-memory performance store (tests, demos)
//! - `postgres` - PostgreSQL performance store
//! - `catalog` - YAML coaching-catalog loader

pub mod catalog;
pub mod memory;
pub mod postgres;

pub use catalog::{CatalogError, YamlCatalogLoader};
pub use memory::{InMemoryPerformanceStore, StoreQuery};
pub use postgres::PostgresPerformanceStore;
