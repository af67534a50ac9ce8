//! In-memory adapters for tests and demos.

mod in_memory_store;

pub use in_memory_store::{InMemoryPerformanceStore, StoreQuery};
