//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `PerformanceStore` - Read-only access to metric definitions, observations,
//!   mastery records, profiles and badge counts

mod performance_store;

pub use performance_store::{PerformanceStore, Profile, ProfileFilter, StoreError};
