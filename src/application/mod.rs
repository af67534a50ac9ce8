//! Application layer - Queries, Handlers and the engine facade.
//!
//! This layer orchestrates domain calculators and coordinates with the
//! store port. Every computation is a read-only query memoized per scope.

pub mod cache;
mod engine;
pub mod handlers;
mod scope;
mod settings;

pub use cache::{CacheKey, ComputationMode, QueryCache, QueryError, ResultSlot, SlotUpdate, Ticket};
pub use engine::PerformanceEngine;
pub use scope::Scope;
pub use settings::EngineSettings;
