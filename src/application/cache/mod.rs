//! Query cache and deduplication layer.
//!
//! - `CacheKey` / `ComputationMode` - What a cached value is for
//! - `QueryCache` - Memoized values plus in-flight request coalescing
//! - `ResultSlot` - Latest-wins holder that drops superseded outcomes

mod key;
mod query_cache;
mod result_slot;

pub use key::{CacheKey, ComputationMode};
pub use query_cache::{QueryCache, QueryError};
pub use result_slot::{ResultSlot, SlotUpdate, Ticket};
