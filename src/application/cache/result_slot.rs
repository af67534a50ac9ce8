//! Generation-guarded holder for the result a view currently shows.
//!
//! A caller that changes scope before the previous request resolves begins a
//! new generation. Outcomes of older generations are dropped when they arrive,
//! so a slow, stale computation can never overwrite a newer result.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

use super::{CacheKey, QueryError};

/// Issued by [`ResultSlot::begin`]; identifies one request generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    key: CacheKey,
}

impl Ticket {
    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What [`ResultSlot::complete`] did with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotUpdate {
    /// The value became the current result.
    Applied,
    /// The error became the current error state.
    Failed,
    /// A newer request exists, or the outcome was a cancellation.
    Discarded,
}

#[derive(Debug)]
struct SlotState<V> {
    generation: u64,
    key: Option<CacheKey>,
    value: Option<Arc<V>>,
    error: Option<QueryError>,
}

/// Latest-wins result holder.
#[derive(Debug)]
pub struct ResultSlot<V> {
    state: Mutex<SlotState<V>>,
}

impl<V> Default for ResultSlot<V> {
    fn default() -> Self {
        Self {
            state: Mutex::new(SlotState {
                generation: 0,
                key: None,
                value: None,
                error: None,
            }),
        }
    }
}

impl<V> ResultSlot<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new request generation, superseding any outstanding ticket.
    pub fn begin(&self, key: CacheKey) -> Ticket {
        let mut state = self.lock();
        state.generation += 1;
        state.key = Some(key.clone());
        Ticket {
            generation: state.generation,
            key,
        }
    }

    /// Applies an outcome if `ticket` is still the newest generation.
    ///
    /// Cancellations are always discarded without touching the slot.
    pub fn complete(&self, ticket: &Ticket, outcome: Result<Arc<V>, QueryError>) -> SlotUpdate {
        let mut state = self.lock();
        if ticket.generation != state.generation {
            debug!(
                key = %ticket.key,
                generation = ticket.generation,
                current = state.generation,
                "Discarding superseded result"
            );
            return SlotUpdate::Discarded;
        }
        match outcome {
            Ok(value) => {
                state.value = Some(value);
                state.error = None;
                SlotUpdate::Applied
            }
            Err(err) if err.is_cancellation() => SlotUpdate::Discarded,
            Err(err) => {
                state.error = Some(err);
                SlotUpdate::Failed
            }
        }
    }

    /// Begins a generation for `key`, awaits `request` and completes it.
    pub async fn track<Fut>(&self, key: CacheKey, request: Fut) -> SlotUpdate
    where
        Fut: Future<Output = Result<Arc<V>, QueryError>>,
    {
        let ticket = self.begin(key);
        let outcome = request.await;
        self.complete(&ticket, outcome)
    }

    /// The most recent applied value.
    pub fn current(&self) -> Option<Arc<V>> {
        self.lock().value.clone()
    }

    /// The error of the newest generation, if it failed.
    pub fn error(&self) -> Option<QueryError> {
        self.lock().error.clone()
    }

    /// Key of the newest generation.
    pub fn current_key(&self) -> Option<CacheKey> {
        self.lock().key.clone()
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    fn lock(&self) -> MutexGuard<'_, SlotState<V>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
