//! Memoizing query cache with in-flight request coalescing.
//!
//! One `QueryCache` is constructed per process (per result type) and shared
//! behind an `Arc`. For every [`CacheKey`] it moves through:
//!
//! - **Idle, cached**: the stored value is returned without recomputing.
//! - **Idle → InFlight**: on a miss with nothing running, the caller becomes
//!   the leader and runs the computation.
//! - **InFlight**: further callers for the key join the running computation
//!   and receive its outcome. No duplicate work is started.
//! - **InFlight → Idle**: the key leaves in-flight tracking whether the
//!   computation succeeded or failed; only successes are stored.
//!
//! Entries never expire. A changed scope yields a different key; an explicit
//! [`refresh`](QueryCache::refresh) recomputes a key in place.
//!
//! If a leader is dropped before it finishes, its joiners start over and one
//! of them becomes the new leader.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::debug;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::scoring::ScoringError;
use crate::ports::StoreError;

use super::CacheKey;

/// Errors returned by cached computations.
///
/// `Clone` so a single outcome can be delivered to every joined caller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Scoring(#[from] ScoringError),

    /// The computation was superseded or abandoned. Not a failure.
    #[error("Computation cancelled")]
    Cancelled,
}

impl QueryError {
    pub fn is_cancellation(&self) -> bool {
        matches!(self, QueryError::Cancelled)
    }
}

impl From<QueryError> for DomainError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Store(e) => e.into(),
            QueryError::Scoring(e) => e.into(),
            QueryError::Cancelled => {
                DomainError::new(ErrorCode::ComputationCancelled, "Computation cancelled")
            }
        }
    }
}

type Outcome<V> = Option<Result<Arc<V>, QueryError>>;

struct Flight<V> {
    id: u64,
    outcome: watch::Receiver<Outcome<V>>,
}

struct CacheState<V> {
    entries: HashMap<CacheKey, Arc<V>>,
    in_flight: HashMap<CacheKey, Flight<V>>,
    next_flight: u64,
}

enum Role<V> {
    Leader {
        id: u64,
        outcome: watch::Sender<Outcome<V>>,
    },
    Follower(watch::Receiver<Outcome<V>>),
}

/// Cache of immutable computed values keyed by scope signature.
pub struct QueryCache<V> {
    state: Mutex<CacheState<V>>,
}

impl<V> Default for QueryCache<V> {
    fn default() -> Self {
        Self {
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                in_flight: HashMap::new(),
                next_flight: 0,
            }),
        }
    }
}

impl<V> QueryCache<V>
where
    V: Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for `key`, or computes it exactly once.
    ///
    /// Concurrent callers for the same key share a single run of `compute`.
    /// Failures are returned to every joined caller and are not cached.
    pub async fn get_or_compute<F, Fut>(&self, key: CacheKey, compute: F) -> Result<Arc<V>, QueryError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, QueryError>>,
    {
        self.run(key, compute, true).await
    }

    /// Recomputes `key` ignoring any cached value and stores the new result.
    ///
    /// Joins a computation that is already running for the key instead of
    /// starting a second one. A failed refresh drops the superseded entry, so
    /// the next request recomputes instead of serving it.
    pub async fn refresh<F, Fut>(&self, key: CacheKey, compute: F) -> Result<Arc<V>, QueryError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, QueryError>>,
    {
        self.run(key, compute, false).await
    }

    /// The cached value, if any. Never triggers a computation.
    pub fn peek(&self, key: &CacheKey) -> Option<Arc<V>> {
        self.lock().entries.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of keys currently being computed.
    pub fn in_flight(&self) -> usize {
        self.lock().in_flight.len()
    }

    fn lock(&self) -> MutexGuard<'_, CacheState<V>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run<F, Fut>(&self, key: CacheKey, compute: F, use_cached: bool) -> Result<Arc<V>, QueryError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, QueryError>>,
    {
        let mut compute = Some(compute);
        loop {
            let role = {
                let mut state = self.lock();
                if use_cached {
                    if let Some(value) = state.entries.get(&key) {
                        debug!(key = %key, "Cache hit");
                        return Ok(Arc::clone(value));
                    }
                }
                match state.in_flight.get(&key) {
                    Some(flight) => Role::Follower(flight.outcome.clone()),
                    None => {
                        state.next_flight += 1;
                        let id = state.next_flight;
                        let (tx, rx) = watch::channel(None);
                        state.in_flight.insert(key.clone(), Flight { id, outcome: rx });
                        Role::Leader { id, outcome: tx }
                    }
                }
            };

            match role {
                Role::Follower(mut outcome) => {
                    debug!(key = %key, "Joining in-flight computation");
                    let resolved = outcome
                        .wait_for(Option::is_some)
                        .await
                        .ok()
                        .and_then(|value| value.clone());
                    match resolved {
                        Some(result) => return result,
                        None => {
                            debug!(key = %key, "In-flight computation abandoned, retrying");
                            continue;
                        }
                    }
                }
                Role::Leader { id, outcome } => {
                    // Only reachable once: a leader always returns below.
                    let Some(compute) = compute.take() else {
                        return Err(QueryError::Cancelled);
                    };
                    return self.lead(key, id, outcome, compute, !use_cached).await;
                }
            }
        }
    }

    async fn lead<F, Fut>(
        &self,
        key: CacheKey,
        id: u64,
        outcome: watch::Sender<Outcome<V>>,
        compute: F,
        evict_on_failure: bool,
    ) -> Result<Arc<V>, QueryError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, QueryError>>,
    {
        debug!(key = %key, "Computing");
        let mut guard = FlightGuard {
            state: &self.state,
            key: &key,
            id,
            armed: true,
        };

        let result = compute().await.map(Arc::new);

        {
            let mut state = self.lock();
            match &result {
                Ok(value) => {
                    state.entries.insert(key.clone(), Arc::clone(value));
                }
                Err(_) if evict_on_failure => {
                    state.entries.remove(&key);
                }
                Err(_) => {}
            }
            remove_flight(&mut state, &key, id);
        }
        guard.armed = false;

        if let Err(err) = &result {
            debug!(key = %key, error = %err, "Computation failed");
        }
        outcome.send_replace(Some(result.clone()));
        result
    }
}

fn remove_flight<V>(state: &mut CacheState<V>, key: &CacheKey, id: u64) {
    if state.in_flight.get(key).map_or(false, |f| f.id == id) {
        state.in_flight.remove(key);
    }
}

/// Clears the in-flight entry if the leader is dropped mid-computation.
struct FlightGuard<'a, V> {
    state: &'a Mutex<CacheState<V>>,
    key: &'a CacheKey,
    id: u64,
    armed: bool,
}

impl<V> Drop for FlightGuard<'_, V> {
    fn drop(&mut self) {
        if self.armed {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            remove_flight(&mut state, self.key, self.id);
        }
    }
}
