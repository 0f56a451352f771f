//! Request-scoped batch loader
//!
//! The loader is the concurrency rendezvous point of one GraphQL request:
//! sibling resolvers submit [`LoadRequest`]s concurrently, the loader
//! coalesces arrivals within a short accumulation window, partitions them
//! into equivalence classes, runs each class exactly once, and hands every
//! caller its own slice of the aggregate result.
//!
//! Grouping rules:
//! - equal identity keys share one pending entry and observe one outcome;
//! - equal non-nil group signatures merge into one group, executed once by
//!   the first-arriving member's executor over the ordered member list;
//! - a nil group signature (pagination, un-mergeable loads) makes a
//!   singleton group.
//!
//! The state lock covers queue insertion and partitioning only; it is
//! released before any executor runs. A loader lives for exactly one
//! request and is never shared across requests.

pub mod request;

pub use request::{GroupExecutor, GroupResult, LoadMember, LoadRequest, LoadSlice};

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::oneshot;

use crate::config::BatchConfig;
use crate::error::ApiError;

/// What a caller's future resolves to. The error is shared because group
/// failures broadcast to every member.
pub type LoadResult = Result<LoadSlice, Arc<ApiError>>;

struct Pending {
    request: LoadRequest,
    waiters: Vec<oneshot::Sender<LoadResult>>,
}

#[derive(Default)]
struct State {
    /// Pending entries in arrival order
    pending: Vec<Pending>,
    /// identity key → index into `pending`
    by_identity: HashMap<String, usize>,
    timer_armed: bool,
    cancelled: bool,
}

/// Request-scoped coordinator for batched loads.
pub struct BatchLoader {
    state: Arc<Mutex<State>>,
    config: BatchConfig,
}

impl BatchLoader {
    pub fn new(config: BatchConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            config,
        }
    }

    /// Submit a load and wait for its slice of the group result.
    pub async fn load(&self, request: LoadRequest) -> LoadResult {
        let receiver = self.submit(request);
        receiver
            .await
            .unwrap_or_else(|_| Err(Arc::new(ApiError::Cancelled)))
    }

    /// Submit a load, returning the future's receiving half.
    ///
    /// The first arrival of a cycle arms the accumulation window; reaching
    /// the max-batch size dispatches early. Arrivals that miss a dispatch
    /// accumulate for the next cycle.
    pub fn submit(&self, request: LoadRequest) -> oneshot::Receiver<LoadResult> {
        let (tx, rx) = oneshot::channel();

        if request.identity_key.is_empty() {
            let _ = tx.send(Err(Arc::new(ApiError::Internal(
                "load request with empty identity key".to_string(),
            ))));
            return rx;
        }

        let mut state = self.lock_state();
        if state.cancelled {
            let _ = tx.send(Err(Arc::new(ApiError::Cancelled)));
            return rx;
        }

        if let Some(&index) = state.by_identity.get(&request.identity_key) {
            state.pending[index].waiters.push(tx);
            return rx;
        }

        let pending_len = state.pending.len();
        state
            .by_identity
            .insert(request.identity_key.clone(), pending_len);
        state.pending.push(Pending {
            request,
            waiters: vec![tx],
        });

        if state.pending.len() >= self.config.max_batch {
            let batch = Self::drain(&mut state);
            drop(state);
            tokio::spawn(Self::run(batch));
        } else if !state.timer_armed {
            state.timer_armed = true;
            let shared = Arc::clone(&self.state);
            let window = self.config.window;
            drop(state);
            tokio::spawn(async move {
                tokio::time::sleep(window).await;
                let batch = {
                    let mut state = shared.lock().unwrap_or_else(PoisonError::into_inner);
                    Self::drain(&mut state)
                };
                if !batch.is_empty() {
                    Self::run(batch).await;
                }
            });
        }

        rx
    }

    /// Resolve every pending future with a cancellation error and stop
    /// accepting work. No SQL is issued for drained entries; groups already
    /// dispatched run to completion and their sends go nowhere.
    pub fn cancel(&self) {
        let batch = {
            let mut state = self.lock_state();
            state.cancelled = true;
            Self::drain(&mut state)
        };
        for entry in batch {
            for waiter in entry.waiters {
                let _ = waiter.send(Err(Arc::new(ApiError::Cancelled)));
            }
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn drain(state: &mut State) -> Vec<Pending> {
        state.by_identity.clear();
        state.timer_armed = false;
        std::mem::take(&mut state.pending)
    }

    /// One dispatch cycle: partition by group signature, then run the
    /// groups in parallel.
    async fn run(batch: Vec<Pending>) {
        let mut groups: Vec<Vec<Pending>> = Vec::new();
        for entry in batch {
            let merge_into = match entry.request.group_signature.as_deref() {
                Some(signature) => groups.iter().position(|group| {
                    group[0].request.group_signature.as_deref() == Some(signature)
                }),
                None => None,
            };
            match merge_into {
                Some(index) => groups[index].push(entry),
                None => groups.push(vec![entry]),
            }
        }

        tracing::debug!(groups = groups.len(), "dispatching load groups");
        let handles: Vec<_> = groups
            .into_iter()
            .map(|group| tokio::spawn(Self::run_group(group)))
            .collect();
        futures::future::join_all(handles).await;
    }

    /// Execute one group and distribute each member's slice in arrival
    /// order. A group-level error broadcasts to every member.
    async fn run_group(group: Vec<Pending>) {
        let members: Vec<LoadMember> = group
            .iter()
            .map(|entry| entry.request.member.clone())
            .collect();
        let executor = Arc::clone(&group[0].request.executor);

        tracing::debug!(members = members.len(), "executing load group");
        match executor.execute(&members).await {
            Ok(result) => {
                for entry in group {
                    let slice = entry
                        .request
                        .executor
                        .distribute(&entry.request.member, &result)
                        .map_err(Arc::new);
                    for waiter in entry.waiters {
                        let _ = waiter.send(slice.clone());
                    }
                }
            }
            Err(error) => {
                let error = Arc::new(error);
                for entry in group {
                    for waiter in entry.waiters {
                        let _ = waiter.send(Err(Arc::clone(&error)));
                    }
                }
            }
        }
    }
}

impl Drop for BatchLoader {
    fn drop(&mut self) {
        self.cancel();
    }
}
