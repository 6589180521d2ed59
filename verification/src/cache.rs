//! Single-flight cache of the customer's verification state.

use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::sync::{Arc, Mutex};

use idgate_client::VerifyGateway;
use idgate_types::VerificationState;

use crate::lock;

type StateFuture = Shared<BoxFuture<'static, Option<VerificationState>>>;

#[derive(Default)]
struct Slot {
    /// The current fetch, kept after it resolves so later callers reuse it.
    pending: Option<StateFuture>,
    cached: Option<VerificationState>,
    /// Bumped per started fetch; only the latest may write the slot.
    generation: u64,
}

/// Memoized verification state for one page session.
///
/// Concurrent callers share one in-flight request. A failed fetch is not
/// cached: every waiter sees `None` and the next call retries.
pub struct StateCache {
    gateway: Arc<dyn VerifyGateway>,
    slot: Arc<Mutex<Slot>>,
}

impl StateCache {
    pub fn new(gateway: Arc<dyn VerifyGateway>) -> Self {
        Self {
            gateway,
            slot: Arc::new(Mutex::new(Slot::default())),
        }
    }

    /// The state, fetching it on first use.
    pub async fn get_state(&self) -> Option<VerificationState> {
        self.fetch(false).await
    }

    /// The last successfully fetched state, without waiting. May be stale.
    pub fn get_cached_state(&self) -> Option<VerificationState> {
        lock(&self.slot).cached
    }

    /// Start a new fetch even if one is cached or in flight.
    ///
    /// Results of the superseded fetch no longer update the cache.
    pub async fn refresh(&self) -> Option<VerificationState> {
        self.fetch(true).await
    }

    fn fetch(&self, force: bool) -> StateFuture {
        let mut slot = lock(&self.slot);
        if !force {
            if let Some(pending) = &slot.pending {
                return pending.clone();
            }
        }

        slot.generation += 1;
        let generation = slot.generation;
        let gateway = Arc::clone(&self.gateway);
        let shared = Arc::clone(&self.slot);

        let future = async move {
            let result = gateway.fetch_state().await;
            let mut slot = lock(&shared);
            let current = slot.generation == generation;
            match result {
                Ok(state) => {
                    if current {
                        slot.cached = Some(state);
                    }
                    Some(state)
                }
                Err(err) => {
                    tracing::warn!(error = %err, "verification state fetch failed");
                    if current {
                        slot.pending = None;
                        slot.cached = None;
                    }
                    None
                }
            }
        }
        .boxed()
        .shared();

        slot.pending = Some(future.clone());
        future
    }
}
