//! Global and per-caller concurrency pools.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::{OwnedSemaphorePermit, Semaphore, TryAcquireError};
use tracing::debug;
use vgen_models::CallerId;

use crate::config::GateConfig;
use crate::error::{GateError, GateResult};
use crate::metrics;
use crate::rate_limit::SlidingWindowLimiter;

/// Maximum number of per-caller pools kept before idle ones are dropped.
const MAX_CALLER_POOLS: usize = 10_000;

/// Permits held by one in-flight generation. Dropping it releases them.
#[derive(Debug)]
pub struct ConcurrencySlot {
    _global: OwnedSemaphorePermit,
    _caller: Option<OwnedSemaphorePermit>,
}

/// A caller that has to wait for a permit.
///
/// Permits are taken global first, then per caller. A global permit obtained
/// at admission time is carried here while the per-caller one is awaited.
#[derive(Debug)]
pub struct QueuedSlot {
    global: Arc<Semaphore>,
    held_global: Option<OwnedSemaphorePermit>,
    caller: Option<Arc<Semaphore>>,
}

impl QueuedSlot {
    /// Wait until every required permit is held.
    pub async fn wait(self) -> GateResult<ConcurrencySlot> {
        let global = match self.held_global {
            Some(permit) => permit,
            None => self
                .global
                .acquire_owned()
                .await
                .map_err(|_| GateError::Closed)?,
        };

        let caller = match self.caller {
            Some(pool) => Some(pool.acquire_owned().await.map_err(|_| GateError::Closed)?),
            None => None,
        };

        Ok(ConcurrencySlot {
            _global: global,
            _caller: caller,
        })
    }
}

/// Result of passing the gate.
#[derive(Debug)]
pub enum Admission {
    /// Permits were free and are now held
    Ready(ConcurrencySlot),
    /// Pools are busy; the caller should be told before waiting
    Queued(QueuedSlot),
}

impl Admission {
    pub fn is_queued(&self) -> bool {
        matches!(self, Admission::Queued(_))
    }

    /// Resolve into a held slot, waiting if queued.
    pub async fn wait(self) -> GateResult<ConcurrencySlot> {
        match self {
            Admission::Ready(slot) => Ok(slot),
            Admission::Queued(queued) => queued.wait().await,
        }
    }
}

/// Bounds concurrent generations globally and per caller.
#[derive(Debug)]
pub struct ConcurrencyGate {
    config: GateConfig,
    global: Arc<Semaphore>,
    global_size: usize,
    caller_size: usize,
    callers: Mutex<HashMap<CallerId, Arc<Semaphore>>>,
    limiter: SlidingWindowLimiter,
    closed: AtomicBool,
}

impl ConcurrencyGate {
    /// Create a gate. Pool sizes of zero are raised to one.
    pub fn new(config: GateConfig) -> Self {
        let global_size = config.max_requests.max(1);
        let caller_size = config.max_requests_per_user.max(1);
        let limiter =
            SlidingWindowLimiter::new(config.rate_limit_window(), config.max_requests_per_window);

        Self {
            config,
            global: Arc::new(Semaphore::new(global_size)),
            global_size,
            caller_size,
            callers: Mutex::new(HashMap::new()),
            limiter,
            closed: AtomicBool::new(false),
        }
    }

    /// Admit `caller`, or reject on rate limit or shutdown.
    ///
    /// Returns [`Admission::Queued`] when a pool is exhausted at call time.
    pub fn enter(&self, caller: &CallerId) -> GateResult<Admission> {
        if self.is_closed() {
            return Err(GateError::Closed);
        }

        let admin = self.config.is_admin(caller);
        if !admin {
            if let Err(retry_after) = self.limiter.check(caller.as_str()) {
                debug!(caller = %caller, retry_after_ms = retry_after.as_millis() as u64, "Rate limited");
                metrics::record_rate_limited();
                return Err(GateError::RateLimited { retry_after });
            }
        }

        let caller_pool = if admin { None } else { Some(self.caller_pool(caller)) };

        let global = match Arc::clone(&self.global).try_acquire_owned() {
            Ok(permit) => permit,
            Err(TryAcquireError::Closed) => return Err(GateError::Closed),
            Err(TryAcquireError::NoPermits) => {
                return Ok(self.queued(caller, None, caller_pool));
            }
        };

        let Some(pool) = caller_pool else {
            return Ok(Admission::Ready(ConcurrencySlot {
                _global: global,
                _caller: None,
            }));
        };

        match Arc::clone(&pool).try_acquire_owned() {
            Ok(permit) => Ok(Admission::Ready(ConcurrencySlot {
                _global: global,
                _caller: Some(permit),
            })),
            Err(TryAcquireError::Closed) => Err(GateError::Closed),
            Err(TryAcquireError::NoPermits) => Ok(self.queued(caller, Some(global), Some(pool))),
        }
    }

    /// Admit and wait for the permits in one step.
    pub async fn acquire(&self, caller: &CallerId) -> GateResult<ConcurrencySlot> {
        self.enter(caller)?.wait().await
    }

    fn queued(
        &self,
        caller: &CallerId,
        held_global: Option<OwnedSemaphorePermit>,
        pool: Option<Arc<Semaphore>>,
    ) -> Admission {
        debug!(caller = %caller, in_flight = self.in_flight(), "Gate busy, queueing");
        metrics::record_queued();
        Admission::Queued(QueuedSlot {
            global: Arc::clone(&self.global),
            held_global,
            caller: pool,
        })
    }

    fn caller_pool(&self, caller: &CallerId) -> Arc<Semaphore> {
        let mut callers = self.callers.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(pool) = callers.get(caller) {
            return Arc::clone(pool);
        }

        if callers.len() >= MAX_CALLER_POOLS {
            // Only the map references an idle pool
            callers.retain(|_, pool| Arc::strong_count(pool) > 1);
        }

        let pool = Arc::new(Semaphore::new(self.caller_size));
        callers.insert(caller.clone(), Arc::clone(&pool));
        pool
    }

    /// Reject new admissions and fail everyone still waiting.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.global.close();
        let callers = self.callers.lock().unwrap_or_else(|e| e.into_inner());
        for pool in callers.values() {
            pool.close();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Global permits currently held.
    pub fn in_flight(&self) -> usize {
        self.global_size
            .saturating_sub(self.global.available_permits())
    }

    pub fn capacity(&self) -> usize {
        self.global_size
    }

    pub fn is_admin(&self, caller: &CallerId) -> bool {
        self.config.is_admin(caller)
    }
}
