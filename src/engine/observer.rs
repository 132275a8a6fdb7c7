use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Events emitted by the execution gateway around each query.
///
/// `QueryStarted` is the busy signal, emitted strictly before the query is
/// submitted; `QuerySucceeded`/`QueryFailed` are the idle signal, emitted
/// strictly after the engine returns. Observers are fire-and-forget: they can
/// never alter the result or failure of the query itself.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    QueryStarted { sql: String },
    QuerySucceeded { rows: usize, elapsed: Duration },
    QueryFailed { message: String, elapsed: Duration },
}

/// Observer hook for gateway events.
pub trait EngineObserver: Send + Sync {
    fn on_event(&self, event: &EngineEvent);
}

/// An observer that fans out events to a list of observers.
#[derive(Default)]
pub struct CompositeEngineObserver {
    observers: Vec<Arc<dyn EngineObserver>>,
}

impl CompositeEngineObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn EngineObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeEngineObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeEngineObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl EngineObserver for CompositeEngineObserver {
    fn on_event(&self, event: &EngineEvent) {
        for o in &self.observers {
            o.on_event(event);
        }
    }
}

/// A simple stderr logger for gateway events.
#[derive(Debug, Default)]
pub struct StdErrEngineObserver;

impl EngineObserver for StdErrEngineObserver {
    fn on_event(&self, event: &EngineEvent) {
        match event {
            EngineEvent::QueryStarted { sql } => eprintln!("[engine][busy] {sql}"),
            EngineEvent::QuerySucceeded { rows, elapsed } => {
                eprintln!("[engine][idle] rows={rows} elapsed={elapsed:?}")
            }
            EngineEvent::QueryFailed { message, elapsed } => {
                eprintln!("[engine][idle][err] elapsed={elapsed:?} err={message}")
            }
        }
    }
}

/// Cumulative gateway metrics.
///
/// The gateway updates these counters as queries execute; callers can snapshot
/// them at any time. Forked connections share one metrics handle, so totals
/// span all connections of a composition root.
pub struct EngineMetrics {
    queries_started: AtomicU64,
    queries_succeeded: AtomicU64,
    queries_failed: AtomicU64,
    rows_returned: AtomicU64,
    exec_ns: AtomicU64,

    active_queries: AtomicUsize,
    max_active_queries: AtomicUsize,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self {
            queries_started: AtomicU64::new(0),
            queries_succeeded: AtomicU64::new(0),
            queries_failed: AtomicU64::new(0),
            rows_returned: AtomicU64::new(0),
            exec_ns: AtomicU64::new(0),
            active_queries: AtomicUsize::new(0),
            max_active_queries: AtomicUsize::new(0),
        }
    }

    pub(crate) fn on_query_start(&self) {
        let _ = self.queries_started.fetch_add(1, Ordering::SeqCst);
        let now = self.active_queries.fetch_add(1, Ordering::SeqCst) + 1;
        update_max_usize(&self.max_active_queries, now);
    }

    pub(crate) fn on_query_success(&self, rows: usize, elapsed: Duration) {
        let _ = self.queries_succeeded.fetch_add(1, Ordering::SeqCst);
        let _ = self.rows_returned.fetch_add(rows as u64, Ordering::SeqCst);
        self.on_query_end(elapsed);
    }

    pub(crate) fn on_query_failure(&self, elapsed: Duration) {
        let _ = self.queries_failed.fetch_add(1, Ordering::SeqCst);
        self.on_query_end(elapsed);
    }

    fn on_query_end(&self, elapsed: Duration) {
        let add = elapsed.as_nanos().min(u64::MAX as u128) as u64;
        let _ = self.exec_ns.fetch_add(add, Ordering::SeqCst);
        let _ = self.active_queries.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> EngineMetricsSnapshot {
        EngineMetricsSnapshot {
            queries_started: self.queries_started.load(Ordering::SeqCst),
            queries_succeeded: self.queries_succeeded.load(Ordering::SeqCst),
            queries_failed: self.queries_failed.load(Ordering::SeqCst),
            rows_returned: self.rows_returned.load(Ordering::SeqCst),
            exec_time: Duration::from_nanos(self.exec_ns.load(Ordering::SeqCst)),
            max_active_queries: self.max_active_queries.load(Ordering::SeqCst),
        }
    }
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn update_max_usize(dst: &AtomicUsize, now: usize) {
    loop {
        let cur = dst.load(Ordering::SeqCst);
        if now <= cur {
            break;
        }
        if dst
            .compare_exchange(cur, now, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            break;
        }
    }
}

/// Immutable snapshot of [`EngineMetrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineMetricsSnapshot {
    pub queries_started: u64,
    pub queries_succeeded: u64,
    pub queries_failed: u64,
    pub rows_returned: u64,
    pub exec_time: Duration,
    pub max_active_queries: usize,
}

impl fmt::Display for EngineMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "queries={}/{} (failed={}), rows_returned={}, max_active={}, exec_time={:?}",
            self.queries_succeeded,
            self.queries_started,
            self.queries_failed,
            self.rows_returned,
            self.max_active_queries,
            self.exec_time
        )
    }
}
