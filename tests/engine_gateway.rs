use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use column_profiler::engine::{
    DuckDbEngine, EngineEvent, EngineObserver, EngineOptions, QueryExecutor,
};
use column_profiler::ProfileError;

/// Records the order of gateway events.
#[derive(Default)]
struct RecordingObserver {
    events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl EngineObserver for RecordingObserver {
    fn on_event(&self, event: &EngineEvent) {
        let label = match event {
            EngineEvent::QueryStarted { .. } => "started",
            EngineEvent::QuerySucceeded { .. } => "succeeded",
            EngineEvent::QueryFailed { .. } => "failed",
        };
        self.events.lock().unwrap().push(label.to_string());
    }
}

fn observed_engine() -> (DuckDbEngine, Arc<RecordingObserver>) {
    let observer = Arc::new(RecordingObserver::default());
    let engine = DuckDbEngine::open(EngineOptions {
        observer: Some(observer.clone()),
        ..Default::default()
    })
    .unwrap();
    (engine, observer)
}

#[test]
fn busy_signal_precedes_idle_signal() {
    let (engine, observer) = observed_engine();
    let rows = engine.execute("SELECT 42 AS answer").unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(observer.events(), ["started", "succeeded"]);
}

#[test]
fn idle_signal_fires_on_failure_too() {
    let (engine, observer) = observed_engine();
    let err = engine.execute("SELECT * FROM missing_table").unwrap_err();

    assert!(matches!(err, ProfileError::Engine { .. }));
    assert_eq!(observer.events(), ["started", "failed"]);
}

#[test]
fn observers_do_not_alter_query_results() {
    struct NoisyObserver;
    impl EngineObserver for NoisyObserver {
        fn on_event(&self, _event: &EngineEvent) {
            // Deliberately does unrelated work.
            let _ = (0..100).sum::<i64>();
        }
    }

    let engine = DuckDbEngine::open(EngineOptions {
        observer: Some(Arc::new(NoisyObserver)),
        ..Default::default()
    })
    .unwrap();

    let rows = engine.execute("SELECT 1 + 1 AS two").unwrap();
    assert_eq!(rows[0].get("two").unwrap().as_i64(), Some(2));
}

#[test]
fn setup_batches_bypass_instrumentation() {
    let (engine, observer) = observed_engine();
    engine
        .execute_batch("CREATE TABLE t(v INTEGER); INSERT INTO t VALUES (1);")
        .unwrap();

    assert!(observer.events().is_empty());
}

#[test]
fn skip_engine_opens_no_database() {
    let engine = DuckDbEngine::open(EngineOptions {
        skip: true,
        ..Default::default()
    })
    .unwrap();

    match engine.execute("SELECT 1") {
        Err(ProfileError::Engine { message }) => assert!(message.contains("skip")),
        other => panic!("expected Engine error, got {other:?}"),
    }
    engine.close().unwrap();
}

#[test]
fn worker_pool_size_is_configurable() {
    let engine = DuckDbEngine::open(EngineOptions {
        threads: Some(2),
        ..Default::default()
    })
    .unwrap();

    let rows = engine
        .execute("SELECT current_setting('threads') AS threads")
        .unwrap();
    assert_eq!(rows[0].get("threads").unwrap().as_i64(), Some(2));
}

#[test]
fn forks_share_metrics_and_observer() {
    let counter = Arc::new(AtomicUsize::new(0));

    struct Counting(Arc<AtomicUsize>);
    impl EngineObserver for Counting {
        fn on_event(&self, _event: &EngineEvent) {
            let _ = self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    let engine = DuckDbEngine::open(EngineOptions {
        observer: Some(Arc::new(Counting(counter.clone()))),
        ..Default::default()
    })
    .unwrap();
    engine
        .execute_batch("CREATE TABLE t(v INTEGER); INSERT INTO t VALUES (1), (2);")
        .unwrap();

    let fork = engine.fork().unwrap();
    let _ = engine.execute("SELECT count(*) AS count FROM t").unwrap();
    let _ = fork.execute("SELECT count(*) AS count FROM t").unwrap();

    let snap = engine.metrics().snapshot();
    assert_eq!(snap.queries_started, 2);
    assert_eq!(snap.queries_succeeded, 2);
    assert_eq!(snap.rows_returned, 2);
    // Two started + two succeeded events across both connections.
    assert_eq!(counter.load(Ordering::SeqCst), 4);
}

#[test]
fn forked_connection_sees_the_same_database() {
    let engine = DuckDbEngine::open(EngineOptions::default()).unwrap();
    engine
        .execute_batch("CREATE TABLE shared(v INTEGER); INSERT INTO shared VALUES (7);")
        .unwrap();

    let fork = engine.fork().unwrap();
    let rows = fork.execute("SELECT v FROM shared").unwrap();
    assert_eq!(rows[0].get("v").unwrap().as_i64(), Some(7));
}
