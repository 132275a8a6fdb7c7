//! Execution gateway to the embedded query engine.
//!
//! This module is the sole channel between the profiling layer and the
//! engine: it accepts a query string and returns named-field [`Row`]s, or a
//! [`ProfileError::Engine`] carrying the backend's diagnostic. It performs no
//! client-side serialization or locking; intra-query parallelism comes from
//! the engine's own worker pool, and concurrent use across threads goes
//! through [`DuckDbEngine::fork`] (the binding is one connection per thread).
//!
//! Instrumentation hooks (busy/idle signaling) fire strictly before and after
//! each query and can never alter its outcome.

mod observer;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use duckdb::types::ValueRef;
use duckdb::Connection;

use crate::error::{ProfileError, ProfileResult};
use crate::types::{Row, Value};

pub use observer::{
    CompositeEngineObserver, EngineEvent, EngineMetrics, EngineMetricsSnapshot, EngineObserver,
    StdErrEngineObserver,
};

/// Capability to submit a query string and receive named-field rows.
///
/// The trait is object-safe so tests can substitute an engine double.
pub trait QueryExecutor {
    /// Execute `sql` and return all result rows.
    fn execute(&self, sql: &str) -> ProfileResult<Vec<Row>>;
}

/// Configuration for [`DuckDbEngine::open`].
#[derive(Clone)]
pub struct EngineOptions {
    /// Database file to open. `None` opens an in-memory database.
    pub database: Option<PathBuf>,
    /// Size of the engine's worker pool for intra-query parallelism
    /// (`SET threads`). `None` keeps the engine default.
    pub threads: Option<usize>,
    /// Construct a disabled engine that opens no database. Supports test
    /// doubles in compositions where the gateway is swapped out; executing a
    /// query on a skipped engine fails with [`ProfileError::Engine`].
    pub skip: bool,
    /// Optional observer for busy/idle instrumentation.
    pub observer: Option<Arc<dyn EngineObserver>>,
}

impl fmt::Debug for EngineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineOptions")
            .field("database", &self.database)
            .field("threads", &self.threads)
            .field("skip", &self.skip)
            .field("observer_set", &self.observer.is_some())
            .finish()
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            database: None,
            threads: None,
            skip: false,
            observer: None,
        }
    }
}

/// An owned handle to the embedded engine.
///
/// Constructed once by the composition root and passed by reference into the
/// profiling operations. There is no hidden global state: dropping (or
/// [`close`](Self::close)-ing) the handle tears the connection down.
pub struct DuckDbEngine {
    conn: Option<Connection>,
    observer: Option<Arc<dyn EngineObserver>>,
    metrics: Arc<EngineMetrics>,
}

impl fmt::Debug for DuckDbEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DuckDbEngine")
            .field("connected", &self.conn.is_some())
            .field("observer_set", &self.observer.is_some())
            .finish()
    }
}

impl DuckDbEngine {
    /// Open an engine per `options`.
    ///
    /// With `options.skip` set, no database is opened and every
    /// [`execute`](QueryExecutor::execute) call fails.
    pub fn open(options: EngineOptions) -> ProfileResult<Self> {
        let conn = if options.skip {
            None
        } else {
            let conn = match &options.database {
                Some(path) => Connection::open(path),
                None => Connection::open_in_memory(),
            }
            .map_err(engine_error)?;
            if let Some(n) = options.threads {
                conn.execute_batch(&format!("SET threads TO {n};"))
                    .map_err(engine_error)?;
            }
            Some(conn)
        };

        Ok(Self {
            conn,
            observer: options.observer,
            metrics: Arc::new(EngineMetrics::new()),
        })
    }

    /// Clone the connection for use from another thread.
    ///
    /// The fork shares this handle's observer and metrics, so instrumentation
    /// and totals span all forks. Forking a skipped engine yields another
    /// skipped engine.
    pub fn fork(&self) -> ProfileResult<Self> {
        let conn = match &self.conn {
            Some(c) => Some(c.try_clone().map_err(engine_error)?),
            None => None,
        };
        Ok(Self {
            conn,
            observer: self.observer.clone(),
            metrics: Arc::clone(&self.metrics),
        })
    }

    /// Handle to the cumulative gateway metrics.
    pub fn metrics(&self) -> Arc<EngineMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Run a batch of statements without materializing rows.
    ///
    /// Intended for setup (table creation, pragmas); bypasses the busy/idle
    /// instrumentation of the query path.
    pub fn execute_batch(&self, sql: &str) -> ProfileResult<()> {
        let conn = self.connection()?;
        conn.execute_batch(sql).map_err(engine_error)
    }

    /// Shut the engine down explicitly.
    pub fn close(self) -> ProfileResult<()> {
        if let Some(conn) = self.conn {
            conn.close().map_err(|(_, e)| engine_error(e))?;
        }
        Ok(())
    }

    fn connection(&self) -> ProfileResult<&Connection> {
        self.conn.as_ref().ok_or_else(|| ProfileError::Engine {
            message: "engine disabled by configuration (skip)".to_string(),
        })
    }

    fn run(&self, sql: &str) -> ProfileResult<Vec<Row>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(sql).map_err(engine_error)?;
        let mut rows = stmt.query([]).map_err(engine_error)?;

        let names: Arc<[String]> = rows
            .as_ref()
            .map(|st| {
                st.column_names()
                    .iter()
                    .map(|s| s.to_string())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default()
            .into();

        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(engine_error)? {
            let mut values = Vec::with_capacity(names.len());
            for idx in 0..names.len() {
                values.push(value_from_ref(row.get_ref(idx).map_err(engine_error)?));
            }
            out.push(Row::new(Arc::clone(&names), values));
        }
        Ok(out)
    }

    fn emit(&self, event: EngineEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

impl QueryExecutor for DuckDbEngine {
    fn execute(&self, sql: &str) -> ProfileResult<Vec<Row>> {
        let start = Instant::now();
        self.metrics.on_query_start();
        self.emit(EngineEvent::QueryStarted {
            sql: sql.to_string(),
        });

        let result = self.run(sql);

        let elapsed = start.elapsed();
        match &result {
            Ok(rows) => {
                self.metrics.on_query_success(rows.len(), elapsed);
                self.emit(EngineEvent::QuerySucceeded {
                    rows: rows.len(),
                    elapsed,
                });
            }
            Err(e) => {
                self.metrics.on_query_failure(elapsed);
                self.emit(EngineEvent::QueryFailed {
                    message: e.to_string(),
                    elapsed,
                });
            }
        }
        result
    }
}

fn engine_error(e: duckdb::Error) -> ProfileError {
    ProfileError::Engine {
        message: e.to_string(),
    }
}

/// Map an engine cell to the crate's [`Value`] surface.
///
/// Integer widths widen to 64 bits; decimals widen to floats; temporal values
/// normalize to microseconds. Types outside the profiling surface map to NULL.
fn value_from_ref(v: ValueRef<'_>) -> Value {
    match v {
        ValueRef::Null => Value::Null,
        ValueRef::Boolean(b) => Value::Boolean(b),
        ValueRef::TinyInt(i) => Value::Int64(i64::from(i)),
        ValueRef::SmallInt(i) => Value::Int64(i64::from(i)),
        ValueRef::Int(i) => Value::Int64(i64::from(i)),
        ValueRef::BigInt(i) => Value::Int64(i),
        ValueRef::HugeInt(i) => Value::Int64(clamp_i128(i)),
        ValueRef::UTinyInt(u) => Value::Int64(i64::from(u)),
        ValueRef::USmallInt(u) => Value::Int64(i64::from(u)),
        ValueRef::UInt(u) => Value::Int64(i64::from(u)),
        ValueRef::UBigInt(u) => Value::Int64(i64::try_from(u).unwrap_or(i64::MAX)),
        ValueRef::Float(f) => Value::Float64(f64::from(f)),
        ValueRef::Double(f) => Value::Float64(f),
        ValueRef::Decimal(d) => d
            .to_string()
            .parse::<f64>()
            .map(Value::Float64)
            .unwrap_or(Value::Null),
        ValueRef::Timestamp(unit, t) => Value::Timestamp(to_micros(unit, t)),
        ValueRef::Date32(d) => Value::Date(d),
        ValueRef::Time64(unit, t) => Value::Time(to_micros(unit, t)),
        ValueRef::Interval {
            months,
            days,
            nanos,
        } => Value::Interval {
            months,
            days,
            nanos,
        },
        ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        _ => Value::Null,
    }
}

fn to_micros(unit: duckdb::types::TimeUnit, t: i64) -> i64 {
    use duckdb::types::TimeUnit;
    match unit {
        TimeUnit::Second => t.saturating_mul(1_000_000),
        TimeUnit::Millisecond => t.saturating_mul(1_000),
        TimeUnit::Microsecond => t,
        TimeUnit::Nanosecond => t / 1_000,
    }
}

fn clamp_i128(v: i128) -> i64 {
    i64::try_from(v).unwrap_or(if v < 0 { i64::MIN } else { i64::MAX })
}

#[cfg(test)]
mod tests {
    use super::{DuckDbEngine, EngineOptions, QueryExecutor};
    use crate::error::ProfileError;
    use crate::types::Value;

    #[test]
    fn skip_engine_fails_to_execute_without_a_database() {
        let engine = DuckDbEngine::open(EngineOptions {
            skip: true,
            ..Default::default()
        })
        .unwrap();

        match engine.execute("SELECT 1") {
            Err(ProfileError::Engine { message }) => assert!(message.contains("skip")),
            other => panic!("expected Engine error, got {other:?}"),
        }
    }

    #[test]
    fn fork_of_skip_engine_is_also_skipped() {
        let engine = DuckDbEngine::open(EngineOptions {
            skip: true,
            ..Default::default()
        })
        .unwrap();
        let fork = engine.fork().unwrap();
        assert!(fork.execute("SELECT 1").is_err());
    }

    #[test]
    fn execute_returns_named_fields_in_projection_order() {
        let engine = DuckDbEngine::open(EngineOptions::default()).unwrap();
        let rows = engine.execute("SELECT 1 AS a, 'x' AS b").unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].columns(), ["a", "b"]);
        assert_eq!(rows[0].get("a"), Some(&Value::Int64(1)));
        assert_eq!(rows[0].get("b"), Some(&Value::Text("x".to_string())));
    }

    #[test]
    fn engine_failures_carry_the_backend_diagnostic() {
        let engine = DuckDbEngine::open(EngineOptions::default()).unwrap();
        let err = engine.execute("SELECT * FROM no_such_table").unwrap_err();
        match err {
            ProfileError::Engine { message } => assert!(message.contains("no_such_table")),
            other => panic!("expected Engine error, got {other:?}"),
        }
    }
}
