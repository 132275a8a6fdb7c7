//! `column-profiler` computes per-column statistical profiles for tables in an
//! embedded DuckDB engine, by generating analytical SQL and mapping the result
//! rows into typed summaries. The profiles are the shapes a data-exploration
//! UI renders: null counts, descriptive statistics, adaptive histograms,
//! top-K values with approximate cardinality, and time ranges.
//!
//! ## What a profile contains
//!
//! Per requested [`profile::StatisticKind`]:
//!
//! - **Null count**: rows where the column is NULL.
//! - **Descriptive statistics** ([`types::NumericStatistics`]): min/max, mean,
//!   population standard deviation, and reservoir-sampled quartiles.
//! - **Adaptive histogram** ([`types::HistogramBucket`]): bucket count adapts
//!   to the column's approximate distinct count, capped at 40; temporal
//!   columns are binned on an epoch-seconds scale.
//! - **Top-K + cardinality** ([`types::CategoricalSummary`]): the 50 most
//!   frequent values (or highest by a caller-supplied aggregate) plus a
//!   sketch-based distinct count.
//! - **Time range** ([`types::TimeRangeSummary`]): min, max, and `max - min`
//!   in the column's native resolution.
//!
//! ## Quick example: load a file and profile a column
//!
//! ```no_run
//! use column_profiler::engine::{DuckDbEngine, EngineOptions};
//! use column_profiler::ingestion::{load_table, LoadOptions};
//! use column_profiler::profile::{profile_column, ProfileOptions, StatisticKind};
//! use column_profiler::types::ColumnIdentity;
//!
//! # fn main() -> Result<(), column_profiler::ProfileError> {
//! let engine = DuckDbEngine::open(EngineOptions::default())?;
//! load_table(&engine, "events", "events.csv", &LoadOptions::default())?;
//!
//! let column = ColumnIdentity::new("events", "amount", "DOUBLE");
//! let profile = profile_column(
//!     &engine,
//!     &column,
//!     &[
//!         StatisticKind::NullCount,
//!         StatisticKind::DescriptiveStatistics,
//!         StatisticKind::NumericHistogram,
//!     ],
//!     &ProfileOptions::default(),
//! )?;
//! println!("nulls={:?} buckets={}", profile.null_count, profile.histogram.unwrap().len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Profiling many columns in parallel
//!
//! ```no_run
//! use column_profiler::engine::{DuckDbEngine, EngineOptions};
//! use column_profiler::profile::{profile_table, ProfileOptions, StatisticKind};
//! use column_profiler::types::ColumnIdentity;
//!
//! # fn main() -> Result<(), column_profiler::ProfileError> {
//! // Give the engine a fixed-size worker pool for intra-query parallelism.
//! let engine = DuckDbEngine::open(EngineOptions {
//!     threads: Some(4),
//!     ..Default::default()
//! })?;
//!
//! let columns = vec![
//!     ColumnIdentity::new("events", "amount", "DOUBLE"),
//!     ColumnIdentity::new("events", "country", "VARCHAR"),
//!     ColumnIdentity::new("events", "created_at", "TIMESTAMP"),
//! ];
//! let profiles = profile_table(
//!     &engine,
//!     &columns,
//!     &[StatisticKind::NullCount, StatisticKind::TopK],
//!     &ProfileOptions::default(),
//! )?;
//! println!("profiled {} columns", profiles.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Consistency and failure model
//!
//! A single profile takes several round trips; if the table mutates in
//! between, the pieces may reflect different table states. That is accepted
//! for the intended read-mostly analytical workload. A profile request either
//! fully succeeds or fails as a whole: sanitizer rejections
//! ([`ProfileError::InvalidIdentifier`]) surface before any query is sent,
//! and engine failures ([`ProfileError::Engine`]) propagate verbatim with no
//! retries. Empty or all-null columns are not errors; they produce all-null
//! statistics and an empty histogram.
//!
//! ## Modules
//!
//! - [`engine`]: execution gateway (the sole channel to the engine) with
//!   busy/idle instrumentation and metrics
//! - [`profile`]: statistic query builders, the adaptive binning algorithm,
//!   and the profile aggregator
//! - [`ingestion`]: register CSV/Parquet/JSON files as engine tables
//! - [`sanitize`]: identifier validation for generated query text
//! - [`types`]: row/value surface and the summary types
//! - [`error`]: error types used across the crate

pub mod engine;
pub mod error;
pub mod ingestion;
pub mod profile;
pub mod sanitize;
pub mod types;

pub use error::{ProfileError, ProfileResult};
