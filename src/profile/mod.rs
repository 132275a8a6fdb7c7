//! Column profiling operations.
//!
//! One public operation per statistic kind, mirroring the round trips each
//! requires:
//!
//! - [`null_count()`]: one round trip
//! - [`descriptive_statistics()`]: one round trip
//! - [`numeric_histogram()`]: two round trips (distinct count, then binning)
//! - [`top_k_and_cardinality()`]: two independent round trips
//! - [`time_range()`]: one round trip
//!
//! [`profile_column`] composes the requested kinds into one [`ColumnProfile`];
//! it fails as a whole if any underlying query fails. Callers that want
//! partial results request statistic kinds independently.

pub mod histogram;
pub mod queries;

use serde::{Deserialize, Serialize};

use crate::engine::{DuckDbEngine, QueryExecutor};
use crate::error::ProfileResult;
use crate::sanitize::sanitize;
use crate::types::{
    CategoricalSummary, ColumnIdentity, HistogramBucket, NumericStatistics, TimeRangeSummary,
};

pub use histogram::numeric_histogram;

/// The statistic kinds a profile request can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatisticKind {
    NullCount,
    DescriptiveStatistics,
    NumericHistogram,
    TopK,
    TimeRange,
}

/// Options controlling profile computation.
///
/// Use [`Default`] for common cases.
#[derive(Debug, Clone, Default)]
pub struct ProfileOptions {
    /// Aggregation expression ranking top-K groups; defaults to `count(*)`.
    ///
    /// This is the one caller-supplied fragment embedded into query text
    /// verbatim; it exists so callers can rank by e.g. `sum(weight)`.
    pub top_k_aggregate: Option<String>,
}

/// The assembled profile for one column.
///
/// Each slot is `Some` exactly for the requested statistic kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub column: ColumnIdentity,
    pub null_count: Option<u64>,
    pub statistics: Option<NumericStatistics>,
    pub histogram: Option<Vec<HistogramBucket>>,
    pub categorical: Option<CategoricalSummary>,
    pub time_range: Option<TimeRangeSummary>,
}

/// Count of rows where the column is NULL.
pub fn null_count<E: QueryExecutor + ?Sized>(
    engine: &E,
    column: &ColumnIdentity,
) -> ProfileResult<u64> {
    let table = sanitize(&column.table)?;
    let col = sanitize(&column.column)?;
    let rows = engine.execute(&queries::null_count_sql(&table, &col))?;
    Ok(queries::map_count(&rows))
}

/// Descriptive statistics for a numeric column.
///
/// All fields are `None` when the column has no non-null values.
pub fn descriptive_statistics<E: QueryExecutor + ?Sized>(
    engine: &E,
    column: &ColumnIdentity,
) -> ProfileResult<NumericStatistics> {
    let table = sanitize(&column.table)?;
    let col = sanitize(&column.column)?;
    let rows = engine.execute(&queries::descriptive_statistics_sql(&table, &col))?;
    Ok(queries::map_statistics(&rows))
}

/// Top-K values plus approximate cardinality.
///
/// Two independent round trips; their relative order carries no meaning. The
/// `aggregate` expression defaults to `count(*)`.
pub fn top_k_and_cardinality<E: QueryExecutor + ?Sized>(
    engine: &E,
    column: &ColumnIdentity,
    aggregate: Option<&str>,
) -> ProfileResult<CategoricalSummary> {
    let table = sanitize(&column.table)?;
    let col = sanitize(&column.column)?;

    let top_rows = engine.execute(&queries::top_k_sql(
        &table,
        &col,
        aggregate.unwrap_or("count(*)"),
    ))?;
    let card_rows = engine.execute(&queries::cardinality_sql(&table, &col))?;

    Ok(CategoricalSummary {
        top_k: queries::map_top_k(&top_rows),
        cardinality: queries::map_count(&card_rows),
    })
}

/// Min, max, and interval for a temporal column.
pub fn time_range<E: QueryExecutor + ?Sized>(
    engine: &E,
    column: &ColumnIdentity,
) -> ProfileResult<TimeRangeSummary> {
    let table = sanitize(&column.table)?;
    let col = sanitize(&column.column)?;
    let rows = engine.execute(&queries::time_range_sql(&table, &col))?;
    Ok(queries::map_time_range(&rows))
}

/// Compute the requested statistic kinds for one column.
///
/// Identifiers are validated before any query is issued. The kinds are
/// computed independently (no kind's output feeds another), but the profile
/// fails as a whole on the first failure; there is no partial result.
pub fn profile_column<E: QueryExecutor + ?Sized>(
    engine: &E,
    column: &ColumnIdentity,
    kinds: &[StatisticKind],
    options: &ProfileOptions,
) -> ProfileResult<ColumnProfile> {
    sanitize(&column.table)?;
    sanitize(&column.column)?;

    let mut profile = ColumnProfile {
        column: column.clone(),
        null_count: None,
        statistics: None,
        histogram: None,
        categorical: None,
        time_range: None,
    };

    for kind in kinds {
        match kind {
            StatisticKind::NullCount => {
                profile.null_count = Some(null_count(engine, column)?);
            }
            StatisticKind::DescriptiveStatistics => {
                profile.statistics = Some(descriptive_statistics(engine, column)?);
            }
            StatisticKind::NumericHistogram => {
                profile.histogram = Some(numeric_histogram(engine, column)?);
            }
            StatisticKind::TopK => {
                profile.categorical = Some(top_k_and_cardinality(
                    engine,
                    column,
                    options.top_k_aggregate.as_deref(),
                )?);
            }
            StatisticKind::TimeRange => {
                profile.time_range = Some(time_range(engine, column)?);
            }
        }
    }

    Ok(profile)
}

/// Profile several columns of a table in parallel.
///
/// Forks one engine connection per column (the binding is one connection per
/// thread) and fans out with rayon; the engine's observer and metrics are
/// shared across forks. Profiles come back in input order; any single failure
/// fails the whole call.
pub fn profile_table(
    engine: &DuckDbEngine,
    columns: &[ColumnIdentity],
    kinds: &[StatisticKind],
    options: &ProfileOptions,
) -> ProfileResult<Vec<ColumnProfile>> {
    use rayon::prelude::*;

    let forks = columns
        .iter()
        .map(|_| engine.fork())
        .collect::<ProfileResult<Vec<_>>>()?;

    forks
        .into_par_iter()
        .zip(columns.par_iter())
        .map(|(local, column)| profile_column(&local, column, kinds, options))
        .collect()
}
