//! Statistic query builders and their row-to-result mappers.
//!
//! Each builder is a pure function from sanitized identifiers (plus, for the
//! histogram, a previously computed bucket count) to query text. All numeric
//! parameters are formatted as integer literals produced internally, so the
//! generated text is reproducible and can be asserted in tests. The paired
//! mappers turn raw [`Row`]s into the typed summary shapes; they are lenient
//! about missing fields and produce degenerate (null/empty) results instead
//! of failing.

use crate::sanitize::SafeIdentifier;
use crate::types::{
    HistogramBucket, NumericStatistics, Row, TimeRangeSummary, TopKEntry, Value,
};

/// Maximum number of top-K entries returned per column.
pub const TOP_K_LIMIT: u64 = 50;

/// Maximum number of histogram buckets per column.
pub const MAX_BUCKETS: u64 = 40;

/// Count of rows where the column is NULL.
pub fn null_count_sql(table: &SafeIdentifier, column: &SafeIdentifier) -> String {
    format!("SELECT count(*) AS count FROM {table} WHERE {column} IS NULL")
}

/// Min/max, reservoir quantiles, mean and population standard deviation in a
/// single round trip.
pub fn descriptive_statistics_sql(table: &SafeIdentifier, column: &SafeIdentifier) -> String {
    format!(
        "SELECT \
         min({column}) AS min, \
         reservoir_quantile({column}, 0.25) AS q25, \
         reservoir_quantile({column}, 0.5) AS q50, \
         reservoir_quantile({column}, 0.75) AS q75, \
         max({column}) AS max, \
         avg({column})::DOUBLE AS mean, \
         stddev_pop({column}) AS stddev_pop \
         FROM {table}"
    )
}

/// The most frequent (or highest-aggregate) values of the column.
///
/// `aggregate` is a caller-supplied aggregation expression ranking the
/// groups; the common case is `count(*)`, but e.g. `sum(weight)` gives
/// weighted counts.
pub fn top_k_sql(table: &SafeIdentifier, column: &SafeIdentifier, aggregate: &str) -> String {
    format!(
        "SELECT {column} AS value, {aggregate} AS count FROM {table} \
         GROUP BY {column} ORDER BY count DESC LIMIT {TOP_K_LIMIT}"
    )
}

/// Sketch-based approximate distinct-value count.
pub fn cardinality_sql(table: &SafeIdentifier, column: &SafeIdentifier) -> String {
    format!("SELECT approx_count_distinct({column}) AS count FROM {table}")
}

/// Min, max, and their difference in the column's native resolution.
pub fn time_range_sql(table: &SafeIdentifier, column: &SafeIdentifier) -> String {
    format!(
        "SELECT min({column}) AS min, max({column}) AS max, \
         max({column}) - min({column}) AS \"interval\" FROM {table}"
    )
}

/// The single-round-trip binning query for a precomputed bucket count.
///
/// Non-null values are first normalized to a linear numeric scale (epoch
/// seconds for temporal columns, a DOUBLE cast otherwise). Bucket boundaries
/// derive purely from the column min/max and the bucket index, so adjacent
/// buckets share boundaries exactly. Membership is counted over the half-open
/// interval `[low, high)`; the rows equal to the column maximum, which every
/// half-open bucket excludes, are added to the last bucket by index.
pub fn histogram_sql(
    table: &SafeIdentifier,
    column: &SafeIdentifier,
    temporal: bool,
    bucket_count: u64,
) -> String {
    debug_assert!(bucket_count > 0, "bucket_count must be > 0");
    let value_expr = if temporal {
        format!("epoch({column})")
    } else {
        format!("{column}::DOUBLE")
    };
    let last_bucket = bucket_count.saturating_sub(1);

    format!(
        "WITH data_table AS (\n\
         \x20 SELECT {value_expr} AS value FROM {table} WHERE {column} IS NOT NULL\n\
         ), stats AS (\n\
         \x20 SELECT min(value) AS min_val, max(value) AS max_val, \
         max(value) - min(value) AS range FROM data_table\n\
         ), buckets AS (\n\
         \x20 SELECT\n\
         \x20   range AS bucket,\n\
         \x20   (range) * (SELECT range FROM stats) / {bucket_count} + (SELECT min_val FROM stats) AS low,\n\
         \x20   (range + 1) * (SELECT range FROM stats) / {bucket_count} + (SELECT min_val FROM stats) AS high\n\
         \x20 FROM range(0, {bucket_count}, 1)\n\
         ), histogram_stage AS (\n\
         \x20 SELECT bucket, low, high, count(data_table.value) AS count\n\
         \x20 FROM buckets\n\
         \x20 LEFT JOIN data_table ON data_table.value >= low AND data_table.value < high\n\
         \x20 GROUP BY bucket, low, high\n\
         ), right_edge AS (\n\
         \x20 SELECT count(*) AS c FROM data_table WHERE value = (SELECT max_val FROM stats)\n\
         )\n\
         SELECT\n\
         \x20 bucket,\n\
         \x20 low,\n\
         \x20 high,\n\
         \x20 CASE WHEN bucket = {last_bucket} THEN count + (SELECT c FROM right_edge) ELSE count END AS count\n\
         FROM histogram_stage\n\
         ORDER BY bucket"
    )
}

/// Extract a single count from a one-row aggregate result.
pub fn map_count(rows: &[Row]) -> u64 {
    rows.first()
        .and_then(|r| r.get("count"))
        .and_then(Value::as_u64)
        .unwrap_or(0)
}

/// Map the descriptive-statistics record; all fields null for an empty table.
pub fn map_statistics(rows: &[Row]) -> NumericStatistics {
    let Some(row) = rows.first() else {
        return NumericStatistics::default();
    };
    let field = |name: &str| row.get(name).and_then(Value::as_f64);
    NumericStatistics {
        min: field("min"),
        q25: field("q25"),
        q50: field("q50"),
        q75: field("q75"),
        max: field("max"),
        mean: field("mean"),
        stddev_pop: field("stddev_pop"),
    }
}

/// Map top-K rows, preserving the engine's ordering.
pub fn map_top_k(rows: &[Row]) -> Vec<TopKEntry> {
    rows.iter()
        .map(|row| TopKEntry {
            value: row.get("value").cloned().unwrap_or(Value::Null),
            count: row.get("count").and_then(Value::as_f64).unwrap_or(0.0),
        })
        .collect()
}

/// Map the time-range record; all fields null for an empty table.
pub fn map_time_range(rows: &[Row]) -> TimeRangeSummary {
    let field = |name: &str| {
        rows.first()
            .and_then(|r| r.get(name))
            .cloned()
            .unwrap_or(Value::Null)
    };
    TimeRangeSummary {
        min: field("min"),
        max: field("max"),
        interval: field("interval"),
    }
}

/// Map binning rows into buckets, preserving index order.
pub fn map_histogram(rows: &[Row]) -> Vec<HistogramBucket> {
    rows.iter()
        .map(|row| HistogramBucket {
            index: row.get("bucket").and_then(Value::as_u64).unwrap_or(0),
            low: row.get("low").and_then(Value::as_f64).unwrap_or(0.0),
            high: row.get("high").and_then(Value::as_f64).unwrap_or(0.0),
            count: row.get("count").and_then(Value::as_u64).unwrap_or(0),
        })
        .collect()
}
