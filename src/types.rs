//! Core data model types for column profiling.
//!
//! The profiling layer speaks to the engine in terms of [`Row`]s of typed
//! [`Value`]s, and returns the summary shapes consumed by an exploration UI:
//! [`CategoricalSummary`], [`NumericStatistics`], [`HistogramBucket`] and
//! [`TimeRangeSummary`]. All summaries are ephemeral: they are built fresh per
//! profiling request and never cached by this crate.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Column types that receive the epoch conversion before histogram binning.
///
/// Matched case-insensitively against the declared column type so that
/// temporal values are binned on a linear numeric scale.
const TEMPORAL_TYPES: &[&str] = &[
    "TIMESTAMP",
    "TIMESTAMP WITH TIME ZONE",
    "TIMESTAMPTZ",
    "DATETIME",
    "DATE",
    "TIME",
];

/// A single typed value returned by the engine.
///
/// Engine types outside this surface (nested types, blobs, ...) map to
/// [`Value::Null`]; the generated profiling queries never project them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// Boolean.
    Boolean(bool),
    /// Any integer width, widened to 64 bits.
    Int64(i64),
    /// Any float width (or decimal), widened to 64 bits.
    Float64(f64),
    /// UTF-8 text.
    Text(String),
    /// Timestamp, microseconds since the Unix epoch.
    Timestamp(i64),
    /// Date, days since the Unix epoch.
    Date(i32),
    /// Time of day, microseconds since midnight.
    Time(i64),
    /// Duration between two temporal values.
    Interval { months: i32, days: i32, nanos: i64 },
}

impl Value {
    /// Whether this value is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Integer view of this value, if it is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Non-negative integer view of this value (counts, cardinalities).
    ///
    /// Negative integers clamp to zero rather than wrapping.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Int64(v) => Some((*v).max(0) as u64),
            _ => None,
        }
    }

    /// Numeric view of this value, widening integers to floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int64(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Text view of this value, if it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// One result row: an ordered mapping from field name to [`Value`].
///
/// Field set and order are determined by the query's projection. Column names
/// are shared across all rows of one result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    names: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    /// Create a row from shared column names and one value per column.
    ///
    /// # Panics
    ///
    /// Panics if `values` and `names` have different lengths.
    pub fn new(names: Arc<[String]>, values: Vec<Value>) -> Self {
        assert!(
            names.len() == values.len(),
            "row width {} does not match column count {}",
            values.len(),
            names.len()
        );
        Self { names, values }
    }

    /// Create a standalone row from `(name, value)` pairs.
    ///
    /// Handy for tests and for engine test doubles.
    pub fn from_pairs(pairs: Vec<(&str, Value)>) -> Self {
        let (names, values): (Vec<String>, Vec<Value>) =
            pairs.into_iter().map(|(n, v)| (n.to_string(), v)).unzip();
        Self {
            names: names.into(),
            values,
        }
    }

    /// Look up a value by field name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let idx = self.names.iter().position(|n| n == name)?;
        self.values.get(idx)
    }

    /// Column names, in projection order.
    pub fn columns(&self) -> &[String] {
        &self.names
    }

    /// Values, in projection order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

/// Identifies the column to profile.
///
/// Supplied by the caller from prior schema introspection; the names are still
/// validated by [`crate::sanitize::sanitize`] before being embedded into any
/// query text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnIdentity {
    /// Table holding the column.
    pub table: String,
    /// Column name.
    pub column: String,
    /// Declared column type, as reported by the engine (e.g. `BIGINT`,
    /// `TIMESTAMP`).
    pub column_type: String,
}

impl ColumnIdentity {
    /// Create a column identity.
    pub fn new(
        table: impl Into<String>,
        column: impl Into<String>,
        column_type: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            column_type: column_type.into(),
        }
    }

    /// Whether the declared type is in the temporal family.
    ///
    /// Temporal columns are converted to epoch seconds before histogram
    /// binning so ranges are computed on a linear numeric scale.
    pub fn is_temporal(&self) -> bool {
        let ty = self.column_type.trim().to_ascii_uppercase();
        TEMPORAL_TYPES.contains(&ty.as_str())
    }
}

/// One entry of a top-K summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopKEntry {
    /// The column value (NULL groups are included).
    pub value: Value,
    /// Aggregate for the group; a row count unless the caller supplied a
    /// different aggregation expression.
    pub count: f64,
}

/// Top-K values plus approximate distinct count for a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalSummary {
    /// At most 50 entries, ordered by `count` descending.
    pub top_k: Vec<TopKEntry>,
    /// Approximate distinct-value count (sketch-based).
    pub cardinality: u64,
}

/// Descriptive statistics for a numeric column.
///
/// All fields are `None` when the column has no non-null values. Otherwise
/// `min <= q25 <= q50 <= q75 <= max`. Quantiles are reservoir-sampled
/// estimates, not exact order statistics.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NumericStatistics {
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub q50: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    /// Population standard deviation.
    pub stddev_pop: Option<f64>,
}

/// One histogram bucket over the half-open interval `[low, high)`.
///
/// Adjacent buckets share boundaries exactly: `bucket[i].high ==
/// bucket[i+1].low`. The final bucket's count includes rows equal to the
/// column maximum (right-edge correction).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBucket {
    /// Zero-based bucket index.
    pub index: u64,
    /// Inclusive lower bound.
    pub low: f64,
    /// Exclusive upper bound.
    pub high: f64,
    /// Rows falling in this bucket.
    pub count: u64,
}

/// Minimum, maximum, and their difference for a temporal column.
///
/// Values are returned in the column's native resolution: `interval` is an
/// [`Value::Interval`] for timestamps and an integer day count for dates. All
/// fields are [`Value::Null`] for an empty table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRangeSummary {
    pub min: Value,
    pub max: Value,
    /// Exactly `max - min`, computed by the engine in the same round trip.
    pub interval: Value,
}
