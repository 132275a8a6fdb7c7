//! Adaptive histogram binning.
//!
//! Bucket count adapts to the column's approximate distinct count: a column
//! with few distinct values gets one bucket per value, capped at
//! [`queries::MAX_BUCKETS`]. Columns with no non-null values produce an empty
//! bucket sequence without issuing the binning query, so the boundary
//! arithmetic never divides by zero.

use crate::engine::QueryExecutor;
use crate::error::ProfileResult;
use crate::profile::queries;
use crate::sanitize::sanitize;
use crate::types::{ColumnIdentity, HistogramBucket};

/// Compute the adaptive histogram for a column.
///
/// Two round trips: the approximate distinct count determines the bucket
/// count `min(40, d)`, then a single binning query computes boundaries and
/// per-bucket membership. Temporal columns are normalized to epoch seconds
/// before binning. The two queries may observe different table states; no
/// cross-round-trip consistency is guaranteed.
pub fn numeric_histogram<E: QueryExecutor + ?Sized>(
    engine: &E,
    column: &ColumnIdentity,
) -> ProfileResult<Vec<HistogramBucket>> {
    let table = sanitize(&column.table)?;
    let col = sanitize(&column.column)?;

    let rows = engine.execute(&queries::cardinality_sql(&table, &col))?;
    let distinct = queries::map_count(&rows);
    let bucket_count = distinct.min(queries::MAX_BUCKETS);
    if bucket_count == 0 {
        return Ok(Vec::new());
    }

    let sql = queries::histogram_sql(&table, &col, column.is_temporal(), bucket_count);
    let rows = engine.execute(&sql)?;
    Ok(queries::map_histogram(&rows))
}

#[cfg(test)]
mod tests {
    use super::numeric_histogram;
    use crate::engine::QueryExecutor;
    use crate::error::{ProfileError, ProfileResult};
    use crate::types::{ColumnIdentity, Row, Value};
    use std::sync::Mutex;

    /// Replays canned cardinality results and records every submitted query.
    struct FakeEngine {
        distinct: i64,
        queries: Mutex<Vec<String>>,
    }

    impl FakeEngine {
        fn new(distinct: i64) -> Self {
            Self {
                distinct,
                queries: Mutex::new(Vec::new()),
            }
        }

        fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    impl QueryExecutor for FakeEngine {
        fn execute(&self, sql: &str) -> ProfileResult<Vec<Row>> {
            self.queries.lock().unwrap().push(sql.to_string());
            if sql.contains("approx_count_distinct") {
                Ok(vec![Row::from_pairs(vec![(
                    "count",
                    Value::Int64(self.distinct),
                )])])
            } else {
                Ok(Vec::new())
            }
        }
    }

    fn numeric_column() -> ColumnIdentity {
        ColumnIdentity::new("events", "amount", "DOUBLE")
    }

    #[test]
    fn zero_distinct_count_skips_the_binning_query() {
        let engine = FakeEngine::new(0);
        let buckets = numeric_histogram(&engine, &numeric_column()).unwrap();

        assert!(buckets.is_empty());
        assert_eq!(engine.queries().len(), 1);
    }

    #[test]
    fn bucket_count_is_capped_at_forty() {
        let engine = FakeEngine::new(5_000);
        let _ = numeric_histogram(&engine, &numeric_column()).unwrap();

        let queries = engine.queries();
        assert_eq!(queries.len(), 2);
        assert!(queries[1].contains("range(0, 40, 1)"));
        assert!(queries[1].contains("CASE WHEN bucket = 39"));
    }

    #[test]
    fn bucket_count_follows_small_distinct_counts() {
        let engine = FakeEngine::new(5);
        let _ = numeric_histogram(&engine, &numeric_column()).unwrap();
        assert!(engine.queries()[1].contains("range(0, 5, 1)"));
    }

    #[test]
    fn temporal_columns_are_normalized_to_epoch() {
        let engine = FakeEngine::new(3);
        let column = ColumnIdentity::new("events", "created_at", "TIMESTAMP");
        let _ = numeric_histogram(&engine, &column).unwrap();
        assert!(engine.queries()[1].contains("epoch(\"created_at\") AS value"));
    }

    #[test]
    fn invalid_column_fails_before_any_query() {
        let engine = FakeEngine::new(3);
        let column = ColumnIdentity::new("events", "bad\"name", "DOUBLE");
        let err = numeric_histogram(&engine, &column).unwrap_err();

        assert!(matches!(err, ProfileError::InvalidIdentifier { .. }));
        assert!(engine.queries().is_empty());
    }
}
