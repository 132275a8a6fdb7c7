//! Source loading: register files as queryable engine tables.
//!
//! Profiling targets are named tables inside the engine; this module is how a
//! file on disk becomes one. Parsing is delegated to the engine's native
//! readers, so loading is a single `CREATE OR REPLACE TABLE ... AS SELECT`
//! round trip through the gateway.
//!
//! - If [`LoadOptions::format`] is `None`, the format is inferred from the
//!   file extension.
//! - The target table name passes the identifier sanitizer; the path is
//!   embedded as a single-quoted SQL literal with internal quotes doubled.

use std::path::Path;

use crate::engine::QueryExecutor;
use crate::error::{ProfileError, ProfileResult};
use crate::profile::queries;
use crate::sanitize::sanitize;

/// Supported source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Comma-separated values.
    Csv,
    /// Apache Parquet.
    Parquet,
    /// JSON array-of-objects or NDJSON.
    Json,
}

impl SourceFormat {
    /// Parse a source format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "parquet" | "pq" => Some(Self::Parquet),
            "json" | "ndjson" => Some(Self::Json),
            _ => None,
        }
    }

    fn reader_function(self) -> &'static str {
        match self {
            Self::Csv => "read_csv_auto",
            Self::Parquet => "read_parquet",
            Self::Json => "read_json_auto",
        }
    }
}

/// Options controlling source loading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// If `None`, auto-detect format from the file extension.
    pub format: Option<SourceFormat>,
}

/// Load a file into the engine as table `table`, replacing any existing table
/// of that name. Returns the number of rows loaded.
pub fn load_table<E: QueryExecutor + ?Sized>(
    engine: &E,
    table: &str,
    path: impl AsRef<Path>,
    options: &LoadOptions,
) -> ProfileResult<u64> {
    let path = path.as_ref();
    let table = sanitize(table)?;
    let format = match options.format {
        Some(f) => f,
        None => infer_format_from_path(path)?,
    };

    let path_literal = path_literal(path)?;
    engine.execute(&format!(
        "CREATE OR REPLACE TABLE {table} AS SELECT * FROM {reader}({path_literal})",
        reader = format.reader_function(),
    ))?;

    let rows = engine.execute(&format!("SELECT count(*) AS count FROM {table}"))?;
    Ok(queries::map_count(&rows))
}

fn infer_format_from_path(path: &Path) -> ProfileResult<SourceFormat> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ProfileError::UnsupportedSource {
            message: format!(
                "cannot infer format: path has no extension ({})",
                path.display()
            ),
        })?;

    SourceFormat::from_extension(ext).ok_or_else(|| ProfileError::UnsupportedSource {
        message: format!(
            "cannot infer format from extension '{ext}' for path ({})",
            path.display()
        ),
    })
}

fn path_literal(path: &Path) -> ProfileResult<String> {
    let s = path.to_str().ok_or_else(|| ProfileError::UnsupportedSource {
        message: format!("path is not valid UTF-8 ({})", path.display()),
    })?;
    Ok(format!("'{}'", s.replace('\'', "''")))
}
