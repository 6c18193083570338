//! Collision CSV Loader Module
//! Reads the collision CSV with Polars, normalizes it, and caches one table
//! per row limit.

use polars::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Canonical column names after normalization.
pub const DATE_TIME: &str = "date_time";
pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";
pub const PERSONS_INJURED: &str = "number_of_persons_injured";
pub const PEDESTRIANS_INJURED: &str = "number_of_pedestrians_injured";
pub const CYCLISTS_INJURED: &str = "number_of_cyclist_injured";
pub const MOTORISTS_INJURED: &str = "number_of_motorist_injured";
pub const PERSONS_KILLED: &str = "number_of_persons_killed";
pub const ON_STREET_NAME: &str = "on_street_name";

/// Source column pair merged into [`DATE_TIME`] during load.
const CRASH_DATE: &str = "crash_date";
const CRASH_TIME: &str = "crash_time";
const DATE_TIME_FORMAT: &str = "%m/%d/%Y %H:%M";

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("collision data unavailable: {0}")]
    DataUnavailable(#[from] PolarsError),
    #[error("collision data is missing required column '{0}'")]
    MissingColumn(String),
}

/// Lowercase a source column name and replace spaces with underscores.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// Memoized store of normalized collision tables, keyed by row limit.
///
/// Tables are immutable once loaded; every downstream view derives new frames
/// from them. There is no invalidation: a different source file means a new
/// store.
pub struct CollisionStore {
    path: PathBuf,
    tables: HashMap<usize, Arc<DataFrame>>,
}

impl CollisionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tables: HashMap::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load at most `row_limit` rows, returning the cached table when the
    /// same limit was loaded before. A failed load leaves the cache as it was.
    pub fn load(&mut self, row_limit: usize) -> Result<Arc<DataFrame>, LoadError> {
        if let Some(table) = self.tables.get(&row_limit) {
            debug!(row_limit, rows = table.height(), "collision table cache hit");
            return Ok(Arc::clone(table));
        }

        let table = Arc::new(read_collisions(&self.path, row_limit)?);
        info!(
            row_limit,
            rows = table.height(),
            path = %self.path.display(),
            "loaded collision table"
        );
        self.tables.insert(row_limit, Arc::clone(&table));
        Ok(table)
    }
}

/// Read and normalize the source CSV.
///
/// Column names are lowercased with spaces replaced by underscores, the
/// crash date/time pair is merged into a single `date_time` column (unparseable
/// values become null rather than failing the load), and rows missing either
/// coordinate are dropped.
fn read_collisions(path: &Path, row_limit: usize) -> Result<DataFrame, LoadError> {
    let path_str = path.to_string_lossy().to_string();

    let mut df = LazyCsvReader::new(&path_str)
        .with_n_rows(Some(row_limit))
        .with_infer_schema_length(Some(10000))
        .with_ignore_errors(true)
        .finish()?
        .collect()?;

    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| normalize_name(name))
        .collect();
    df.set_column_names(names)?;

    for required in [CRASH_DATE, CRASH_TIME, LATITUDE, LONGITUDE] {
        if df.column(required).is_err() {
            return Err(LoadError::MissingColumn(required.to_string()));
        }
    }

    let rows_read = df.height();
    let table = df
        .lazy()
        .with_columns([concat_str([col(CRASH_DATE), col(CRASH_TIME)], " ", true)
            .str()
            .to_datetime(
                Some(TimeUnit::Milliseconds),
                None,
                StrptimeOptions {
                    format: Some(DATE_TIME_FORMAT.into()),
                    strict: false,
                    exact: true,
                    cache: true,
                },
                lit("raise"),
            )
            .alias(DATE_TIME)])
        .with_columns([
            col(LATITUDE).cast(DataType::Float64),
            col(LONGITUDE).cast(DataType::Float64),
        ])
        .drop_nulls(Some(vec![col(LATITUDE), col(LONGITUDE)]))
        .collect()?;
    let table = table.drop_many([CRASH_DATE, CRASH_TIME]);

    debug!(
        rows_read,
        rows_kept = table.height(),
        "dropped rows without coordinates"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Arc;
    use tempfile::TempDir;

    const HEADER: &str = "CRASH DATE,CRASH TIME,LATITUDE,LONGITUDE,\
NUMBER OF PERSONS INJURED,NUMBER OF PERSONS KILLED,ON STREET NAME";

    fn write_csv(dir: &TempDir, rows: &[&str]) -> std::path::PathBuf {
        let path = dir.path().join("collisions.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        for row in rows {
            writeln!(file, "{}", row).unwrap();
        }
        path
    }

    fn sample_rows() -> Vec<&'static str> {
        vec![
            "09/21/2019,13:05,40.701,-73.881,2,0,MAIN STREET",
            "09/21/2019,13:47,,-73.900,1,0,OAK AVENUE",
            "12/02/2020,4:15,40.650,-73.950,0,1,BROADWAY",
        ]
    }

    #[test]
    fn load_normalizes_and_drops_missing_coordinates() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, &sample_rows());

        let mut store = CollisionStore::new(&path);
        let table = store.load(100).unwrap();

        // Row without latitude is gone.
        assert_eq!(table.height(), 2);
        let lat = table.column(LATITUDE).unwrap().f64().unwrap();
        assert!((0..table.height()).all(|i| lat.get(i).is_some()));

        // Names normalized, source pair replaced by the merged column.
        assert!(table.column(PERSONS_INJURED).is_ok());
        assert!(table.column(ON_STREET_NAME).is_ok());
        assert!(table.column("crash_date").is_err());
        assert!(table.column("crash_time").is_err());
        assert!(matches!(
            table.column(DATE_TIME).unwrap().dtype(),
            DataType::Datetime(_, _)
        ));
    }

    #[test]
    fn load_is_memoized_per_row_limit() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, &sample_rows());

        let mut store = CollisionStore::new(&path);
        let first = store.load(100).unwrap();
        let second = store.load(100).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let limited = store.load(1).unwrap();
        assert!(!Arc::ptr_eq(&first, &limited));
        assert_eq!(limited.height(), 1);
    }

    #[test]
    fn load_caches_even_after_source_removed() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, &sample_rows());

        let mut store = CollisionStore::new(&path);
        let first = store.load(100).unwrap();
        std::fs::remove_file(&path).unwrap();
        let second = store.load(100).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn missing_file_is_data_unavailable() {
        let dir = TempDir::new().unwrap();
        let mut store = CollisionStore::new(dir.path().join("nope.csv"));
        assert!(matches!(
            store.load(100),
            Err(LoadError::DataUnavailable(_))
        ));
    }

    #[test]
    fn missing_required_column_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("collisions.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "CRASH DATE,LATITUDE,LONGITUDE").unwrap();
        writeln!(file, "09/21/2019,40.701,-73.881").unwrap();
        drop(file);

        let mut store = CollisionStore::new(&path);
        assert!(matches!(
            store.load(100),
            Err(LoadError::MissingColumn(col)) if col == "crash_time"
        ));
    }

    #[test]
    fn unparseable_timestamp_keeps_row_when_coordinates_present() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, &["not-a-date,99:99,40.700,-73.900,1,0,MAIN STREET"]);

        let mut store = CollisionStore::new(&path);
        let table = store.load(10).unwrap();
        assert_eq!(table.height(), 1);
        let ts = table.column(DATE_TIME).unwrap();
        assert_eq!(ts.null_count(), 1);
    }

    #[test]
    fn normalize_name_handles_mixed_case_and_spaces() {
        assert_eq!(normalize_name("CRASH DATE"), "crash_date");
        assert_eq!(
            normalize_name("NUMBER OF PERSONS INJURED"),
            "number_of_persons_injured"
        );
        assert_eq!(normalize_name("latitude"), "latitude");
    }
}
