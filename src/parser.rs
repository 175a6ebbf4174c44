//! CSV parser for the restaurant tables.
//!
//! Rows that fail type coercion or validation are skipped and tallied; only a
//! missing or unreadable file aborts the load.

use serde::de::DeserializeOwned;
use std::fs::File;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{AnalyticsError, Result};
use crate::records::{Category, Feedback, MenuItem, Order, Validate};

/// Records parsed from one file, plus the number of rows rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub records: Vec<T>,
    pub skipped: usize,
}

impl<T> Default for Loaded<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            skipped: 0,
        }
    }
}

/// Reads every row of `path` into `T`.
///
/// # Errors
///
/// Returns [`AnalyticsError::MissingFile`] if `path` does not exist, and
/// [`AnalyticsError::Csv`] if the header row or the underlying reader fails.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn load_table<T>(path: &Path) -> Result<Loaded<T>>
where
    T: DeserializeOwned + Validate,
{
    if !path.exists() {
        return Err(AnalyticsError::MissingFile {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let csv_err = |source: csv::Error| AnalyticsError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let headers: csv::StringRecord = rdr
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.to_ascii_lowercase())
        .collect();

    let mut loaded = Loaded::default();

    for result in rdr.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(csv_err(e)),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable row");
                loaded.skipped += 1;
                continue;
            }
        };

        let line = record.position().map(|p| p.line()).unwrap_or_default();

        match record.deserialize::<T>(Some(&headers)) {
            Ok(row) => match row.validate() {
                None => loaded.records.push(row),
                Some(reason) => {
                    warn!(line, reason = %reason, "Skipping invalid row");
                    loaded.skipped += 1;
                }
            },
            Err(e) => {
                warn!(line, error = %e, "Skipping malformed row");
                loaded.skipped += 1;
            }
        }
    }

    debug!(
        rows = loaded.records.len(),
        skipped = loaded.skipped,
        "Table loaded"
    );

    Ok(loaded)
}

pub fn load_categories(path: &Path) -> Result<Loaded<Category>> {
    load_table(path)
}

pub fn load_menu(path: &Path) -> Result<Loaded<MenuItem>> {
    load_table(path)
}

pub fn load_orders(path: &Path) -> Result<Loaded<Order>> {
    load_table(path)
}

pub fn load_feedback(path: &Path) -> Result<Loaded<Feedback>> {
    load_table(path)
}
