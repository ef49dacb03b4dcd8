//! Source catalogs for the raw relations
//!
//! The pipeline does not care how raw data is stored; it only asks a
//! catalog for a relation by name. A relation the catalog cannot
//! produce is reported as `None` — the staging layer turns that into
//! zero rows rather than a fatal error.

use std::collections::HashMap;
use std::path::PathBuf;

use polars::prelude::*;
use tracing::debug;

use marts_common::{source_file_name, MartError, Result};

/// Provider of raw source relations, addressable by name
pub trait SourceCatalog {
    /// Fetch a raw relation by its registered name
    ///
    /// Returns `Ok(None)` when the relation is registered but currently
    /// unavailable (e.g. the CSV file is absent). Asking for a name
    /// outside the registry is an error.
    fn fetch(&self, name: &str) -> Result<Option<DataFrame>>;
}

/// Catalog reading the raw Olist CSV exports from a data directory
pub struct CsvCatalog {
    data_dir: PathBuf,
}

impl CsvCatalog {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }
}

impl SourceCatalog for CsvCatalog {
    fn fetch(&self, name: &str) -> Result<Option<DataFrame>> {
        let file_name =
            source_file_name(name).ok_or_else(|| MartError::UnknownSource(name.to_string()))?;
        let path = self.data_dir.join(file_name);

        if !path.exists() {
            return Ok(None);
        }

        // Unreadable cells become nulls here; the staging layer decides
        // which of those rows get excluded and counted.
        let frame = CsvReader::from_path(&path)?
            .has_header(true)
            .with_ignore_errors(true)
            .finish()?;

        debug!(
            "Read {} rows from '{}' ({})",
            frame.height(),
            name,
            path.display()
        );
        Ok(Some(frame))
    }
}

/// In-memory catalog, used by tests and embedding callers
#[derive(Default)]
pub struct MemoryCatalog {
    tables: HashMap<String, DataFrame>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a raw relation under a source name
    pub fn insert(&mut self, name: impl Into<String>, frame: DataFrame) {
        self.tables.insert(name.into(), frame);
    }
}

impl SourceCatalog for MemoryCatalog {
    fn fetch(&self, name: &str) -> Result<Option<DataFrame>> {
        if source_file_name(name).is_none() {
            return Err(MartError::UnknownSource(name.to_string()));
        }
        Ok(self.tables.get(name).cloned())
    }
}
