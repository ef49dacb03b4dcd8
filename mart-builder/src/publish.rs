//! Mart publishing
//!
//! The four marts replace their previous versions together or not at
//! all: every table is written to a staging directory first, and only a
//! fully-written staging directory is renamed into place. A failure at
//! any point leaves the previously published marts untouched.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::{debug, info};

use marts_common::{MartError, Result};

use crate::pipeline::MartSnapshot;

/// Publishes a mart snapshot as parquet files in an output directory
pub struct ParquetPublisher {
    output_dir: PathBuf,
}

impl ParquetPublisher {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Write all four marts, then swap the output directory atomically
    pub fn publish(&self, snapshot: &MartSnapshot) -> Result<()> {
        let staging_dir = self.staging_dir()?;
        if staging_dir.exists() {
            fs::remove_dir_all(&staging_dir)?;
        }
        fs::create_dir_all(&staging_dir)?;

        if let Err(err) = write_marts(&staging_dir, snapshot) {
            // Leave the currently published marts as they are.
            let _ = fs::remove_dir_all(&staging_dir);
            return Err(err);
        }

        if self.output_dir.exists() {
            fs::remove_dir_all(&self.output_dir)?;
        }
        fs::rename(&staging_dir, &self.output_dir)?;

        info!(
            "Published {} mart tables to {}",
            snapshot.tables().len(),
            self.output_dir.display()
        );
        Ok(())
    }

    fn staging_dir(&self) -> Result<PathBuf> {
        let name = self
            .output_dir
            .file_name()
            .ok_or_else(|| {
                MartError::ConfigError(format!(
                    "output directory '{}' has no final path component",
                    self.output_dir.display()
                ))
            })?
            .to_string_lossy();
        Ok(self
            .output_dir
            .with_file_name(format!("{}.staging", name)))
    }
}

fn write_marts(dir: &Path, snapshot: &MartSnapshot) -> Result<()> {
    for (name, frame) in snapshot.tables() {
        let path = dir.join(format!("{}.parquet", name));
        let file = File::create(&path)?;
        let mut out = frame.clone();
        ParquetWriter::new(file).finish(&mut out)?;
        debug!("Wrote {} rows to {}", frame.height(), path.display());
    }
    Ok(())
}
