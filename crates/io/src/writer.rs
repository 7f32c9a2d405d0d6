//! Parquet output settings and the merged-table writer.

use std::path::Path;

use parquet::basic::{Compression as ParquetCompression, ZstdLevel};
use parquet::file::properties::WriterProperties;
use selene_almanac::MergedRow;
use tracing::info;

use crate::error::IoError;
use crate::parquet_write;
use crate::validate::ValidationCollector;

/// Column compression codec.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Compression {
    None,
    #[default]
    Snappy,
    /// Level taken from [`WriterConfig::zstd_level`].
    Zstd,
}

/// Settings for [`write_parquet`].
#[derive(Debug, Clone)]
pub struct WriterConfig {
    compression: Compression,
    zstd_level: i32,
    /// Upper bound on rows per row group.
    row_group_size: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::default(),
            zstd_level: 3,
            // A full century of days fits in one group.
            row_group_size: 65_536,
        }
    }
}

impl WriterConfig {
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Zstd level, 1 (fastest) to 22. Ignored by other codecs.
    pub fn with_zstd_level(mut self, level: i32) -> Self {
        self.zstd_level = level;
        self
    }

    pub fn with_row_group_size(mut self, rows: usize) -> Self {
        self.row_group_size = rows;
        self
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    pub fn zstd_level(&self) -> i32 {
        self.zstd_level
    }

    pub fn row_group_size(&self) -> usize {
        self.row_group_size
    }

    /// Checks every setting and reports all problems together.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Validation`] for a zero `row_group_size` or a
    /// Zstd level outside 1..=22.
    pub fn validate(&self) -> Result<(), IoError> {
        let mut c = ValidationCollector::new();
        if self.row_group_size == 0 {
            c.push("row_group_size must be greater than 0");
        }
        if !(1..=22).contains(&self.zstd_level) {
            c.push(format!("zstd_level must be in 1..=22, got {}", self.zstd_level));
        }
        c.finish()
    }

    fn codec(&self) -> Result<ParquetCompression, IoError> {
        Ok(match self.compression {
            Compression::None => ParquetCompression::UNCOMPRESSED,
            Compression::Snappy => ParquetCompression::SNAPPY,
            Compression::Zstd => {
                let level = ZstdLevel::try_new(self.zstd_level)?;
                ParquetCompression::ZSTD(level)
            }
        })
    }

    fn properties(&self) -> Result<WriterProperties, IoError> {
        Ok(WriterProperties::builder()
            .set_compression(self.codec()?)
            .set_max_row_group_size(self.row_group_size)
            .set_created_by(format!("selene {}", env!("CARGO_PKG_VERSION")))
            .build())
    }
}

/// Writes the merged almanac table to `path` as Parquet.
///
/// Rows go out in chunks of at most `row_group_size`, one row group per
/// chunk. An empty slice produces a file with the schema and no rows.
///
/// # Errors
///
/// Returns [`IoError::Validation`] for a bad configuration,
/// [`IoError::Filesystem`] if the file cannot be created, and
/// [`IoError::Parquet`] if encoding fails.
pub fn write_parquet(path: &Path, rows: &[MergedRow], config: &WriterConfig) -> Result<(), IoError> {
    config.validate()?;

    let schema = parquet_write::build_schema();
    let batches = rows
        .chunks(config.row_group_size)
        .map(|chunk| parquet_write::rows_to_record_batch(chunk, &schema))
        .collect::<Result<Vec<_>, _>>()?;

    parquet_write::write_batches(path, &batches, &schema, config.properties()?)?;

    info!(
        path = %path.display(),
        rows = rows.len(),
        row_groups = batches.len(),
        compression = ?config.compression,
        "wrote almanac parquet"
    );
    Ok(())
}
