//! # selene-io
//!
//! Read the user's events table and write almanac output. Events come in as
//! CSV; the merged daily table goes out as Parquet or CSV, and the run
//! summary as JSON.
//!
//! Row-level problems in an events table never abort a read: each bad row
//! is dropped and reported as an [`EventRowWarning`].

mod csv_write;
mod error;
mod events;
mod flatten;
mod parquet_write;
mod summary;
mod template;
mod validate;
mod writer;

pub use csv_write::write_csv;
pub use error::IoError;
pub use events::{EventRowWarning, EventTable, read_events, read_events_from};
pub use summary::{AlmanacSummary, EclipseSummary, SkippedDaySummary, write_summary};
pub use template::write_events_template;
pub use writer::{Compression, WriterConfig, write_parquet};
