//! # selene-calendar
//!
//! Date arithmetic on the proleptic Gregorian calendar for the selene
//! almanac: validated closed date ranges, contiguous day sequences, calendar
//! month grouping keys and lenient date parsing.
//!
//! ## Architecture
//!
//! ```mermaid
//! graph LR
//!     A["(start, end)"] -->|"DateRange::new()"| B["DateRange"]
//!     B -->|".dates()"| C["Iterator of NaiveDate"]
//!     D["NaiveDate"] -->|"date_sequence()"| E["Vec of NaiveDate"]
//!     D -->|"YearMonth::of()"| F["YearMonth"]
//!     G["&str"] -->|"parse_date()"| D
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use selene_calendar::{DateRange, YearMonth, date_sequence, parse_date};
//!
//! let range = DateRange::year(2025).unwrap();
//! assert_eq!(range.len(), 365);
//!
//! let start = parse_date("2024-02-28").unwrap();
//! let dates = date_sequence(start, 3); // Feb 28, Feb 29, Mar 1
//!
//! let key = YearMonth::of(dates[1]);
//! assert_eq!((key.year(), key.month()), (2024, 2));
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `range` | Closed, validated date interval |
//! | `sequence` | Contiguous date sequence generation |
//! | `month` | Calendar (year, month) grouping key |
//! | `parse` | Date parsing from table cells and CLI input |
//! | `error` | Error types |

mod error;
mod month;
mod parse;
mod range;
mod sequence;

pub use error::CalendarError;
pub use month::YearMonth;
pub use parse::parse_date;
pub use range::DateRange;
pub use sequence::date_sequence;
