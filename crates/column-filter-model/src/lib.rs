//! `column-filter-model` defines the data structures behind per-column table filters.
//!
//! - row records and their values ([`Row`], [`FieldValue`], [`Dataset`])
//! - canonical case-insensitive substring patterns ([`FilterPattern`])
//! - the per-column filter state and its mutation primitives ([`ColumnFilterState`])
//! - dataset loading from JSON and CSV
//!
//! Type inference and row evaluation live in `column-filter-engine`.

mod column;
mod dataset;
mod filter;
pub mod import;
mod pattern;
mod value;

pub use column::{ColumnFilterState, DataType};
pub use dataset::{Dataset, DatasetError};
pub use filter::FilterEntry;
pub use import::{import_csv_dataset, CsvImportError, CsvOptions, CsvTextEncoding};
pub use pattern::{canonicalize, escape_pattern_text, FilterPattern, PatternError};
pub use value::{distinct_sorted, FieldValue, Row, ValueKind};
