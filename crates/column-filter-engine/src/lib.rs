//! Row visibility for per-column table filters.
//!
//! Binding a dataset infers a data type and distinct value list for each filterable column
//! ([`ColumnFilterSet::bind`]). UI controls then issue [`FilterCommand`]s, and a row is visible
//! only if no column's filters exclude it ([`is_row_visible`]).

mod error;
pub mod inference;
pub mod predicate;
mod set;
mod table;

pub use column_filter_model::{
    ColumnFilterState, DataType, Dataset, FieldValue, FilterEntry, FilterPattern, Row, ValueKind,
};
pub use error::{FilterSetError, InferenceError};
pub use inference::{infer_column, ColumnInference};
pub use predicate::{apply_filters, column_admits, is_row_visible, FilterResult};
pub use set::{ColumnFilterSet, FilterChange, FilterCommand, FilterSnapshot};
pub use table::{FilteredTable, TableOptions};
