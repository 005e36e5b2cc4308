use column_filter_model::ValueKind;
use thiserror::Error;

/// Problems found while inferring a column's data type. None of these abort binding; the
/// affected column is left untyped and takes part in no filtering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferenceError {
    #[error(
        "column '{column}' has {} different value kinds; filtering on multiple data types is unsupported",
        .kinds.len()
    )]
    AmbiguousColumnType {
        column: String,
        kinds: Vec<ValueKind>,
    },
    #[error("could not find a value in column '{column}'")]
    UnresolvedColumnType { column: String },
}

impl InferenceError {
    pub fn column(&self) -> &str {
        match self {
            InferenceError::AmbiguousColumnType { column, .. }
            | InferenceError::UnresolvedColumnType { column } => column,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterSetError {
    #[error("no filterable column named '{0}'")]
    UnknownColumn(String),
}
