use std::collections::BTreeSet;

use column_filter_model::{ColumnFilterState, DataType, Dataset, FieldValue, ValueKind};

use crate::InferenceError;

/// Result of inferring one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInference {
    pub state: ColumnFilterState,
    pub diagnostic: Option<InferenceError>,
}

/// Build the filter state for `column` from the values observed in `dataset`.
///
/// - With any absent value, the type comes from the last row holding a value.
/// - Otherwise the column must hold exactly one value kind.
pub fn infer_column(column: &str, dataset: &Dataset) -> ColumnInference {
    let kinds: BTreeSet<ValueKind> = dataset.iter().map(|row| row.kind_of(column)).collect();
    let has_blanks = kinds.contains(&ValueKind::Absent);
    let present: Vec<FieldValue> = dataset
        .iter()
        .filter_map(|row| row.get(column).cloned())
        .collect();

    let (data_type, diagnostic) = if has_blanks {
        match dataset.iter().rev().find_map(|row| row.get(column)) {
            Some(value) => {
                if kinds.len() > 2 {
                    log::debug!(
                        "column '{column}' mixes value kinds; using {} from the last row with a value",
                        value.kind()
                    );
                }
                (DataType::from(value.kind()), None)
            }
            None => (
                DataType::Unknown,
                Some(InferenceError::UnresolvedColumnType {
                    column: column.to_string(),
                }),
            ),
        }
    } else {
        match kinds.iter().next() {
            Some(kind) if kinds.len() == 1 => (DataType::from(*kind), None),
            Some(_) => (
                DataType::Unknown,
                Some(InferenceError::AmbiguousColumnType {
                    column: column.to_string(),
                    kinds: kinds.iter().copied().collect(),
                }),
            ),
            None => (
                DataType::Unknown,
                Some(InferenceError::UnresolvedColumnType {
                    column: column.to_string(),
                }),
            ),
        }
    };

    if let Some(err) = &diagnostic {
        log::warn!("[column filter] {err}");
    }

    ColumnInference {
        state: ColumnFilterState::new(column, data_type).with_values(&present, has_blanks),
        diagnostic,
    }
}
