use column_filter_model::{ColumnFilterState, DataType, Dataset, FieldValue, FilterEntry, Row};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterResult {
    /// For each row in the dataset, `true` if the row is visible.
    pub visible_rows: Vec<bool>,
    /// Indices of rows that should be hidden.
    pub hidden_rows: Vec<usize>,
}

impl FilterResult {
    pub fn visible_count(&self) -> usize {
        self.visible_rows.len() - self.hidden_rows.len()
    }
}

/// Returns true if `row` survives the filters of every column.
pub fn is_row_visible<'a, I>(columns: I, row: &Row) -> bool
where
    I: IntoIterator<Item = &'a ColumnFilterState>,
{
    columns
        .into_iter()
        .all(|column| column_admits(column, row))
}

/// Returns true unless one of `column`'s filters excludes `row`.
///
/// Untyped columns never exclude anything; filter entries that do not fit the column's data
/// type are skipped.
pub fn column_admits(column: &ColumnFilterState, row: &Row) -> bool {
    let value = row.get(column.name());
    match column.data_type() {
        DataType::String => column
            .filters()
            .iter()
            .all(|filter| text_filter_admits(filter, value)),
        DataType::Number => column
            .filters()
            .iter()
            .all(|filter| number_filter_admits(filter, value)),
        DataType::Unknown => true,
    }
}

fn text_filter_admits(filter: &FilterEntry, value: Option<&FieldValue>) -> bool {
    let Some(value) = value else {
        return !filter.is_blank_marker();
    };
    match filter {
        FilterEntry::Exclude(pattern) => !pattern.is_match(&value.display_text()),
        FilterEntry::InverseText(pattern) => pattern.is_match(&value.display_text()),
        FilterEntry::BlankMarker | FilterEntry::ExcludeNumber(_) => true,
    }
}

fn number_filter_admits(filter: &FilterEntry, value: Option<&FieldValue>) -> bool {
    match (filter, value) {
        (FilterEntry::BlankMarker, None) => false,
        (FilterEntry::ExcludeNumber(excluded), Some(FieldValue::Number(n))) => n != excluded,
        _ => true,
    }
}

/// Evaluate every row of `dataset`.
pub fn apply_filters<'a, I>(columns: I, dataset: &Dataset) -> FilterResult
where
    I: IntoIterator<Item = &'a ColumnFilterState>,
{
    // Columns without filters cannot exclude anything.
    let active: Vec<&ColumnFilterState> = columns
        .into_iter()
        .filter(|column| column.is_filtered() && column.data_type() != DataType::Unknown)
        .collect();

    let visible_rows: Vec<bool> = dataset
        .iter()
        .map(|row| is_row_visible(active.iter().copied(), row))
        .collect();
    let hidden_rows = visible_rows
        .iter()
        .enumerate()
        .filter_map(|(index, visible)| (!*visible).then_some(index))
        .collect();

    FilterResult {
        visible_rows,
        hidden_rows,
    }
}
