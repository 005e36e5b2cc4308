use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::value::distinct_sorted;
use crate::{FieldValue, FilterEntry, FilterPattern, ValueKind};

/// Inferred data type of a filterable column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    String,
    Number,
    /// The type could not be determined; the column takes part in no filtering.
    #[default]
    Unknown,
}

impl From<ValueKind> for DataType {
    fn from(kind: ValueKind) -> Self {
        match kind {
            ValueKind::String => DataType::String,
            ValueKind::Number => DataType::Number,
            ValueKind::Absent => DataType::Unknown,
        }
    }
}

/// Filter configuration for one column.
///
/// Mutations return `true` when the filter list changed. Input that does not fit the column's
/// data type is ignored rather than rejected.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ColumnFilterState {
    name: String,
    data_type: DataType,
    distinct_values: Vec<FieldValue>,
    has_blanks: bool,
    filters: Vec<FilterEntry>,
}

impl ColumnFilterState {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            distinct_values: Vec::new(),
            has_blanks: false,
            filters: Vec::new(),
        }
    }

    /// Attach the observed values. `values` need not be sorted or unique.
    pub fn with_values(mut self, values: &[FieldValue], has_blanks: bool) -> Self {
        self.distinct_values = distinct_sorted(values);
        self.has_blanks = has_blanks;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Every distinct present value, sorted ascending.
    pub fn distinct_values(&self) -> &[FieldValue] {
        &self.distinct_values
    }

    pub fn has_blanks(&self) -> bool {
        self.has_blanks
    }

    /// Active filters in insertion order.
    pub fn filters(&self) -> &[FilterEntry] {
        &self.filters
    }

    pub fn is_filtered(&self) -> bool {
        !self.filters.is_empty()
    }

    /// Source text of the active free-text filter.
    pub fn text_filter(&self) -> Option<&str> {
        self.filters.iter().find_map(|f| match f {
            FilterEntry::InverseText(p) => Some(p.source()),
            _ => None,
        })
    }

    pub fn blanks_excluded(&self) -> bool {
        self.filters.iter().any(FilterEntry::is_blank_marker)
    }

    pub fn is_value_excluded(&self, value: &FieldValue) -> bool {
        self.position_of_exclusion(value).is_some()
    }

    /// Exclude rows holding `value` (uncheck one value checkbox).
    pub fn add_value_exclusion(&mut self, value: &FieldValue) -> bool {
        if self.is_value_excluded(value) {
            return false;
        }
        let Some(entry) = self.exclusion_entry(value) else {
            return false;
        };
        self.filters.push(entry);
        true
    }

    /// Re-include rows holding `value` (check one value checkbox).
    pub fn remove_value_exclusion(&mut self, value: &FieldValue) -> bool {
        match self.position_of_exclusion(value) {
            Some(index) => {
                self.filters.remove(index);
                true
            }
            None => false,
        }
    }

    /// Replace the free-text filter. Empty `text` only removes the current one.
    pub fn set_text_filter(&mut self, text: &str) -> bool {
        let before = self.filters.len();
        let previous = self.take_text_filter();

        let next = if text.is_empty() {
            None
        } else if self.data_type != DataType::String {
            log::debug!(
                "ignoring text filter on non-text column '{}' ({:?})",
                self.name,
                self.data_type
            );
            None
        } else {
            match FilterPattern::new(text) {
                Ok(pattern) => Some(pattern),
                Err(err) => {
                    log::debug!("ignoring text filter on column '{}': {err}", self.name);
                    None
                }
            }
        };

        let removed = before - self.filters.len();
        let changed = removed > 1 || previous != next;
        let kept = if changed { next } else { previous };
        if let Some(pattern) = kept {
            self.filters.push(FilterEntry::InverseText(pattern));
        }
        changed
    }

    /// Exclude rows with no value (uncheck "(Blanks)").
    pub fn exclude_blanks(&mut self) -> bool {
        if self.data_type == DataType::Unknown {
            log::debug!("ignoring blank filter on untyped column '{}'", self.name);
            return false;
        }
        if self.blanks_excluded() {
            return false;
        }
        self.filters.push(FilterEntry::BlankMarker);
        true
    }

    /// Re-include rows with no value (check "(Blanks)").
    pub fn include_blanks(&mut self) -> bool {
        let before = self.filters.len();
        self.filters.retain(|f| !f.is_blank_marker());
        self.filters.len() != before
    }

    /// Re-include every value and blanks, keeping the free-text filter.
    pub fn check_all(&mut self) -> bool {
        let before = self.filters.len();
        self.filters.retain(FilterEntry::is_inverse);
        self.filters.len() != before
    }

    /// Exclude every distinct value (and blanks, if any), keeping the free-text filter.
    pub fn uncheck_all(&mut self) -> bool {
        if self.data_type == DataType::Unknown {
            log::debug!("ignoring uncheck-all on untyped column '{}'", self.name);
            return false;
        }
        let mut next: Vec<FilterEntry> = self
            .filters
            .iter()
            .filter(|f| f.is_inverse())
            .cloned()
            .collect();
        for value in &self.distinct_values {
            if let Some(entry) = self.exclusion_entry(value) {
                if !next.contains(&entry) {
                    next.push(entry);
                }
            }
        }
        if self.has_blanks {
            next.push(FilterEntry::BlankMarker);
        }
        if next == self.filters {
            return false;
        }
        self.filters = next;
        true
    }

    pub fn clear(&mut self) -> bool {
        if self.filters.is_empty() {
            return false;
        }
        self.filters.clear();
        true
    }

    fn take_text_filter(&mut self) -> Option<FilterPattern> {
        let mut previous = None;
        self.filters.retain(|f| match f {
            FilterEntry::InverseText(p) => {
                previous.get_or_insert_with(|| p.clone());
                false
            }
            _ => true,
        });
        previous
    }

    fn exclusion_entry(&self, value: &FieldValue) -> Option<FilterEntry> {
        match (self.data_type, value) {
            // Numbers in a text column are matched by their display text.
            (DataType::String, _) => match FilterPattern::new(&value.display_text()) {
                Ok(pattern) => Some(FilterEntry::Exclude(pattern)),
                Err(err) => {
                    log::debug!("ignoring value filter on column '{}': {err}", self.name);
                    None
                }
            },
            (DataType::Number, FieldValue::Number(n)) => Some(FilterEntry::ExcludeNumber(*n)),
            _ => {
                log::debug!(
                    "ignoring {} value filter on column '{}' ({:?})",
                    value.kind(),
                    self.name,
                    self.data_type
                );
                None
            }
        }
    }

    fn position_of_exclusion(&self, value: &FieldValue) -> Option<usize> {
        self.filters.iter().position(|f| match (f, value) {
            (FilterEntry::Exclude(p), _) => p.matches_source(&value.display_text()),
            (FilterEntry::ExcludeNumber(n), FieldValue::Number(v)) => {
                OrderedFloat(*n) == OrderedFloat(*v)
            }
            _ => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names() -> ColumnFilterState {
        ColumnFilterState::new("Name", DataType::String).with_values(
            &[
                FieldValue::from("Frank"),
                FieldValue::from("Bob"),
                FieldValue::from("Amanda"),
            ],
            false,
        )
    }

    fn ages() -> ColumnFilterState {
        ColumnFilterState::new("Age", DataType::Number)
            .with_values(&[FieldValue::from(30), FieldValue::from(25)], true)
    }

    #[test]
    fn with_values_sorts_and_dedups() {
        let column = names().with_values(
            &[FieldValue::from("b"), FieldValue::from("a"), FieldValue::from("b")],
            true,
        );
        assert_eq!(
            column.distinct_values(),
            &[FieldValue::from("a"), FieldValue::from("b")]
        );
        assert!(column.has_blanks());
    }

    #[test]
    fn value_exclusions_are_deduplicated_by_canonical_text() {
        let mut column = names();
        assert!(column.add_value_exclusion(&FieldValue::from("Bob")));
        assert!(!column.add_value_exclusion(&FieldValue::from("Bob")));
        assert!(!column.add_value_exclusion(&FieldValue::from("BOB")));
        assert_eq!(column.filters().len(), 1);
        assert!(column.is_filtered());
    }

    #[test]
    fn remove_value_exclusion_is_case_insensitive_and_removes_one() {
        let mut column = names();
        column.add_value_exclusion(&FieldValue::from("Bob"));
        column.add_value_exclusion(&FieldValue::from("Frank"));
        assert!(column.remove_value_exclusion(&FieldValue::from("bob")));
        assert!(!column.remove_value_exclusion(&FieldValue::from("bob")));
        assert_eq!(column.filters().len(), 1);
        assert!(column.is_value_excluded(&FieldValue::from("Frank")));
    }

    #[test]
    fn mismatched_value_kinds_are_ignored() {
        let mut column = ages();
        assert!(!column.add_value_exclusion(&FieldValue::from("30")));
        let mut column = ColumnFilterState::new("Mixed", DataType::Unknown);
        assert!(!column.add_value_exclusion(&FieldValue::from("x")));
        assert!(!column.exclude_blanks());
        assert!(!column.is_filtered());
    }

    #[test]
    fn numbers_in_text_columns_are_excluded_by_display_text() {
        let mut column = ColumnFilterState::new("Code", DataType::String)
            .with_values(&[FieldValue::from(7), FieldValue::from("A1")], true);
        assert!(column.add_value_exclusion(&FieldValue::from(7)));
        assert!(!column.add_value_exclusion(&FieldValue::from("7")));
        assert!(column.is_value_excluded(&FieldValue::from(7)));
        assert!(column.remove_value_exclusion(&FieldValue::from(7)));
        assert!(!column.is_filtered());

        assert!(column.uncheck_all());
        assert_eq!(column.filters().len(), 3);
        assert!(column.is_value_excluded(&FieldValue::from(7)));
        assert!(column.is_value_excluded(&FieldValue::from("A1")));
        assert!(column.blanks_excluded());
    }

    #[test]
    fn number_exclusions_match_exact_values() {
        let mut column = ages();
        assert!(column.add_value_exclusion(&FieldValue::from(30)));
        assert!(!column.add_value_exclusion(&FieldValue::from(30.0)));
        assert_eq!(column.filters(), &[FilterEntry::ExcludeNumber(30.0)]);
        assert!(!column.remove_value_exclusion(&FieldValue::from(25)));
        assert!(column.remove_value_exclusion(&FieldValue::from(30)));
        assert!(!column.is_filtered());
    }

    #[test]
    fn set_text_filter_keeps_a_single_inverse_entry() {
        let mut column = names();
        column.add_value_exclusion(&FieldValue::from("Bob"));
        assert!(column.set_text_filter("an"));
        assert!(column.set_text_filter("fr"));
        assert!(!column.set_text_filter("FR"));
        assert_eq!(column.filters().iter().filter(|f| f.is_inverse()).count(), 1);
        assert_eq!(column.text_filter(), Some("fr"));

        assert!(column.set_text_filter(""));
        assert_eq!(column.text_filter(), None);
        assert_eq!(column.filters().len(), 1);
        assert!(!column.set_text_filter(""));
    }

    #[test]
    fn text_filter_is_ignored_on_number_columns() {
        let mut column = ages();
        assert!(!column.set_text_filter("3"));
        assert!(!column.is_filtered());
    }

    #[test]
    fn blank_marker_toggles() {
        let mut column = ages();
        assert!(column.exclude_blanks());
        assert!(!column.exclude_blanks());
        assert!(column.blanks_excluded());
        assert!(column.include_blanks());
        assert!(!column.include_blanks());
        assert!(!column.is_filtered());
    }

    #[test]
    fn uncheck_all_then_check_all_keeps_text_filter() {
        let mut column = names();
        column.set_text_filter("a");
        assert!(column.uncheck_all());
        assert_eq!(column.filters().len(), 4);
        assert!(!column.uncheck_all());
        assert!(column.check_all());
        assert_eq!(column.text_filter(), Some("a"));
        assert_eq!(column.filters().len(), 1);
        assert!(!column.check_all());
    }

    #[test]
    fn uncheck_all_on_numbers_includes_blank_marker() {
        let mut column = ages();
        assert!(column.uncheck_all());
        assert_eq!(
            column.filters(),
            &[
                FilterEntry::ExcludeNumber(25.0),
                FilterEntry::ExcludeNumber(30.0),
                FilterEntry::BlankMarker,
            ]
        );
        assert!(column.check_all());
        assert!(!column.is_filtered());
    }

    #[test]
    fn clear_is_idempotent() {
        let mut column = names();
        assert!(!column.clear());
        column.add_value_exclusion(&FieldValue::from("Bob"));
        let snapshot = {
            let mut c = column.clone();
            c.clear();
            c
        };
        assert!(column.clear());
        assert!(!column.clear());
        assert_eq!(column, snapshot);
    }
}
