use serde::Serialize;

use crate::FilterPattern;

/// One active filter on a column.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FilterEntry {
    /// Excludes rows that have no value for the column.
    BlankMarker,
    /// Excludes rows whose text contains the pattern (one unchecked value).
    Exclude(FilterPattern),
    /// Keeps only rows whose text contains the pattern (the free-text box).
    ///
    /// A column holds at most one of these.
    InverseText(FilterPattern),
    /// Excludes rows whose number equals this value exactly.
    ExcludeNumber(f64),
}

impl FilterEntry {
    pub fn is_inverse(&self) -> bool {
        matches!(self, FilterEntry::InverseText(_))
    }

    pub fn is_blank_marker(&self) -> bool {
        matches!(self, FilterEntry::BlankMarker)
    }

    pub fn pattern(&self) -> Option<&FilterPattern> {
        match self {
            FilterEntry::Exclude(p) | FilterEntry::InverseText(p) => Some(p),
            FilterEntry::BlankMarker | FilterEntry::ExcludeNumber(_) => None,
        }
    }
}
