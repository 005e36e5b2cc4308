use std::collections::BTreeMap;
use std::fmt;

use column_filter_model::{ColumnFilterState, Dataset, FieldValue, FilterEntry, Row};
use serde::Serialize;

use crate::inference::infer_column;
use crate::predicate::{apply_filters, is_row_visible, FilterResult};
use crate::{FilterSetError, InferenceError};

/// A discrete filter mutation, as issued by a UI control.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterCommand {
    /// Uncheck one value checkbox.
    ExcludeValue { column: String, value: FieldValue },
    /// Check one value checkbox.
    IncludeValue { column: String, value: FieldValue },
    /// Uncheck "(Blanks)".
    ExcludeBlanks { column: String },
    /// Check "(Blanks)".
    IncludeBlanks { column: String },
    /// Submit the free-text box. Empty text removes the text filter.
    SetTextFilter { column: String, text: String },
    /// Check "(Check all)".
    CheckAll { column: String },
    /// Uncheck "(Check all)".
    UncheckAll { column: String },
    ClearColumn { column: String },
    ClearAll,
}

impl FilterCommand {
    /// The column the command targets, or `None` for set-wide commands.
    pub fn column(&self) -> Option<&str> {
        match self {
            FilterCommand::ExcludeValue { column, .. }
            | FilterCommand::IncludeValue { column, .. }
            | FilterCommand::ExcludeBlanks { column }
            | FilterCommand::IncludeBlanks { column }
            | FilterCommand::SetTextFilter { column, .. }
            | FilterCommand::CheckAll { column }
            | FilterCommand::UncheckAll { column }
            | FilterCommand::ClearColumn { column } => Some(column),
            FilterCommand::ClearAll => None,
        }
    }
}

/// Notification sent to listeners after a command changed the filter state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterChange {
    /// The affected column, or `None` when every column was touched.
    pub column: Option<String>,
    /// Whether the affected column (or, for set-wide changes, any column) is still filtered.
    pub filtered: bool,
}

/// Serializable view of every active filter, keyed by column name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterSnapshot {
    pub columns: BTreeMap<String, Vec<FilterEntry>>,
}

impl FilterSnapshot {
    /// Stable string form, usable as a cache key.
    pub fn to_key(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

type FilterChangeListener = Box<dyn FnMut(&FilterChange)>;

/// The filter states of every filterable column of one bound dataset.
#[derive(Default)]
pub struct ColumnFilterSet {
    columns: Vec<ColumnFilterState>,
    diagnostics: Vec<InferenceError>,
    listeners: Vec<FilterChangeListener>,
}

impl fmt::Debug for ColumnFilterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnFilterSet")
            .field("columns", &self.columns)
            .field("diagnostics", &self.diagnostics)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl ColumnFilterSet {
    /// Infer one filter state per named column. Repeated names are bound once.
    pub fn bind<S: AsRef<str>>(column_names: &[S], dataset: &Dataset) -> Self {
        let mut set = Self::default();
        set.rebind(column_names, dataset);
        set
    }

    /// Discard every column state and infer fresh ones from `dataset`. Listeners are kept and
    /// told about the reset if any filter was active.
    pub fn rebind<S: AsRef<str>>(&mut self, column_names: &[S], dataset: &Dataset) {
        let was_filtered = self.any_filtered();
        self.columns.clear();
        self.diagnostics.clear();
        for name in column_names {
            let name = name.as_ref();
            if self.column(name).is_some() {
                log::debug!("column '{name}' listed more than once; binding it once");
                continue;
            }
            let inferred = infer_column(name, dataset);
            self.columns.push(inferred.state);
            self.diagnostics.extend(inferred.diagnostic);
        }
        log::debug!(
            "bound {} filterable columns over {} rows",
            self.columns.len(),
            dataset.len()
        );
        if was_filtered {
            self.notify(&FilterChange {
                column: None,
                filtered: false,
            });
        }
    }

    pub fn from_columns(columns: Vec<ColumnFilterState>) -> Self {
        Self {
            columns,
            ..Self::default()
        }
    }

    pub fn columns(&self) -> &[ColumnFilterState] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnFilterState> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Problems reported while binding.
    pub fn diagnostics(&self) -> &[InferenceError] {
        &self.diagnostics
    }

    /// Unknown column names are reported as unfiltered.
    pub fn is_filtered(&self, name: &str) -> bool {
        self.column(name).is_some_and(ColumnFilterState::is_filtered)
    }

    pub fn any_filtered(&self) -> bool {
        self.columns.iter().any(ColumnFilterState::is_filtered)
    }

    pub fn register_filter_change<F>(&mut self, listener: F)
    where
        F: FnMut(&FilterChange) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Apply `command`, notifying listeners if the state changed.
    pub fn apply(&mut self, command: FilterCommand) -> Result<bool, FilterSetError> {
        let changed = match &command {
            FilterCommand::ClearAll => {
                let mut changed = false;
                for column in &mut self.columns {
                    changed |= column.clear();
                }
                changed
            }
            FilterCommand::ExcludeValue { column, value } => {
                self.column_mut(column)?.add_value_exclusion(value)
            }
            FilterCommand::IncludeValue { column, value } => {
                self.column_mut(column)?.remove_value_exclusion(value)
            }
            FilterCommand::ExcludeBlanks { column } => self.column_mut(column)?.exclude_blanks(),
            FilterCommand::IncludeBlanks { column } => self.column_mut(column)?.include_blanks(),
            FilterCommand::SetTextFilter { column, text } => {
                self.column_mut(column)?.set_text_filter(text)
            }
            FilterCommand::CheckAll { column } => self.column_mut(column)?.check_all(),
            FilterCommand::UncheckAll { column } => self.column_mut(column)?.uncheck_all(),
            FilterCommand::ClearColumn { column } => self.column_mut(column)?.clear(),
        };

        if changed {
            let change = match command.column() {
                Some(name) => FilterChange {
                    column: Some(name.to_string()),
                    filtered: self.is_filtered(name),
                },
                None => FilterChange {
                    column: None,
                    filtered: self.any_filtered(),
                },
            };
            self.notify(&change);
        }
        Ok(changed)
    }

    /// Remove every filter from every column.
    pub fn clear_all(&mut self) -> bool {
        // ClearAll never names a column, so it cannot fail.
        self.apply(FilterCommand::ClearAll).unwrap_or(false)
    }

    pub fn is_row_visible(&self, row: &Row) -> bool {
        is_row_visible(&self.columns, row)
    }

    /// A row predicate borrowing this set, for a grid's custom-filter hook.
    pub fn predicate(&self) -> impl Fn(&Row) -> bool + '_ {
        move |row: &Row| self.is_row_visible(row)
    }

    pub fn evaluate(&self, dataset: &Dataset) -> FilterResult {
        apply_filters(&self.columns, dataset)
    }

    pub fn snapshot(&self) -> FilterSnapshot {
        FilterSnapshot {
            columns: self
                .columns
                .iter()
                .filter(|c| c.is_filtered())
                .map(|c| (c.name().to_string(), c.filters().to_vec()))
                .collect(),
        }
    }

    fn column_mut(&mut self, name: &str) -> Result<&mut ColumnFilterState, FilterSetError> {
        self.columns
            .iter_mut()
            .find(|c| c.name() == name)
            .ok_or_else(|| FilterSetError::UnknownColumn(name.to_string()))
    }

    fn notify(&mut self, change: &FilterChange) {
        for listener in &mut self.listeners {
            listener(change);
        }
    }
}
