use std::collections::VecDeque;

use column_filter_model::{Dataset, Row};

use crate::predicate::FilterResult;
use crate::set::{ColumnFilterSet, FilterChange, FilterCommand};
use crate::FilterSetError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableOptions {
    /// Number of evaluated filter states to remember, keyed by their snapshot. `0` disables
    /// caching.
    pub cache_entries: usize,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self { cache_entries: 16 }
    }
}

/// A dataset together with its column filters and the current row visibility.
///
/// Every command that changes the filters re-evaluates the whole dataset before returning.
#[derive(Debug)]
pub struct FilteredTable {
    dataset: Dataset,
    column_names: Vec<String>,
    filters: ColumnFilterSet,
    options: TableOptions,
    result: FilterResult,
    cache: VecDeque<(String, FilterResult)>,
}

impl FilteredTable {
    pub fn new<S: AsRef<str>>(dataset: Dataset, column_names: &[S]) -> Self {
        Self::with_options(dataset, column_names, TableOptions::default())
    }

    pub fn with_options<S: AsRef<str>>(
        dataset: Dataset,
        column_names: &[S],
        options: TableOptions,
    ) -> Self {
        let filters = ColumnFilterSet::bind(column_names, &dataset);
        let mut table = Self {
            dataset,
            column_names: column_names.iter().map(|s| s.as_ref().to_string()).collect(),
            filters,
            options,
            result: FilterResult {
                visible_rows: Vec::new(),
                hidden_rows: Vec::new(),
            },
            cache: VecDeque::new(),
        };
        table.refresh();
        table
    }

    /// Replace the dataset. All filters are reset and column types are inferred again.
    pub fn rebind(&mut self, dataset: Dataset) {
        self.dataset = dataset;
        self.filters.rebind(&self.column_names, &self.dataset);
        self.cache.clear();
        self.refresh();
    }

    pub fn dispatch(&mut self, command: FilterCommand) -> Result<bool, FilterSetError> {
        let changed = self.filters.apply(command)?;
        if changed {
            self.refresh();
        }
        Ok(changed)
    }

    pub fn clear_all(&mut self) -> bool {
        let changed = self.filters.clear_all();
        if changed {
            self.refresh();
        }
        changed
    }

    pub fn register_filter_change<F>(&mut self, listener: F)
    where
        F: FnMut(&FilterChange) + 'static,
    {
        self.filters.register_filter_change(listener);
    }

    pub fn filters(&self) -> &ColumnFilterSet {
        &self.filters
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn result(&self) -> &FilterResult {
        &self.result
    }

    pub fn visible_count(&self) -> usize {
        self.result.visible_count()
    }

    pub fn visible_rows(&self) -> impl Iterator<Item = &Row> {
        self.dataset
            .iter()
            .zip(self.result.visible_rows.iter())
            .filter_map(|(row, visible)| visible.then_some(row))
    }

    fn refresh(&mut self) {
        let key = match self.filters.snapshot().to_key() {
            Ok(key) => key,
            Err(err) => {
                log::debug!("filter snapshot not cacheable: {err}");
                self.result = self.filters.evaluate(&self.dataset);
                return;
            }
        };

        if let Some((_, cached)) = self.cache.iter().find(|(k, _)| *k == key) {
            self.result = cached.clone();
            return;
        }

        self.result = self.filters.evaluate(&self.dataset);
        log::debug!(
            "re-evaluated {} rows: {} visible",
            self.dataset.len(),
            self.result.visible_count()
        );

        if self.options.cache_entries == 0 {
            return;
        }
        while self.cache.len() >= self.options.cache_entries {
            self.cache.pop_front();
        }
        self.cache.push_back((key, self.result.clone()));
    }
}
