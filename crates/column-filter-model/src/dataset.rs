use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::Read;
use thiserror::Error;

use crate::Row;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset json is invalid: {0}")]
    Json(#[from] serde_json::Error),
}

/// An ordered sequence of row records.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    rows: Vec<Row>,
}

impl Dataset {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Parse a JSON array of objects. `null` fields are treated as absent.
    pub fn from_json_str(json: &str) -> Result<Self, DatasetError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Every column name present in at least one row, sorted.
    pub fn column_names(&self) -> Vec<String> {
        let names: BTreeSet<&str> = self
            .rows
            .iter()
            .flat_map(|row| row.iter().map(|(name, _)| name))
            .collect();
        names.into_iter().map(str::to_string).collect()
    }
}

impl From<Vec<Row>> for Dataset {
    fn from(rows: Vec<Row>) -> Self {
        Self::new(rows)
    }
}

impl FromIterator<Row> for Dataset {
    fn from_iter<T: IntoIterator<Item = Row>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
