use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize, Serializer};
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A present field value in a row record.
///
/// Serialized untagged so rows map onto plain JSON objects
/// (`{"Name": "Bob", "Age": 30}`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            FieldValue::Number(_) => ValueKind::Number,
            FieldValue::Text(_) => ValueKind::String,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }

    /// Text used when a value is matched against a text pattern.
    ///
    /// Integral numbers render without a fractional part (`30`, not `30.0`).
    pub fn display_text(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Text(s) => Cow::Borrowed(s),
            FieldValue::Number(n) => Cow::Owned(format_number(*n)),
        }
    }

    fn sort_key(&self) -> SortKey {
        match self {
            FieldValue::Number(n) => SortKey::Number(OrderedFloat(*n)),
            FieldValue::Text(s) => SortKey::Text(s.clone()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(f64::from(value))
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

fn format_number(n: f64) -> String {
    // Normalize -0 so it renders the same as 0.
    let n = if n == 0.0 { 0.0 } else { n };
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

/// The kind of value a row holds for a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    String,
    Number,
    Absent,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueKind::String => "string",
            ValueKind::Number => "number",
            ValueKind::Absent => "absent",
        })
    }
}

/// Total order used for distinct value lists: numbers ascending, then strings in code point
/// order.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    Number(OrderedFloat<f64>),
    Text(String),
}

/// Collect the distinct values of `values`, sorted ascending.
pub fn distinct_sorted<'a, I>(values: I) -> Vec<FieldValue>
where
    I: IntoIterator<Item = &'a FieldValue>,
{
    let mut seen: BTreeSet<SortKey> = BTreeSet::new();
    let mut out: Vec<(SortKey, FieldValue)> = Vec::new();
    for value in values {
        let key = value.sort_key();
        if seen.insert(key.clone()) {
            out.push((key, value.clone()));
        }
    }
    out.sort_by(|a, b| a.0.cmp(&b.0));
    out.into_iter().map(|(_, value)| value).collect()
}

/// A row record: a mapping from column name to value.
///
/// A column missing from the mapping is *absent* (a blank). When deserializing, JSON `null`
/// is treated the same as a missing key.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(from = "BTreeMap<String, Option<FieldValue>>")]
pub struct Row {
    fields: BTreeMap<String, FieldValue>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(
        &mut self,
        column: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Option<FieldValue> {
        self.fields.insert(column.into(), value.into())
    }

    pub fn remove(&mut self, column: &str) -> Option<FieldValue> {
        self.fields.remove(column)
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields.get(column)
    }

    pub fn kind_of(&self, column: &str) -> ValueKind {
        self.get(column)
            .map(FieldValue::kind)
            .unwrap_or(ValueKind::Absent)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl From<BTreeMap<String, Option<FieldValue>>> for Row {
    fn from(raw: BTreeMap<String, Option<FieldValue>>) -> Self {
        let fields = raw
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k, v)))
            .collect();
        Self { fields }
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let fields = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { fields }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn display_text_drops_trailing_zero_fraction() {
        assert_eq!(FieldValue::Number(30.0).display_text(), "30");
        assert_eq!(FieldValue::Number(-0.0).display_text(), "0");
        assert_eq!(FieldValue::Number(2.5).display_text(), "2.5");
        assert_eq!(FieldValue::from("Bob").display_text(), "Bob");
    }

    #[test]
    fn distinct_sorted_orders_numbers_before_text() {
        let values = vec![
            FieldValue::from("b"),
            FieldValue::from(30),
            FieldValue::from("a"),
            FieldValue::from(25),
            FieldValue::from(30),
            FieldValue::from("b"),
        ];
        assert_eq!(
            distinct_sorted(&values),
            vec![
                FieldValue::from(25),
                FieldValue::from(30),
                FieldValue::from("a"),
                FieldValue::from("b"),
            ]
        );
    }

    #[test]
    fn row_deserializes_null_as_absent() {
        let row: Row = serde_json::from_str(r#"{"Name":"Frank","Age":null}"#).unwrap();
        assert_eq!(row.kind_of("Name"), ValueKind::String);
        assert_eq!(row.kind_of("Age"), ValueKind::Absent);
        assert_eq!(row.len(), 1);
    }

    #[test]
    fn row_serializes_as_plain_object() {
        let row = Row::new().with("Name", "Bob").with("Age", 30);
        assert_eq!(
            serde_json::to_string(&row).unwrap(),
            r#"{"Age":30.0,"Name":"Bob"}"#
        );
    }
}
