use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;

use crate::core::primitives::decimal_to_f64;
use crate::error::{DrillError, DrillResult};

/// Separator placed between dimension values inside a [`GroupKey`].
pub const GROUP_KEY_SEPARATOR: &str = ",";

/// Canonical identity of one combination of dimension values.
///
/// Dimension names are sorted lexicographically and the matching values are
/// joined in that order, so the key does not depend on the order in which a
/// row supplied its dimensions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupKey(String);

impl GroupKey {
    /// Wraps an already-canonical key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Builds the canonical key from a row's dimension map.
    #[must_use]
    pub fn from_dims(dims: &IndexMap<String, Value>) -> Self {
        Self::from_pairs(
            dims.iter()
                .map(|(name, value)| (name.as_str(), dimension_text(value))),
        )
    }

    /// Builds the canonical key from `(name, value)` pairs in any order.
    #[must_use]
    pub fn from_pairs<'a, V>(pairs: impl IntoIterator<Item = (&'a str, V)>) -> Self
    where
        V: AsRef<str>,
    {
        let mut sorted: SmallVec<[(&'a str, V); 4]> = pairs.into_iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));

        let mut key = String::new();
        for (index, (_, value)) in sorted.iter().enumerate() {
            if index > 0 {
                key.push_str(GROUP_KEY_SEPARATOR);
            }
            key.push_str(value.as_ref());
        }
        Self(key)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GroupKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

fn dimension_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(text) => Cow::Borrowed(text.as_str()),
        Value::Null => Cow::Borrowed(""),
        other => Cow::Owned(other.to_string()),
    }
}

/// Raw aggregated cell as delivered by the query backend.
///
/// Anything that is not a JSON number is kept as-is so that the snapshot
/// builder can reject it with the offending group in the error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricCell {
    Number(f64),
    Other(Value),
}

impl From<f64> for MetricCell {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// One grouped observation from the aggregation backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    #[serde(default, alias = "_id")]
    pub dims: IndexMap<String, Value>,
    pub count: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weighted_count: Option<f64>,
    #[serde(flatten)]
    pub columns: IndexMap<String, MetricCell>,
}

impl Row {
    #[must_use]
    pub fn new(count: f64) -> Self {
        Self {
            dims: IndexMap::new(),
            count,
            weighted_count: None,
            columns: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with_dim(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.dims.insert(name.into(), Value::String(value.into()));
        self
    }

    #[must_use]
    pub fn with_weighted_count(mut self, weighted_count: f64) -> Self {
        self.weighted_count = Some(weighted_count);
        self
    }

    #[must_use]
    pub fn with_column(mut self, name: impl Into<String>, value: f64) -> Self {
        self.columns.insert(name.into(), MetricCell::Number(value));
        self
    }

    /// Adds a column from an exact decimal, rejecting values outside `f64`.
    pub fn with_decimal_column(self, name: impl Into<String>, value: Decimal) -> DrillResult<Self> {
        let name = name.into();
        let value = decimal_to_f64(value, &name)?;
        Ok(self.with_column(name, value))
    }

    #[must_use]
    pub fn group_key(&self) -> GroupKey {
        GroupKey::from_dims(&self.dims)
    }

    /// Sample weight of the row; falls back to the raw count when the backend
    /// did not report a weighted count.
    #[must_use]
    pub fn effective_weighted_count(&self) -> f64 {
        self.weighted_count.unwrap_or(self.count)
    }

    /// Reads a numeric column, describing why the cell is unusable otherwise.
    pub fn metric(&self, column: &str) -> Result<f64, String> {
        match self.columns.get(column) {
            None => Err("column is missing from the row".to_owned()),
            Some(MetricCell::Number(value)) if value.is_finite() => Ok(*value),
            Some(MetricCell::Number(value)) => Err(format!("value {value} is not finite")),
            Some(MetricCell::Other(value)) => Err(format!("value {value} is not numeric")),
        }
    }
}

/// Parses a JSON array of backend rows.
pub fn rows_from_json_str(input: &str) -> DrillResult<Vec<Row>> {
    serde_json::from_str(input)
        .map_err(|e| DrillError::InvalidData(format!("failed to parse grouped rows: {e}")))
}

/// Aggregation applied to one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationKind {
    Sum,
    Count,
    Avg,
}

impl AggregationKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Count => "count",
            Self::Avg => "avg",
        }
    }
}

impl fmt::Display for AggregationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregationKind {
    type Err = DrillError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let name = input.trim();
        let name = name.strip_prefix('$').unwrap_or(name);
        match name.to_ascii_lowercase().as_str() {
            "sum" => Ok(Self::Sum),
            "count" => Ok(Self::Count),
            "avg" => Ok(Self::Avg),
            _ => Err(DrillError::UnknownAggregation(input.to_owned())),
        }
    }
}

/// A column to evaluate and the aggregation it was computed with.
///
/// `name` is the key under which rows carry the aggregated value (for example
/// `avg(latency)`); `field` is the underlying dataset field when known.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: AggregationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Column name used for the implicit sample-count column.
pub const COUNT_COLUMN: &str = "count";

impl ColumnSpec {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: AggregationKind) -> Self {
        Self {
            name: name.into(),
            kind,
            field: None,
        }
    }

    #[must_use]
    pub fn sum(name: impl Into<String>) -> Self {
        Self::new(name, AggregationKind::Sum)
    }

    #[must_use]
    pub fn avg(name: impl Into<String>) -> Self {
        Self::new(name, AggregationKind::Avg)
    }

    /// The implicit sample-count column.
    #[must_use]
    pub fn count() -> Self {
        Self::new(COUNT_COLUMN, AggregationKind::Count)
    }

    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

impl FromStr for ColumnSpec {
    type Err = DrillError;

    /// Parses aggregation labels such as `avg(latency)`, `$sum(bytes)` or a
    /// bare `count`.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let label = input.trim();
        let Some(open) = label.find('(') else {
            let kind: AggregationKind = label.parse()?;
            if kind != AggregationKind::Count {
                return Err(DrillError::UnknownAggregation(format!(
                    "`{label}` needs a field, e.g. {kind}(field)"
                )));
            }
            return Ok(Self::new(label, kind));
        };

        let Some(inner) = label[open + 1..].strip_suffix(')') else {
            return Err(DrillError::UnknownAggregation(format!(
                "unbalanced aggregation label `{label}`"
            )));
        };
        let kind: AggregationKind = label[..open].parse()?;
        let field = inner.trim();
        if field.is_empty() {
            return Err(DrillError::UnknownAggregation(format!(
                "aggregation label `{label}` has an empty field"
            )));
        }

        Ok(Self::new(label, kind).with_field(field))
    }
}
