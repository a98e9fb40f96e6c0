use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{ColumnComparison, GroupScope, QueryWindow, Ranking, Snapshot};

/// Attribution output for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnReport {
    pub snapshot: Snapshot,
    /// Groups ranked by `diff` against the current snapshot.
    pub ranking: Ranking,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<Snapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline_ranking: Option<Ranking>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ColumnComparison>,
    /// Groups ranked by `impact_pct` of this column's comparison.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movement_ranking: Option<Ranking>,
}

/// Baseline and current reference values of one column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceShift {
    pub baseline: Option<f64>,
    pub current: Option<f64>,
}

/// Headline numbers of a drill report.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SampleSummary {
    /// Weighted sample count of the first evaluated column.
    pub samples: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline_samples: Option<f64>,
    pub references: IndexMap<String, ReferenceShift>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DrillReport {
    /// Column reports in request order.
    pub columns: IndexMap<String, ColumnReport>,
    /// Columns left out under `ColumnFailurePolicy::Skip`, with their error.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub failed_columns: IndexMap<String, String>,
    pub summary: SampleSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_scope: Option<GroupScope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<QueryWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline_window: Option<QueryWindow>,
}

impl DrillReport {
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnReport> {
        self.columns.get(name)
    }

    #[must_use]
    pub fn is_comparison(&self) -> bool {
        self.group_scope.is_some()
    }

    /// Single-period ranking of `column`.
    #[must_use]
    pub fn diff_ranking(&self, column: &str) -> Option<&Ranking> {
        self.column(column).map(|report| &report.ranking)
    }

    /// Movement ranking of `column`; `None` outside comparison mode.
    ///
    /// Each column keeps its own movements, so a multi-column comparison asks
    /// for the column that should drive the headline ordering.
    #[must_use]
    pub fn movement_ranking(&self, column: &str) -> Option<&Ranking> {
        self.column(column)
            .and_then(|report| report.movement_ranking.as_ref())
    }
}
