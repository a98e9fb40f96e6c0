use serde::{Deserialize, Serialize};

use crate::core::{DuplicateGroupPolicy, GroupScope, RankOrder};
use crate::error::{DrillError, DrillResult};

/// What the engine does when one column of a request cannot be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnFailurePolicy {
    /// Fail the whole request with the column's error.
    #[default]
    Abort,
    /// Leave the column out of the report and record its error.
    Skip,
}

/// Engine configuration.
///
/// This type is serializable so hosts can keep drill settings next to the rest
/// of their dashboard configuration. Every field has a default, so partial
/// documents are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DrillEngineConfig {
    #[serde(default)]
    pub group_scope: GroupScope,
    #[serde(default)]
    pub duplicate_policy: DuplicateGroupPolicy,
    #[serde(default)]
    pub rank_order: RankOrder,
    #[serde(default)]
    pub column_failure: ColumnFailurePolicy,
}

impl DrillEngineConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets which groups a comparison explains.
    #[must_use]
    pub fn with_group_scope(mut self, group_scope: GroupScope) -> Self {
        self.group_scope = group_scope;
        self
    }

    #[must_use]
    pub fn with_duplicate_policy(mut self, duplicate_policy: DuplicateGroupPolicy) -> Self {
        self.duplicate_policy = duplicate_policy;
        self
    }

    #[must_use]
    pub fn with_rank_order(mut self, rank_order: RankOrder) -> Self {
        self.rank_order = rank_order;
        self
    }

    #[must_use]
    pub fn with_column_failure(mut self, column_failure: ColumnFailurePolicy) -> Self {
        self.column_failure = column_failure;
        self
    }

    pub fn from_json_str(input: &str) -> DrillResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| DrillError::InvalidData(format!("failed to parse engine config: {e}")))
    }

    pub fn to_json_pretty(self) -> DrillResult<String> {
        serde_json::to_string_pretty(&self)
            .map_err(|e| DrillError::InvalidData(format!("failed to serialize engine config: {e}")))
    }
}
