use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::primitives::{difference, finite, ratio, ratio_of};
use crate::core::{AggregationKind, ColumnSpec, GroupKey, GroupStat, Row, Snapshot};
use crate::error::{DrillError, DrillResult};

/// Which groups a comparison explains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupScope {
    /// Every group seen in either period.
    #[default]
    Union,
    /// Only groups present in the baseline period; groups that appear for the
    /// first time in the current period are left out.
    BaselineOnly,
}

/// Where a compared group was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupPresence {
    Both,
    BaselineOnly,
    CurrentOnly,
    Neither,
}

/// Movement attributed to one group for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub group: GroupKey,
    pub presence: GroupPresence,
    /// Weighted counts per period; zero when the group is absent.
    pub old_count: f64,
    pub new_count: f64,
    pub old_value: f64,
    pub new_value: f64,
    /// Current aggregate recomputed with this group's baseline data.
    pub blended_value: Option<f64>,
    /// `reference - blended_value`.
    pub delta: Option<f64>,
    /// `delta / reference * 100`.
    pub impact_pct: Option<f64>,
}

/// Period-over-period attribution for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnComparison {
    pub column: ColumnSpec,
    /// Current-period rollup.
    pub total: f64,
    pub count: f64,
    pub baseline_reference_value: Option<f64>,
    /// Current-period reference the deltas are taken against.
    pub reference_value: Option<f64>,
    pub rows: Vec<ComparisonRow>,
    /// `impact_pct` per group, in the order of the evaluated group set.
    pub movements: IndexMap<GroupKey, Option<f64>>,
}

impl ColumnComparison {
    #[must_use]
    pub fn row(&self, group: &GroupKey) -> Option<&ComparisonRow> {
        self.rows.iter().find(|row| &row.group == group)
    }
}

/// Resolves the groups a comparison evaluates, before any column is built.
///
/// Keys keep discovery order: current-period groups first, then groups only
/// seen in the baseline.
#[must_use]
pub fn comparison_group_keys(
    baseline: &[Row],
    current: &[Row],
    scope: GroupScope,
) -> IndexSet<GroupKey> {
    match scope {
        GroupScope::BaselineOnly => baseline.iter().map(Row::group_key).collect(),
        GroupScope::Union => current
            .iter()
            .chain(baseline.iter())
            .map(Row::group_key)
            .collect(),
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct PeriodSide {
    weighted_count: f64,
    own_value: f64,
}

impl From<Option<&GroupStat>> for PeriodSide {
    fn from(stat: Option<&GroupStat>) -> Self {
        stat.map_or_else(Self::default, |stat| Self {
            weighted_count: stat.weighted_count,
            own_value: stat.own_value,
        })
    }
}

/// Attributes the movement between `old` and `new` to each group in `groups`.
///
/// A group missing from either snapshot contributes zero value and zero
/// weight on that side.
pub fn compare_snapshots(
    old: &Snapshot,
    new: &Snapshot,
    groups: &IndexSet<GroupKey>,
) -> DrillResult<ColumnComparison> {
    if old.column != new.column {
        return Err(DrillError::ColumnMismatch {
            old: old.column.name.clone(),
            new: new.column.name.clone(),
        });
    }

    let kind = new.kind();
    let reference = match kind {
        AggregationKind::Avg => new.reference_value,
        AggregationKind::Sum => Some(new.total),
        AggregationKind::Count => Some(new.count),
    };

    let mut rows = Vec::with_capacity(groups.len());
    let mut movements = IndexMap::with_capacity(groups.len());

    for group in groups {
        let old_stat = old.group(group);
        let new_stat = new.group(group);
        let presence = match (old_stat.is_some(), new_stat.is_some()) {
            (true, true) => GroupPresence::Both,
            (true, false) => GroupPresence::BaselineOnly,
            (false, true) => GroupPresence::CurrentOnly,
            (false, false) => GroupPresence::Neither,
        };
        let before = PeriodSide::from(old_stat);
        let after = PeriodSide::from(new_stat);

        let blended_value = match kind {
            AggregationKind::Avg => {
                let subtracted = new.total - after.weighted_count * after.own_value;
                let blended_total = subtracted + before.weighted_count * before.own_value;
                let blended_count = new.count - after.weighted_count + before.weighted_count;
                ratio(blended_total, blended_count)
            }
            AggregationKind::Sum => finite(new.total - after.own_value + before.own_value),
            AggregationKind::Count => {
                finite(new.count - after.weighted_count + before.weighted_count)
            }
        };
        let delta = difference(reference, blended_value);
        let impact_pct = ratio_of(delta, reference).map(|fraction| fraction * 100.0);

        movements.insert(group.clone(), impact_pct);
        rows.push(ComparisonRow {
            group: group.clone(),
            presence,
            old_count: before.weighted_count,
            new_count: after.weighted_count,
            old_value: before.own_value,
            new_value: after.own_value,
            blended_value,
            delta,
            impact_pct,
        });
    }

    trace!(
        column = %new.column.name,
        groups = rows.len(),
        "compared snapshots"
    );

    Ok(ColumnComparison {
        column: new.column.clone(),
        total: new.total,
        count: new.count,
        baseline_reference_value: old.reference_value,
        reference_value: reference,
        rows,
        movements,
    })
}
