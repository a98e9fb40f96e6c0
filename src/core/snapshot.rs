use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::core::contribution::group_contribution;
use crate::core::primitives::ratio;
use crate::core::{AggregationKind, ColumnSpec, GroupKey, Row};
use crate::error::{DrillError, DrillResult};

/// What to do when two rows of one result set map to the same [`GroupKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateGroupPolicy {
    /// Fail the column with [`DrillError::DuplicateGroup`].
    #[default]
    Reject,
    /// Keep the position of the first row and the values of the last one.
    LastWriteWins,
}

/// Per-group counterfactual statistics for one column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupStat {
    /// Raw sample count reported by the backend.
    pub count: f64,
    pub weighted_count: f64,
    /// Column value for `sum`/`avg`, weighted count for `count`.
    pub own_value: f64,
    pub excl_sum: f64,
    pub excl_count: f64,
    /// Dataset aggregate with this group removed.
    pub excl_value: Option<f64>,
    /// Comparator the delta is taken against.
    pub group_value: Option<f64>,
    pub delta: Option<f64>,
    pub diff: Option<f64>,
}

/// Dataset-wide rollup plus per-group statistics for one column over one
/// time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub column: ColumnSpec,
    pub total: f64,
    pub count: f64,
    /// Aggregate in the column's own units; `None` when undefined.
    pub reference_value: Option<f64>,
    /// Groups in the order they were first observed.
    pub per_group: IndexMap<GroupKey, GroupStat>,
}

#[derive(Debug, Clone, Copy)]
struct Observation {
    row: usize,
    count: f64,
    weighted_count: f64,
    own_value: f64,
}

/// Builds the snapshot of `column` over one grouped result set.
///
/// Rollups are summed in [`GroupKey`] order, so any permutation of the same
/// rows produces bit-identical totals. A rollup that overflows `f64` fails the
/// column instead of carrying an infinity into the report.
pub fn build_snapshot(
    rows: &[Row],
    column: &ColumnSpec,
    duplicates: DuplicateGroupPolicy,
) -> DrillResult<Snapshot> {
    let observations = observe_rows(rows, column, duplicates)?;

    let mut canonical: Vec<(&GroupKey, &Observation)> = observations.iter().collect();
    canonical.sort_by(|a, b| a.0.cmp(b.0));

    let weighted_sum: f64 = canonical.iter().map(|(_, obs)| obs.weighted_count).sum();
    let (total, count): (f64, f64) = match column.kind {
        AggregationKind::Avg => (
            canonical
                .iter()
                .map(|(_, obs)| obs.weighted_count * obs.own_value)
                .sum(),
            weighted_sum,
        ),
        AggregationKind::Sum => (
            canonical.iter().map(|(_, obs)| obs.own_value).sum(),
            weighted_sum,
        ),
        AggregationKind::Count => (weighted_sum, weighted_sum),
    };

    if !total.is_finite() || !count.is_finite() {
        return Err(DrillError::InvalidData(format!(
            "column `{}` rollup overflows f64 (total {total}, count {count})",
            column.name
        )));
    }

    let reference_value = match column.kind {
        AggregationKind::Avg => ratio(total, count),
        AggregationKind::Sum => Some(total),
        AggregationKind::Count => Some(count),
    };

    let per_group = observations
        .into_iter()
        .map(|(key, obs)| {
            let excl_sum = total - obs.weighted_count * obs.own_value;
            let excl_count = count - obs.weighted_count;
            if !excl_sum.is_finite() || !excl_count.is_finite() {
                return Err(DrillError::InvalidData(format!(
                    "column `{}` counterfactual for group `{key}` overflows f64",
                    column.name
                )));
            }
            // A weightless group has no average of its own to remove.
            let excl_value = if column.kind == AggregationKind::Avg && obs.weighted_count == 0.0
            {
                None
            } else {
                ratio(excl_sum, excl_count)
            };
            let contribution = group_contribution(
                column.kind,
                reference_value,
                obs.own_value,
                obs.weighted_count,
                excl_value,
            );
            let stat = GroupStat {
                count: obs.count,
                weighted_count: obs.weighted_count,
                own_value: obs.own_value,
                excl_sum,
                excl_count,
                excl_value,
                group_value: contribution.group_value,
                delta: contribution.delta,
                diff: contribution.diff,
            };
            Ok((key, stat))
        })
        .collect::<DrillResult<IndexMap<_, _>>>()?;

    trace!(
        column = %column.name,
        kind = %column.kind,
        groups = per_group.len(),
        total,
        count,
        "built snapshot"
    );

    Ok(Snapshot {
        column: column.clone(),
        total,
        count,
        reference_value,
        per_group,
    })
}

fn observe_rows(
    rows: &[Row],
    column: &ColumnSpec,
    duplicates: DuplicateGroupPolicy,
) -> DrillResult<IndexMap<GroupKey, Observation>> {
    let mut observations: IndexMap<GroupKey, Observation> = IndexMap::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let key = row.group_key();
        let malformed = |field: &str, reason: String| DrillError::MalformedColumn {
            column: field.to_owned(),
            group: key.to_string(),
            row: index,
            reason,
        };

        if !row.count.is_finite() || row.count < 0.0 {
            return Err(malformed(
                "count",
                format!("sample count {} must be finite and >= 0", row.count),
            ));
        }
        let weighted_count = row.effective_weighted_count();
        if !weighted_count.is_finite() || weighted_count < 0.0 {
            return Err(malformed(
                "weighted_count",
                format!("weighted count {weighted_count} must be finite and >= 0"),
            ));
        }

        let own_value = match column.kind {
            AggregationKind::Count => weighted_count,
            AggregationKind::Sum | AggregationKind::Avg => row
                .metric(&column.name)
                .map_err(|reason| malformed(&column.name, reason))?,
        };

        let observation = Observation {
            row: index,
            count: row.count,
            weighted_count,
            own_value,
        };

        match observations.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(observation);
            }
            Entry::Occupied(mut slot) => match duplicates {
                DuplicateGroupPolicy::Reject => {
                    return Err(DrillError::DuplicateGroup {
                        group: slot.key().to_string(),
                        first_row: slot.get().row,
                        row: index,
                    });
                }
                DuplicateGroupPolicy::LastWriteWins => {
                    warn!(
                        column = %column.name,
                        group = %slot.key(),
                        first_row = slot.get().row,
                        row = index,
                        "duplicate group overwritten"
                    );
                    slot.insert(observation);
                }
            },
        }
    }

    Ok(observations)
}
