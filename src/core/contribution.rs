use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::primitives::{difference, ratio_of};
use crate::core::{AggregationKind, GroupKey, GroupStat, Snapshot};

/// How far one group sits from the whole-dataset reference value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub group_value: Option<f64>,
    /// `reference_value - group_value`.
    pub delta: Option<f64>,
    /// `delta / reference_value`; a raw ratio, not a percentage.
    pub diff: Option<f64>,
}

/// Computes a group's delta and impact fraction.
///
/// The comparator is the counterfactual dataset average for `avg`, the
/// group's own total for `sum` and its weighted count for `count`.
#[must_use]
pub fn group_contribution(
    kind: AggregationKind,
    reference_value: Option<f64>,
    own_value: f64,
    weighted_count: f64,
    excl_value: Option<f64>,
) -> Contribution {
    let group_value = match kind {
        AggregationKind::Avg => excl_value,
        AggregationKind::Sum => Some(own_value),
        AggregationKind::Count => Some(weighted_count),
    };
    let delta = difference(reference_value, group_value);
    let diff = ratio_of(delta, reference_value);

    Contribution {
        group_value,
        delta,
        diff,
    }
}

impl Snapshot {
    #[must_use]
    pub fn kind(&self) -> AggregationKind {
        self.column.kind
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.per_group.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.per_group.is_empty()
    }

    #[must_use]
    pub fn group(&self, key: &GroupKey) -> Option<&GroupStat> {
        self.per_group.get(key)
    }

    /// Group keys in discovery order.
    pub fn group_keys(&self) -> impl Iterator<Item = &GroupKey> + '_ {
        self.per_group.keys()
    }

    #[must_use]
    pub fn contribution(&self, key: &GroupKey) -> Option<Contribution> {
        self.per_group.get(key).map(|stat| Contribution {
            group_value: stat.group_value,
            delta: stat.delta,
            diff: stat.diff,
        })
    }

    /// Impact fraction per group, in discovery order.
    #[must_use]
    pub fn diffs(&self) -> IndexMap<GroupKey, Option<f64>> {
        self.per_group
            .iter()
            .map(|(key, stat)| (key.clone(), stat.diff))
            .collect()
    }
}
