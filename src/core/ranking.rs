use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::{AggregationKind, ColumnComparison, GroupKey, Snapshot};

/// Direction in which groups are ordered by absolute impact.
///
/// Undefined impacts always come last, whatever the direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankOrder {
    #[default]
    Descending,
    Ascending,
}

/// Whole-snapshot summary placed ahead of the ranked groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingTotals {
    pub column: String,
    pub kind: AggregationKind,
    pub total: f64,
    pub count: f64,
    pub reference_value: Option<f64>,
    pub groups: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entry", rename_all = "snake_case")]
pub enum RankedEntry {
    Totals(RankingTotals),
    Group {
        key: GroupKey,
        impact: Option<f64>,
    },
}

/// Totals entry followed by groups ordered by absolute impact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub entries: Vec<RankedEntry>,
}

impl Ranking {
    #[must_use]
    pub fn totals(&self) -> Option<&RankingTotals> {
        self.entries.iter().find_map(|entry| match entry {
            RankedEntry::Totals(totals) => Some(totals),
            RankedEntry::Group { .. } => None,
        })
    }

    /// Ranked groups with their impact, totals entry excluded.
    pub fn groups(&self) -> impl Iterator<Item = (&GroupKey, Option<f64>)> + '_ {
        self.entries.iter().filter_map(|entry| match entry {
            RankedEntry::Group { key, impact } => Some((key, *impact)),
            RankedEntry::Totals(_) => None,
        })
    }

    #[must_use]
    pub fn group_keys(&self) -> Vec<&GroupKey> {
        self.groups().map(|(key, _)| key).collect()
    }

    /// Zero-based rank of `key` among the groups.
    #[must_use]
    pub fn position(&self, key: &GroupKey) -> Option<usize> {
        self.groups().position(|(candidate, _)| candidate == key)
    }
}

/// Orders `impacts` by absolute value behind a totals entry.
///
/// The sort is stable: equal magnitudes keep the order in which `impacts`
/// yields them. Non-finite impacts are treated as undefined.
#[must_use]
pub fn rank_impacts<I>(totals: RankingTotals, impacts: I, order: RankOrder) -> Ranking
where
    I: IntoIterator<Item = (GroupKey, Option<f64>)>,
{
    let mut groups: Vec<(GroupKey, Option<f64>)> = impacts
        .into_iter()
        .map(|(key, impact)| (key, impact.filter(|value| value.is_finite())))
        .collect();
    groups.sort_by_key(|(_, impact)| rank_key(*impact, order));

    let mut entries = Vec::with_capacity(groups.len() + 1);
    entries.push(RankedEntry::Totals(totals));
    entries.extend(
        groups
            .into_iter()
            .map(|(key, impact)| RankedEntry::Group { key, impact }),
    );
    Ranking { entries }
}

fn rank_key(impact: Option<f64>, order: RankOrder) -> (bool, OrderedFloat<f64>) {
    match impact {
        None => (true, OrderedFloat(0.0)),
        Some(value) => match order {
            RankOrder::Descending => (false, OrderedFloat(-value.abs())),
            RankOrder::Ascending => (false, OrderedFloat(value.abs())),
        },
    }
}

impl Snapshot {
    /// Ranks groups by their impact fraction (`diff`).
    #[must_use]
    pub fn ranking(&self, order: RankOrder) -> Ranking {
        let totals = RankingTotals {
            column: self.column.name.clone(),
            kind: self.column.kind,
            total: self.total,
            count: self.count,
            reference_value: self.reference_value,
            groups: self.per_group.len(),
        };
        rank_impacts(totals, self.diffs(), order)
    }
}

impl ColumnComparison {
    /// Ranks groups by the share of the period-over-period movement they explain.
    #[must_use]
    pub fn ranking(&self, order: RankOrder) -> Ranking {
        let totals = RankingTotals {
            column: self.column.name.clone(),
            kind: self.column.kind,
            total: self.total,
            count: self.count,
            reference_value: self.reference_value,
            groups: self.rows.len(),
        };
        let impacts = self
            .movements
            .iter()
            .map(|(key, impact)| (key.clone(), *impact));
        rank_impacts(totals, impacts, order)
    }
}
