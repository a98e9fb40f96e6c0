pub mod comparison;
pub mod contribution;
pub mod primitives;
pub mod ranking;
pub mod snapshot;
pub mod types;
pub mod window;

pub use comparison::{
    ColumnComparison, ComparisonRow, GroupPresence, GroupScope, compare_snapshots,
    comparison_group_keys,
};
pub use contribution::{Contribution, group_contribution};
pub use ranking::{RankOrder, RankedEntry, Ranking, RankingTotals, rank_impacts};
pub use snapshot::{DuplicateGroupPolicy, GroupStat, Snapshot, build_snapshot};
pub use types::{
    AggregationKind, COUNT_COLUMN, ColumnSpec, GROUP_KEY_SEPARATOR, GroupKey, MetricCell, Row,
    rows_from_json_str,
};
pub use window::QueryWindow;
