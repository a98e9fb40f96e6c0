use indexmap::{IndexMap, IndexSet};
use tracing::{debug, warn};

#[cfg(feature = "parallel-columns")]
use rayon::prelude::*;

use crate::core::{ColumnSpec, GroupKey, build_snapshot, compare_snapshots, comparison_group_keys};
use crate::error::{DrillError, DrillResult};

use super::{
    ColumnFailurePolicy, ColumnReport, DrillEngineConfig, DrillReport, DrillRequest,
    ReferenceShift, SampleSummary,
};

/// Entry point consumed by request handlers.
///
/// The engine holds configuration only; every `run` builds fresh snapshots
/// and shares nothing with concurrent runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DrillEngine {
    config: DrillEngineConfig,
}

impl DrillEngine {
    #[must_use]
    pub fn new(config: DrillEngineConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> DrillEngineConfig {
        self.config
    }

    /// Evaluates every column of `request`.
    pub fn run(&self, request: &DrillRequest) -> DrillResult<DrillReport> {
        request.ensure_active()?;

        let columns = request.effective_columns();
        let mut seen = IndexSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(DrillError::InvalidData(format!(
                    "column `{}` is requested twice",
                    column.name
                )));
            }
        }

        // Resolved once so every column explains the same groups.
        let groups = request.baseline.as_deref().map(|baseline| {
            comparison_group_keys(baseline, &request.rows, self.config.group_scope)
        });

        debug!(
            columns = columns.len(),
            rows = request.rows.len(),
            baseline_rows = request.baseline.as_ref().map_or(0, Vec::len),
            compared_groups = groups.as_ref().map_or(0, IndexSet::len),
            "drill request"
        );

        #[cfg(feature = "parallel-columns")]
        let outcomes: Vec<DrillResult<ColumnReport>> = columns
            .par_iter()
            .map(|column| self.evaluate_column(request, column, groups.as_ref()))
            .collect();

        #[cfg(not(feature = "parallel-columns"))]
        let outcomes: Vec<DrillResult<ColumnReport>> = columns
            .iter()
            .map(|column| self.evaluate_column(request, column, groups.as_ref()))
            .collect();

        let mut reports = IndexMap::with_capacity(columns.len());
        let mut failed_columns = IndexMap::new();
        for (column, outcome) in columns.iter().zip(outcomes) {
            match outcome {
                Ok(report) => {
                    reports.insert(column.name.clone(), report);
                }
                Err(DrillError::Cancelled) => return Err(DrillError::Cancelled),
                Err(err) => match self.config.column_failure {
                    ColumnFailurePolicy::Abort => return Err(err),
                    ColumnFailurePolicy::Skip => {
                        warn!(column = %column.name, error = %err, "skipping column");
                        failed_columns.insert(column.name.clone(), err.to_string());
                    }
                },
            }
        }

        Ok(DrillReport {
            summary: summarize(&reports),
            columns: reports,
            failed_columns,
            group_scope: request.is_comparison().then_some(self.config.group_scope),
            window: request.window,
            baseline_window: request.baseline_window,
        })
    }

    fn evaluate_column(
        &self,
        request: &DrillRequest,
        column: &ColumnSpec,
        groups: Option<&IndexSet<GroupKey>>,
    ) -> DrillResult<ColumnReport> {
        request.ensure_active()?;

        let order = self.config.rank_order;
        let snapshot = build_snapshot(&request.rows, column, self.config.duplicate_policy)?;
        let ranking = snapshot.ranking(order);

        let (baseline, comparison) = match (request.baseline.as_deref(), groups) {
            (Some(rows), Some(groups)) => {
                let baseline = build_snapshot(rows, column, self.config.duplicate_policy)?;
                let comparison = compare_snapshots(&baseline, &snapshot, groups)?;
                (Some(baseline), Some(comparison))
            }
            _ => (None, None),
        };

        debug!(
            column = %column.name,
            kind = %column.kind,
            groups = snapshot.len(),
            reference = ?snapshot.reference_value,
            compared = comparison.is_some(),
            "evaluated column"
        );

        Ok(ColumnReport {
            baseline_ranking: baseline.as_ref().map(|snapshot| snapshot.ranking(order)),
            movement_ranking: comparison.as_ref().map(|comparison| comparison.ranking(order)),
            snapshot,
            ranking,
            baseline,
            comparison,
        })
    }
}

fn summarize(reports: &IndexMap<String, ColumnReport>) -> SampleSummary {
    let Some((_, first)) = reports.first() else {
        return SampleSummary::default();
    };

    SampleSummary {
        samples: first.snapshot.count,
        baseline_samples: first.baseline.as_ref().map(|baseline| baseline.count),
        references: reports
            .iter()
            .map(|(name, report)| {
                let shift = ReferenceShift {
                    baseline: report
                        .baseline
                        .as_ref()
                        .and_then(|baseline| baseline.reference_value),
                    current: report.snapshot.reference_value,
                };
                (name.clone(), shift)
            })
            .collect(),
    }
}
