use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Duration;

use crate::core::{ColumnSpec, QueryWindow, Row};
use crate::error::{DrillError, DrillResult};

/// Materialized input of one drill evaluation.
///
/// Rows must already be fetched; the engine never performs I/O. A baseline
/// row set switches the request into comparison mode.
#[derive(Debug, Clone, Default)]
pub struct DrillRequest {
    pub columns: Vec<ColumnSpec>,
    pub rows: Vec<Row>,
    pub baseline: Option<Vec<Row>>,
    pub window: Option<QueryWindow>,
    pub baseline_window: Option<QueryWindow>,
    cancel: Option<Arc<AtomicBool>>,
}

impl DrillRequest {
    #[must_use]
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_column(mut self, column: ColumnSpec) -> Self {
        self.columns.push(column);
        self
    }

    #[must_use]
    pub fn with_columns(mut self, columns: impl IntoIterator<Item = ColumnSpec>) -> Self {
        self.columns.extend(columns);
        self
    }

    /// Adds columns from aggregation labels such as `avg(latency)`.
    pub fn with_column_labels<'a>(
        mut self,
        labels: impl IntoIterator<Item = &'a str>,
    ) -> DrillResult<Self> {
        for label in labels {
            self.columns.push(label.parse()?);
        }
        Ok(self)
    }

    #[must_use]
    pub fn with_baseline(mut self, rows: Vec<Row>) -> Self {
        self.baseline = Some(rows);
        self
    }

    #[must_use]
    pub fn with_window(mut self, window: QueryWindow) -> Self {
        self.window = Some(window);
        self
    }

    #[must_use]
    pub fn with_baseline_window(mut self, window: QueryWindow) -> Self {
        self.baseline_window = Some(window);
        self
    }

    /// Derives the baseline window by moving the current window back by `offset`.
    pub fn with_comparison_offset(mut self, offset: Duration) -> DrillResult<Self> {
        let window = self.window.ok_or_else(|| {
            DrillError::InvalidData(
                "a comparison offset needs the current query window".to_owned(),
            )
        })?;
        self.baseline_window = Some(window.shifted_back(offset)?);
        Ok(self)
    }

    /// Shares a flag the host sets when the request is superseded.
    #[must_use]
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    #[must_use]
    pub fn is_comparison(&self) -> bool {
        self.baseline.is_some()
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    pub(crate) fn ensure_active(&self) -> DrillResult<()> {
        if self.is_cancelled() {
            return Err(DrillError::Cancelled);
        }
        Ok(())
    }

    /// Columns to evaluate; the implicit `count` column when none were named.
    #[must_use]
    pub fn effective_columns(&self) -> Vec<ColumnSpec> {
        if self.columns.is_empty() {
            return vec![ColumnSpec::count()];
        }
        self.columns.clone()
    }
}
