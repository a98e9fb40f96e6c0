use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DrillError, DrillResult};

/// Half-open `[start, end)` time range a grouped result set was queried over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl QueryWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> DrillResult<Self> {
        if start >= end {
            return Err(DrillError::InvalidData(format!(
                "query window start {start} must be before end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// The same window moved back by `offset`; used to derive the baseline
    /// period of a comparison query.
    pub fn shifted_back(self, offset: Duration) -> DrillResult<Self> {
        if offset <= Duration::zero() {
            return Err(DrillError::InvalidData(
                "comparison offset must be positive".to_owned(),
            ));
        }
        let shift = |time: DateTime<Utc>| {
            time.checked_sub_signed(offset).ok_or_else(|| {
                DrillError::InvalidData(format!("comparison offset {offset} overflows {time}"))
            })
        };
        Self::new(shift(self.start)?, shift(self.end)?)
    }

    #[must_use]
    pub fn span(self) -> Duration {
        self.end - self.start
    }
}
