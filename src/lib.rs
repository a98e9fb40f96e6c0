//! drill-rs: group impact attribution for drill-down analytics.
//!
//! Given rows already grouped by categorical dimensions, the engine computes
//! dataset-wide rollups, what each aggregate would be without a given group,
//! and, when a time-shifted baseline is supplied, how much of the
//! period-over-period movement each group explains.
//!
//! Everything is a pure computation over materialized rows: `core` holds the
//! arithmetic, `api` the request/report facade used by request handlers.

pub mod api;
pub mod core;
pub mod error;
pub mod telemetry;

pub use api::{DrillEngine, DrillEngineConfig, DrillReport, DrillRequest};
pub use error::{DrillError, DrillResult};
