mod engine;
mod engine_config;
mod json_contract;
mod report;
mod request;

pub use engine::DrillEngine;
pub use engine_config::{ColumnFailurePolicy, DrillEngineConfig};
pub use json_contract::{DRILL_REPORT_JSON_SCHEMA_V1, DrillReportJsonContractV1};
pub use report::{ColumnReport, DrillReport, ReferenceShift, SampleSummary};
pub use request::DrillRequest;
