use serde::{Deserialize, Serialize};

use crate::error::{DrillError, DrillResult};

use super::DrillReport;

pub const DRILL_REPORT_JSON_SCHEMA_V1: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillReportJsonContractV1 {
    pub schema_version: u32,
    pub report: DrillReport,
}

impl DrillReport {
    pub fn to_json_pretty(&self) -> DrillResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| DrillError::InvalidData(format!("failed to serialize drill report: {e}")))
    }

    pub fn to_json_contract_v1_pretty(&self) -> DrillResult<String> {
        let payload = DrillReportJsonContractV1 {
            schema_version: DRILL_REPORT_JSON_SCHEMA_V1,
            report: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            DrillError::InvalidData(format!("failed to serialize drill report contract v1: {e}"))
        })
    }

    /// Accepts either a bare report or a versioned contract envelope.
    pub fn from_json_compat_str(input: &str) -> DrillResult<Self> {
        let value: serde_json::Value = serde_json::from_str(input).map_err(|e| {
            DrillError::InvalidData(format!("failed to parse drill report json payload: {e}"))
        })?;
        if value.get("schema_version").is_none() {
            return serde_json::from_value(value).map_err(|e| {
                DrillError::InvalidData(format!("failed to parse drill report: {e}"))
            });
        }

        let payload: DrillReportJsonContractV1 = serde_json::from_value(value).map_err(|e| {
            DrillError::InvalidData(format!("failed to parse drill report contract: {e}"))
        })?;
        if payload.schema_version != DRILL_REPORT_JSON_SCHEMA_V1 {
            return Err(DrillError::InvalidData(format!(
                "unsupported drill report schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.report)
    }
}
