//! Result storage data types.

use ep_engine::YearlyResult;
use serde::{Deserialize, Serialize};

pub type RunId = String;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: RunId,
    pub scenario: String,
    pub timestamp: String,
    pub start_year: i32,
    pub end_year: i32,
    pub engine_version: String,
}

impl RunManifest {
    /// Manifest stamped with the current UTC time.
    pub fn new(
        run_id: RunId,
        scenario: String,
        start_year: i32,
        end_year: i32,
        engine_version: &str,
    ) -> Self {
        Self {
            run_id,
            scenario,
            timestamp: chrono::Utc::now().to_rfc3339(),
            start_year,
            end_year,
            engine_version: engine_version.to_string(),
        }
    }
}

/// One stored projection year, one JSONL line each.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearRecord {
    pub year: i32,
    #[serde(flatten)]
    pub result: YearlyResult,
}
