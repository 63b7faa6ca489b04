//! Run summary (run_summary.json)
//!
//! One summary per processing pass, aggregating per-file outcomes.

use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Schema version for run_summary.json.
pub const RUN_SUMMARY_SCHEMA_VERSION: u32 = 1;

/// Schema identifier for run_summary.json.
pub const RUN_SUMMARY_SCHEMA_ID: &str = "msf-flow/run_summary@1";

/// Aggregated run status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Partial,
    Failed,
}

/// Outcome for a single plume input file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileOutcome {
    pub path: String,
    pub succeeded: bool,
    pub plumes_processed: usize,
    pub rows_skipped: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Run summary, written next to the output plume list on request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub schema_version: u32,
    pub schema_id: String,
    pub run_id: String,
    pub created_at: DateTime<Utc>,
    pub status: Status,

    pub files: Vec<FileOutcome>,
    pub plumes_processed: usize,
    pub rows_skipped: usize,
    pub duration_ms: u64,

    pub human_summary: String,
}

impl RunSummary {
    /// Aggregate per-file outcomes into a run summary.
    pub fn from_file_outcomes(run_id: String, files: Vec<FileOutcome>, duration_ms: u64) -> Self {
        let failed = files.iter().filter(|f| !f.succeeded).count();
        let status = match (failed, files.len()) {
            (0, _) => Status::Success,
            (n, total) if n == total => Status::Failed,
            _ => Status::Partial,
        };

        let plumes_processed = files.iter().map(|f| f.plumes_processed).sum();
        let rows_skipped = files.iter().map(|f| f.rows_skipped).sum();

        let human_summary = format!(
            "{} plume(s) from {} file(s), {} failed, {} row(s) skipped in {} ms",
            plumes_processed,
            files.len(),
            failed,
            rows_skipped,
            duration_ms
        );

        Self {
            schema_version: RUN_SUMMARY_SCHEMA_VERSION,
            schema_id: RUN_SUMMARY_SCHEMA_ID.to_string(),
            run_id,
            created_at: Utc::now(),
            status,
            files,
            plumes_processed,
            rows_skipped,
            duration_ms,
            human_summary,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("JSON serialization failed: {}", e),
            )
        })?;
        fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(path: &str, succeeded: bool, plumes: usize) -> FileOutcome {
        FileOutcome {
            path: path.to_string(),
            succeeded,
            plumes_processed: plumes,
            rows_skipped: 0,
            error: (!succeeded).then(|| "boom".to_string()),
        }
    }

    #[test]
    fn test_all_succeeded() {
        let summary = RunSummary::from_file_outcomes(
            "run-1".to_string(),
            vec![outcome("a.csv", true, 3), outcome("b.csv", true, 2)],
            120,
        );
        assert_eq!(summary.status, Status::Success);
        assert_eq!(summary.plumes_processed, 5);
        assert!(summary.human_summary.contains("5 plume(s)"));
    }

    #[test]
    fn test_partial_failure() {
        let summary = RunSummary::from_file_outcomes(
            "run-1".to_string(),
            vec![outcome("a.csv", true, 3), outcome("b.csv", false, 0)],
            120,
        );
        assert_eq!(summary.status, Status::Partial);
    }

    #[test]
    fn test_all_failed() {
        let summary = RunSummary::from_file_outcomes(
            "run-1".to_string(),
            vec![outcome("a.csv", false, 0)],
            120,
        );
        assert_eq!(summary.status, Status::Failed);
    }

    #[test]
    fn test_empty_run_is_success() {
        let summary = RunSummary::from_file_outcomes("run-1".to_string(), Vec::new(), 0);
        assert_eq!(summary.status, Status::Success);
        assert_eq!(summary.plumes_processed, 0);
    }

    #[test]
    fn test_json_round_trip() {
        let summary = RunSummary::from_file_outcomes(
            "run-1".to_string(),
            vec![outcome("a.csv", true, 1)],
            10,
        );
        let json = summary.to_json().unwrap();
        let parsed: RunSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.run_id, "run-1");
        assert_eq!(parsed.schema_id, RUN_SUMMARY_SCHEMA_ID);
    }
}
