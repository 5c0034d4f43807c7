//! Output writers.
//!
//! CSV reports for the tracking table and the prioritized plan, plus JSON
//! reports for the risk model and scan summary. CSV column layout follows
//! the upper-case Prowler convention so downstream spreadsheets keep
//! working.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use remtrack_core::RemediationRecord;

use crate::error::AnalyzerError;
use crate::prioritize::PlanEntry;
use crate::risk::{ConfidenceInterval, RiskEstimate, RiskModelInputs};
use crate::summary::{AccountMetrics, ScanSummary};

const DATE_FMT: &str = "%Y-%m-%d";

fn fmt_date(ts: &DateTime<Utc>) -> String {
    ts.format(DATE_FMT).to_string()
}

fn fmt_opt_date(ts: &Option<DateTime<Utc>>) -> String {
    ts.as_ref().map(fmt_date).unwrap_or_default()
}

/// Render a status history as a single readable cell, e.g.
/// `FAIL (2024-01-01) -> PASS (2024-02-01)`.
pub fn render_history(record: &RemediationRecord) -> String {
    record
        .status_history
        .iter()
        .map(|c| format!("{} ({})", c.status.as_str(), fmt_date(&c.at)))
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Write the full remediation tracking table as CSV.
pub fn write_tracking_csv(
    records: &[RemediationRecord],
    path: &Path,
) -> Result<(), AnalyzerError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "RESOURCE_UID",
        "CHECK_ID",
        "SEVERITY",
        "CHECK_TITLE",
        "FIRST_DETECTED",
        "LAST_CHECKED",
        "CURRENT_STATUS",
        "WAS_REMEDIATED",
        "REMEDIATION_DATE",
        "DAYS_TO_REMEDIATE",
        "DAYS_IN_CURRENT_STATE",
        "STATUS_HISTORY",
        "RESOURCE_TYPE",
        "RESOURCE_NAME",
        "REGION",
        "ACCOUNT_UID",
        "REMEDIATION_TEXT",
    ])?;
    for r in records {
        writer.write_record([
            r.resource_id.as_str(),
            r.check_id.as_str(),
            r.severity.as_str(),
            r.check_title.as_deref().unwrap_or(""),
            &fmt_date(&r.first_detected),
            &fmt_date(&r.last_checked),
            r.current_status.as_str(),
            if r.was_remediated { "true" } else { "false" },
            &fmt_opt_date(&r.remediation_date),
            &r.days_to_remediate.map(|d| d.to_string()).unwrap_or_default(),
            &r.days_in_current_state.to_string(),
            &render_history(r),
            r.resource_type.as_deref().unwrap_or(""),
            r.resource_name.as_deref().unwrap_or(""),
            r.region.as_deref().unwrap_or(""),
            r.account_id.as_deref().unwrap_or(""),
            r.remediation_text.as_deref().unwrap_or(""),
        ])?;
    }
    writer.flush()?;
    info!(file = %path.display(), rows = records.len(), "wrote tracking report");
    Ok(())
}

/// Write the prioritized remediation plan as CSV, highest priority first.
pub fn write_plan_csv(plan: &[PlanEntry], path: &Path) -> Result<(), AnalyzerError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "PRIORITY",
        "PRIORITY_SCORE",
        "SEVERITY",
        "AGE_DAYS",
        "CHECK_ID",
        "CHECK_TITLE",
        "RESOURCE_NAME",
        "RESOURCE_TYPE",
        "REGION",
        "ACCOUNT_UID",
        "FIRST_DETECTED",
        "RESOURCE_UID",
        "REMEDIATION_TEXT",
    ])?;
    for e in plan {
        let r = &e.record;
        writer.write_record([
            e.priority.as_str(),
            &format!("{:.1}", e.priority_score),
            r.severity.as_str(),
            &e.age_days.to_string(),
            r.check_id.as_str(),
            r.check_title.as_deref().unwrap_or(""),
            r.resource_name.as_deref().unwrap_or(""),
            r.resource_type.as_deref().unwrap_or(""),
            r.region.as_deref().unwrap_or(""),
            r.account_id.as_deref().unwrap_or(""),
            &fmt_date(&r.first_detected),
            r.resource_id.as_str(),
            r.remediation_text.as_deref().unwrap_or(""),
        ])?;
    }
    writer.flush()?;
    info!(file = %path.display(), rows = plan.len(), "wrote remediation plan");
    Ok(())
}

/// Complete output of one risk analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskReport {
    pub generated_at: DateTime<Utc>,
    pub model_inputs: RiskModelInputs,
    pub confidence_intervals: BTreeMap<String, Vec<ConfidenceInterval>>,
    pub estimate: RiskEstimate,
}

/// Output of one summary run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryReport {
    pub generated_at: DateTime<Utc>,
    pub summary: ScanSummary,
    pub accounts: Vec<AccountMetrics>,
}

pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<(), AnalyzerError> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), value)?;
    info!(file = %path.display(), "wrote JSON report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use remtrack_core::{CheckStatus, Severity, StatusChange};

    fn sample_record() -> RemediationRecord {
        let first = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        RemediationRecord {
            resource_id: "arn:bucket".to_string(),
            check_id: "s3_public".to_string(),
            severity: Severity::High,
            first_detected: first,
            last_checked: later,
            current_status: CheckStatus::Pass,
            was_remediated: true,
            remediation_date: Some(later),
            days_to_remediate: Some(31),
            days_in_current_state: 0,
            status_history: vec![
                StatusChange {
                    status: CheckStatus::Fail,
                    at: first,
                },
                StatusChange {
                    status: CheckStatus::Pass,
                    at: later,
                },
            ],
            check_title: Some("Bucket is public".to_string()),
            resource_type: None,
            resource_name: None,
            region: Some("us-east-1".to_string()),
            account_id: Some("111122223333".to_string()),
            remediation_text: None,
        }
    }

    #[test]
    fn test_render_history() {
        let record = sample_record();
        assert_eq!(
            render_history(&record),
            "FAIL (2024-01-01) -> PASS (2024-02-01)"
        );
    }

    #[test]
    fn test_tracking_csv_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracking.csv");
        write_tracking_csv(&[sample_record()], &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "RESOURCE_UID");
        let rows: Vec<_> = reader.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "arn:bucket");
        assert_eq!(&rows[0][6], "PASS");
        assert_eq!(&rows[0][7], "true");
        assert_eq!(&rows[0][9], "31");
    }
}
