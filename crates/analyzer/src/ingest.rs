//! Input adapters.
//!
//! Loads finding records from Prowler CSV exports (semicolon-delimited,
//! upper-case headers) or JSON arrays. Rows that cannot be interpreted are
//! skipped with a warning; ingestion never fails the batch over one bad
//! row. Ingestion order is preserved so downstream stable sorts can use it
//! as a tie-break.

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use remtrack_core::{CheckStatus, FindingRecord, Severity};

use crate::error::AnalyzerError;

/// Raw Prowler CSV row. Every column is optional; conversion decides what
/// is required.
#[derive(Debug, Deserialize)]
struct ProwlerRow {
    #[serde(rename = "RESOURCE_UID", default)]
    resource_uid: Option<String>,
    #[serde(rename = "CHECK_ID", default)]
    check_id: Option<String>,
    #[serde(rename = "TIMESTAMP", default)]
    timestamp: Option<String>,
    #[serde(rename = "STATUS", default)]
    status: Option<String>,
    #[serde(rename = "SEVERITY", default)]
    severity: Option<String>,
    #[serde(rename = "CHECK_TITLE", default)]
    check_title: Option<String>,
    #[serde(rename = "SERVICE_NAME", default)]
    service_name: Option<String>,
    #[serde(rename = "RESOURCE_TYPE", default)]
    resource_type: Option<String>,
    #[serde(rename = "RESOURCE_NAME", default)]
    resource_name: Option<String>,
    #[serde(rename = "REGION", default)]
    region: Option<String>,
    #[serde(rename = "ACCOUNT_UID", default)]
    account_uid: Option<String>,
    #[serde(rename = "REMEDIATION_RECOMMENDATION_TEXT", default)]
    remediation_text: Option<String>,
}

impl ProwlerRow {
    fn into_record(self) -> FindingRecord {
        FindingRecord {
            resource_id: self.resource_uid.unwrap_or_default(),
            check_id: self.check_id.unwrap_or_default(),
            timestamp: self.timestamp.as_deref().and_then(parse_timestamp),
            status: CheckStatus::parse(self.status.as_deref().unwrap_or("")),
            severity: Severity::parse(self.severity.as_deref().unwrap_or("")),
            check_title: non_empty(self.check_title),
            service: non_empty(self.service_name),
            resource_type: non_empty(self.resource_type),
            resource_name: non_empty(self.resource_name),
            region: non_empty(self.region),
            account_id: non_empty(self.account_uid),
            remediation_text: non_empty(self.remediation_text),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Lenient timestamp parsing: RFC 3339 first, then the date-time and
/// date-only layouts Prowler exports have used over time.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}

/// Load one Prowler CSV export.
pub fn load_prowler_csv(path: &Path) -> Result<Vec<FindingRecord>, AnalyzerError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_path(path)?;

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for row in reader.deserialize::<ProwlerRow>() {
        match row {
            Ok(row) => records.push(row.into_record()),
            Err(e) => {
                skipped += 1;
                warn!(file = %path.display(), error = %e, "skipping malformed CSV row");
            }
        }
    }
    if skipped > 0 {
        warn!(file = %path.display(), skipped, "some rows could not be parsed");
    }
    info!(file = %path.display(), count = records.len(), "loaded findings");
    Ok(records)
}

/// Load a JSON array of finding records (the crate's own serialization).
pub fn load_json(path: &Path) -> Result<Vec<FindingRecord>, AnalyzerError> {
    let file = std::fs::File::open(path)?;
    let records: Vec<FindingRecord> = serde_json::from_reader(std::io::BufReader::new(file))?;
    info!(file = %path.display(), count = records.len(), "loaded findings");
    Ok(records)
}

/// Load findings from a single file (by extension) or every CSV file in a
/// directory, in lexicographic filename order.
pub fn load_input(path: &Path) -> Result<Vec<FindingRecord>, AnalyzerError> {
    if path.is_dir() {
        let mut files: Vec<_> = std::fs::read_dir(path)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("csv")))
            .collect();
        if files.is_empty() {
            return Err(AnalyzerError::NoInput(path.display().to_string()));
        }
        files.sort();

        let mut all = Vec::new();
        for file in files {
            all.extend(load_prowler_csv(&file)?);
        }
        return Ok(all);
    }

    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => load_prowler_csv(path),
        Some(ext) if ext.eq_ignore_ascii_case("json") => load_json(path),
        _ => Err(AnalyzerError::UnsupportedFormat(path.display().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2024-03-01T10:30:45Z").is_some());
        assert!(parse_timestamp("2024-03-01 10:30:45").is_some());
        assert!(parse_timestamp("2024-03-01 10:30:45.123456").is_some());
        assert!(parse_timestamp("2024-03-01").is_some());
        assert!(parse_timestamp("not a date").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn test_load_prowler_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            "TIMESTAMP;CHECK_ID;CHECK_TITLE;SERVICE_NAME;STATUS;SEVERITY;RESOURCE_UID;REGION;ACCOUNT_UID"
        )
        .unwrap();
        writeln!(
            f,
            "2024-03-01 10:00:00;iam_root_mfa;Root MFA enabled;iam;FAIL;CRITICAL;arn:root;us-east-1;111122223333"
        )
        .unwrap();
        writeln!(
            f,
            "bad-timestamp;iam_root_mfa;Root MFA enabled;iam;PASS;critical;arn:root;us-east-1;111122223333"
        )
        .unwrap();

        let records = load_prowler_csv(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].resource_id, "arn:root");
        assert_eq!(records[0].status, CheckStatus::Fail);
        assert_eq!(records[0].severity, Severity::Critical);
        assert!(records[0].timestamp.is_some());
        // Unparseable timestamp becomes None, row is still carried.
        assert!(records[1].timestamp.is_none());
        assert_eq!(records[1].severity, Severity::Critical);
    }

    #[test]
    fn test_load_input_directory_orders_files() {
        let dir = tempfile::tempdir().unwrap();
        for (name, ts) in [("b.csv", "2024-03-02 00:00:00"), ("a.csv", "2024-03-01 00:00:00")] {
            let mut f = std::fs::File::create(dir.path().join(name)).unwrap();
            writeln!(f, "TIMESTAMP;CHECK_ID;STATUS;SEVERITY;RESOURCE_UID").unwrap();
            writeln!(f, "{ts};c1;FAIL;high;r1").unwrap();
        }
        let records = load_input(dir.path()).unwrap();
        assert_eq!(records.len(), 2);
        // a.csv loads before b.csv.
        assert!(records[0].timestamp < records[1].timestamp);
    }

    #[test]
    fn test_empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_input(dir.path()),
            Err(AnalyzerError::NoInput(_))
        ));
    }
}
