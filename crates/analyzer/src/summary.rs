//! Scan-level summary statistics.
//!
//! Aggregate views over a finding set: status and severity distributions,
//! top failing checks, and per-account metrics computed against each
//! account's most recent scan.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use remtrack_core::{FindingRecord, Severity};

const TOP_CHECKS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckCount {
    pub check_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_title: Option<String>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSummary {
    pub total_findings: usize,
    pub status_counts: BTreeMap<String, usize>,
    pub severity_counts: BTreeMap<String, usize>,
    pub unique_accounts: usize,
    pub unique_regions: usize,
    pub unique_services: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_scan: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_scan: Option<DateTime<Utc>>,
    pub top_failing_checks: Vec<CheckCount>,
}

/// Latest-scan posture for one account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountMetrics {
    pub account_id: String,
    pub total_findings: usize,
    pub fail_count: usize,
    pub pass_count: usize,
    pub pass_percentage: f64,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub informational: usize,
}

/// Summarize a flat finding set.
pub fn summarize(findings: &[FindingRecord]) -> ScanSummary {
    let mut status_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut severity_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut accounts = BTreeSet::new();
    let mut regions = BTreeSet::new();
    let mut services = BTreeSet::new();
    let mut failing: HashMap<&str, CheckCount> = HashMap::new();
    let mut first_scan = None;
    let mut last_scan = None;

    for f in findings {
        *status_counts.entry(f.status.as_str().to_string()).or_default() += 1;
        *severity_counts
            .entry(f.severity.as_str().to_string())
            .or_default() += 1;
        if let Some(a) = &f.account_id {
            accounts.insert(a.as_str());
        }
        if let Some(r) = &f.region {
            regions.insert(r.as_str());
        }
        if let Some(s) = &f.service {
            services.insert(s.as_str());
        }
        if let Some(ts) = f.timestamp {
            first_scan = Some(first_scan.map_or(ts, |t: DateTime<Utc>| t.min(ts)));
            last_scan = Some(last_scan.map_or(ts, |t: DateTime<Utc>| t.max(ts)));
        }
        if f.status.is_fail() {
            let entry = failing.entry(f.check_id.as_str()).or_insert_with(|| CheckCount {
                check_id: f.check_id.clone(),
                check_title: f.check_title.clone(),
                count: 0,
            });
            entry.count += 1;
            if entry.check_title.is_none() {
                entry.check_title = f.check_title.clone();
            }
        }
    }

    let mut top_failing_checks: Vec<CheckCount> = failing.into_values().collect();
    // Count desc, check id asc so output is deterministic.
    top_failing_checks.sort_by(|a, b| b.count.cmp(&a.count).then(a.check_id.cmp(&b.check_id)));
    top_failing_checks.truncate(TOP_CHECKS);

    ScanSummary {
        total_findings: findings.len(),
        status_counts,
        severity_counts,
        unique_accounts: accounts.len(),
        unique_regions: regions.len(),
        unique_services: services.len(),
        first_scan,
        last_scan,
        top_failing_checks,
    }
}

/// Per-account metrics over each account's most recent scan timestamp.
/// Findings without an account identifier are skipped.
pub fn account_metrics(findings: &[FindingRecord]) -> Vec<AccountMetrics> {
    let mut by_account: BTreeMap<&str, Vec<&FindingRecord>> = BTreeMap::new();
    for f in findings {
        match &f.account_id {
            Some(a) if !a.trim().is_empty() => by_account.entry(a.as_str()).or_default().push(f),
            _ => {}
        }
    }

    let mut out = Vec::with_capacity(by_account.len());
    for (account_id, group) in by_account {
        let latest = group.iter().filter_map(|f| f.timestamp).max();
        let current: Vec<&&FindingRecord> = group
            .iter()
            .filter(|f| f.timestamp == latest)
            .collect();

        let total = current.len();
        let fail_count = current.iter().filter(|f| f.status.is_fail()).count();
        let pass_count = current.iter().filter(|f| f.status.is_pass()).count();
        let count_sev =
            |sev: Severity| current.iter().filter(|f| f.severity == sev).count();

        out.push(AccountMetrics {
            account_id: account_id.to_string(),
            total_findings: total,
            fail_count,
            pass_count,
            pass_percentage: if total > 0 {
                pass_count as f64 / total as f64 * 100.0
            } else {
                0.0
            },
            critical: count_sev(Severity::Critical),
            high: count_sev(Severity::High),
            medium: count_sev(Severity::Medium),
            low: count_sev(Severity::Low),
            informational: count_sev(Severity::Informational),
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use remtrack_core::CheckStatus;

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, day, 0, 0, 0).unwrap()
    }

    fn finding(check: &str, status: &str, severity: Severity, account: &str, day: u32) -> FindingRecord {
        let mut f = FindingRecord::new(
            "r",
            check,
            ts(day),
            CheckStatus::parse(status),
            severity,
        );
        f.account_id = Some(account.to_string());
        f
    }

    #[test]
    fn test_counts_match_brute_force() {
        let findings = vec![
            finding("c1", "FAIL", Severity::High, "111", 1),
            finding("c1", "FAIL", Severity::High, "111", 2),
            finding("c2", "PASS", Severity::Low, "222", 1),
        ];
        let s = summarize(&findings);
        assert_eq!(s.total_findings, 3);
        assert_eq!(s.status_counts["FAIL"], 2);
        assert_eq!(s.status_counts["PASS"], 1);
        assert_eq!(s.severity_counts["high"], 2);
        assert_eq!(s.unique_accounts, 2);
        assert_eq!(s.first_scan, Some(ts(1)));
        assert_eq!(s.last_scan, Some(ts(2)));
        assert_eq!(s.top_failing_checks.len(), 1);
        assert_eq!(s.top_failing_checks[0].check_id, "c1");
        assert_eq!(s.top_failing_checks[0].count, 2);
    }

    #[test]
    fn test_account_metrics_use_latest_scan_only() {
        let findings = vec![
            // Older scan: everything failing.
            finding("c1", "FAIL", Severity::Critical, "111", 1),
            finding("c2", "FAIL", Severity::High, "111", 1),
            // Latest scan: one fixed.
            finding("c1", "PASS", Severity::Critical, "111", 5),
            finding("c2", "FAIL", Severity::High, "111", 5),
        ];
        let metrics = account_metrics(&findings);
        assert_eq!(metrics.len(), 1);
        let m = &metrics[0];
        assert_eq!(m.total_findings, 2);
        assert_eq!(m.pass_count, 1);
        assert_eq!(m.fail_count, 1);
        assert!((m.pass_percentage - 50.0).abs() < 1e-12);
        assert_eq!(m.critical, 1);
        assert_eq!(m.high, 1);
    }

    #[test]
    fn test_empty_input() {
        let s = summarize(&[]);
        assert_eq!(s.total_findings, 0);
        assert!(s.first_scan.is_none());
        assert!(account_metrics(&[]).is_empty());
    }
}
