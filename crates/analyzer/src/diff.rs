//! Snapshot comparison.
//!
//! Compares two finding snapshots of the same infrastructure and reports
//! which (resource, check) pairs started failing and which stopped.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use remtrack_core::{FindingRecord, Severity};

/// Identity of a finding across snapshots.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FindingKey {
    pub resource_id: String,
    pub check_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffEntry {
    pub resource_id: String,
    pub check_id: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_title: Option<String>,
}

/// Result of comparing an earlier snapshot against a later one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotDiff {
    /// Failing in the later snapshot but not in the earlier one.
    pub new_failures: Vec<DiffEntry>,
    /// Failing earlier, now passing or absent.
    pub fixed: Vec<DiffEntry>,
}

/// Compare two snapshots. Records without a resource identifier are
/// ignored; output is ordered by (resource_id, check_id).
pub fn diff(before: &[FindingRecord], after: &[FindingRecord]) -> SnapshotDiff {
    let before_failing = failing_index(before);
    let after_failing = failing_index(after);

    let before_keys: BTreeSet<&FindingKey> = before_failing.keys().collect();
    let after_keys: BTreeSet<&FindingKey> = after_failing.keys().collect();

    let new_failures = after_keys
        .difference(&before_keys)
        .map(|k| entry_for(k, &after_failing))
        .collect();
    let fixed = before_keys
        .difference(&after_keys)
        .map(|k| entry_for(k, &before_failing))
        .collect();

    SnapshotDiff {
        new_failures,
        fixed,
    }
}

fn failing_index(findings: &[FindingRecord]) -> BTreeMap<FindingKey, &FindingRecord> {
    let mut index = BTreeMap::new();
    for f in findings {
        if f.resource_id.trim().is_empty() || !f.status.is_fail() {
            continue;
        }
        index
            .entry(FindingKey {
                resource_id: f.resource_id.clone(),
                check_id: f.check_id.clone(),
            })
            .or_insert(f);
    }
    index
}

fn entry_for(key: &FindingKey, index: &BTreeMap<FindingKey, &FindingRecord>) -> DiffEntry {
    let record = index[key];
    DiffEntry {
        resource_id: key.resource_id.clone(),
        check_id: key.check_id.clone(),
        severity: record.severity,
        check_title: record.check_title.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use remtrack_core::CheckStatus;

    fn finding(resource: &str, check: &str, status: &str) -> FindingRecord {
        FindingRecord::new(
            resource,
            check,
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            CheckStatus::parse(status),
            Severity::Medium,
        )
    }

    #[test]
    fn test_new_and_fixed_findings() {
        let before = vec![
            finding("r1", "c1", "FAIL"),
            finding("r2", "c1", "FAIL"),
            finding("r3", "c1", "PASS"),
        ];
        let after = vec![
            finding("r1", "c1", "FAIL"),  // still failing
            finding("r2", "c1", "PASS"),  // fixed
            finding("r3", "c1", "FAIL"),  // new failure
            // r4 appears for the first time, failing
            finding("r4", "c2", "FAIL"),
        ];

        let d = diff(&before, &after);
        let new_ids: Vec<_> = d.new_failures.iter().map(|e| e.resource_id.as_str()).collect();
        let fixed_ids: Vec<_> = d.fixed.iter().map(|e| e.resource_id.as_str()).collect();
        assert_eq!(new_ids, vec!["r3", "r4"]);
        assert_eq!(fixed_ids, vec!["r2"]);
    }

    #[test]
    fn test_absent_in_after_counts_as_fixed() {
        let before = vec![finding("r1", "c1", "FAIL")];
        let after: Vec<FindingRecord> = Vec::new();
        let d = diff(&before, &after);
        assert!(d.new_failures.is_empty());
        assert_eq!(d.fixed.len(), 1);
    }

    #[test]
    fn test_swap_symmetry() {
        let a = vec![finding("r1", "c1", "FAIL")];
        let b = vec![finding("r2", "c2", "FAIL")];
        let forward = diff(&a, &b);
        let backward = diff(&b, &a);
        assert_eq!(forward.new_failures.len(), backward.fixed.len());
        assert_eq!(forward.fixed.len(), backward.new_failures.len());
    }

    #[test]
    fn test_identical_snapshots_empty_diff() {
        let snap = vec![finding("r1", "c1", "FAIL"), finding("r2", "c2", "PASS")];
        let d = diff(&snap, &snap);
        assert!(d.new_failures.is_empty());
        assert!(d.fixed.is_empty());
    }
}
