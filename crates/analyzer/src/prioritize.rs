//! Remediation prioritization.
//!
//! Scores currently-failing remediation records by severity and age and
//! orders them into a remediation plan. Severity dominates (max 50) while
//! age contributes at most 10, saturating at the policy's age cap so
//! ancient findings do not grow without bound.

use serde::{Deserialize, Serialize};

use remtrack_core::{RemediationRecord, Severity};

/// Tier thresholds and the age saturation cap.
///
/// These are policy constants, not data-derived values; the defaults are
/// illustrative and deployments are expected to tune them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorityPolicy {
    pub age_cap_days: i64,
    pub critical_threshold: f64,
    pub high_threshold: f64,
    pub medium_threshold: f64,
}

impl Default for PriorityPolicy {
    fn default() -> Self {
        Self {
            age_cap_days: 100,
            critical_threshold: 45.0,
            high_threshold: 35.0,
            medium_threshold: 25.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PriorityTier {
    Critical,
    High,
    Medium,
    Low,
}

impl PriorityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityTier::Critical => "Critical",
            PriorityTier::High => "High",
            PriorityTier::Medium => "Medium",
            PriorityTier::Low => "Low",
        }
    }
}

impl std::fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed severity score table; unrecognized severities score 1.
pub fn severity_score(severity: Severity) -> u32 {
    match severity {
        Severity::Critical => 5,
        Severity::High => 4,
        Severity::Medium => 3,
        Severity::Low => 2,
        Severity::Informational | Severity::Unknown => 1,
    }
}

/// One line of the prioritized remediation plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanEntry {
    #[serde(flatten)]
    pub record: RemediationRecord,
    pub age_days: i64,
    pub severity_score: u32,
    pub priority_score: f64,
    pub priority: PriorityTier,
}

/// Build the prioritized plan from reconstructed remediation records.
///
/// Only records whose current status is FAIL are included. Output is a
/// strict descending sort on `priority_score`; equal scores keep their
/// input order. No failing records yields an empty plan, not an error.
pub fn prioritize(records: &[RemediationRecord], policy: &PriorityPolicy) -> Vec<PlanEntry> {
    let mut plan: Vec<PlanEntry> = records
        .iter()
        .filter(|r| r.current_status.is_fail())
        .map(|r| {
            let age_days = r.age_days();
            let sev = severity_score(r.severity);
            let score =
                f64::from(sev) * 10.0 + (age_days.min(policy.age_cap_days) as f64) / 10.0;
            PlanEntry {
                record: r.clone(),
                age_days,
                severity_score: sev,
                priority_score: score,
                priority: tier_for(score, policy),
            }
        })
        .collect();

    // Stable: ties keep relative input order.
    plan.sort_by(|a, b| {
        b.priority_score
            .partial_cmp(&a.priority_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    plan
}

fn tier_for(score: f64, policy: &PriorityPolicy) -> PriorityTier {
    if score >= policy.critical_threshold {
        PriorityTier::Critical
    } else if score >= policy.high_threshold {
        PriorityTier::High
    } else if score >= policy.medium_threshold {
        PriorityTier::Medium
    } else {
        PriorityTier::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use remtrack_core::CheckStatus;

    fn record(resource: &str, severity: Severity, age_days: i64, status: &str) -> RemediationRecord {
        let first = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        RemediationRecord {
            resource_id: resource.to_string(),
            check_id: "check".to_string(),
            severity,
            first_detected: first,
            last_checked: first + Duration::days(age_days),
            current_status: CheckStatus::parse(status),
            was_remediated: false,
            remediation_date: None,
            days_to_remediate: None,
            days_in_current_state: 0,
            status_history: Vec::new(),
            check_title: None,
            resource_type: None,
            resource_name: None,
            region: None,
            account_id: None,
            remediation_text: None,
        }
    }

    #[test]
    fn test_critical_old_finding_scores_60() {
        let records = vec![record("r1", Severity::Critical, 120, "FAIL")];
        let plan = prioritize(&records, &PriorityPolicy::default());
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].priority_score, 60.0);
        assert_eq!(plan[0].priority, PriorityTier::Critical);
    }

    #[test]
    fn test_severity_dominates_age() {
        let records = vec![
            record("old-low", Severity::Low, 300, "FAIL"),
            record("new-critical", Severity::Critical, 0, "FAIL"),
        ];
        let plan = prioritize(&records, &PriorityPolicy::default());
        assert_eq!(plan[0].record.resource_id, "new-critical");
        assert_eq!(plan[0].priority_score, 50.0);
        assert_eq!(plan[1].priority_score, 30.0);
    }

    #[test]
    fn test_passing_records_excluded() {
        let records = vec![
            record("r1", Severity::Critical, 10, "PASS"),
            record("r2", Severity::Low, 10, "MANUAL"),
        ];
        assert!(prioritize(&records, &PriorityPolicy::default()).is_empty());
    }

    #[test]
    fn test_ties_preserve_input_order() {
        let records = vec![
            record("a", Severity::High, 50, "FAIL"),
            record("b", Severity::High, 50, "FAIL"),
            record("c", Severity::High, 50, "FAIL"),
        ];
        let plan = prioritize(&records, &PriorityPolicy::default());
        let ids: Vec<_> = plan.iter().map(|e| e.record.resource_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_tier_boundaries() {
        let policy = PriorityPolicy::default();
        // HIGH severity (40) + 50 days (5) = 45 -> Critical boundary.
        let plan = prioritize(&[record("r", Severity::High, 50, "FAIL")], &policy);
        assert_eq!(plan[0].priority, PriorityTier::Critical);
        // MEDIUM severity (30) + 0 days = 30 -> Medium.
        let plan = prioritize(&[record("r", Severity::Medium, 0, "FAIL")], &policy);
        assert_eq!(plan[0].priority, PriorityTier::Medium);
        // LOW severity (20) + 0 days = 20 -> Low.
        let plan = prioritize(&[record("r", Severity::Low, 0, "FAIL")], &policy);
        assert_eq!(plan[0].priority, PriorityTier::Low);
    }
}
