use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::finding::CheckStatus;
use crate::severity::Severity;

/// One entry in a remediation record's status history: the first time a
/// distinct status value was observed (consecutive repeats collapsed).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusChange {
    pub status: CheckStatus,
    pub at: DateTime<Utc>,
}

/// Derived lifecycle record for one (resource, check) pair.
///
/// Built once per analysis run from the full finding set and never mutated
/// afterwards. There is no cross-run identity: callers wanting trends must
/// feed cumulative history into each run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemediationRecord {
    pub resource_id: String,
    pub check_id: String,
    pub severity: Severity,

    pub first_detected: DateTime<Utc>,
    pub last_checked: DateTime<Utc>,
    pub current_status: CheckStatus,

    /// True if any adjacent pair in timestamp order transitions FAIL -> PASS.
    /// The first such transition wins; later regressions do not clear it.
    pub was_remediated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation_date: Option<DateTime<Utc>>,
    /// Whole days from `first_detected` to the first FAIL -> PASS transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_to_remediate: Option<i64>,
    /// Whole days since the most recent status change; 0 if it never changed.
    pub days_in_current_state: i64,

    pub status_history: Vec<StatusChange>,

    // Copied from the earliest observation in the group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation_text: Option<String>,
}

impl RemediationRecord {
    /// Age of the finding in whole days, never negative.
    pub fn age_days(&self) -> i64 {
        self.last_checked
            .signed_duration_since(self.first_detected)
            .num_days()
            .max(0)
    }
}
