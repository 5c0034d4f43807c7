use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::severity::Severity;

/// Check outcome. Only PASS and FAIL participate in transition logic;
/// every other value (MANUAL, INFO, WARNING, ...) is carried through
/// verbatim as `Other`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum CheckStatus {
    Pass,
    Fail,
    Other(String),
}

impl CheckStatus {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "PASS" => CheckStatus::Pass,
            "FAIL" => CheckStatus::Fail,
            other => CheckStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CheckStatus::Pass => "PASS",
            CheckStatus::Fail => "FAIL",
            CheckStatus::Other(s) => s,
        }
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, CheckStatus::Fail)
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, CheckStatus::Pass)
    }
}

impl From<String> for CheckStatus {
    fn from(s: String) -> Self {
        CheckStatus::parse(&s)
    }
}

impl From<CheckStatus> for String {
    fn from(s: CheckStatus) -> Self {
        s.as_str().to_string()
    }
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observation of one check against one resource at one point in time.
///
/// `timestamp` is optional because scan exports occasionally carry rows
/// with an unparseable time column; those rows are excluded from history
/// reconstruction instead of failing the whole batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindingRecord {
    pub resource_id: String,
    pub check_id: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub status: CheckStatus,
    pub severity: Severity,

    // Display-only metadata, carried through unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
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

impl FindingRecord {
    /// Minimal record for construction in tests and fixtures.
    pub fn new(
        resource_id: impl Into<String>,
        check_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        status: CheckStatus,
        severity: Severity,
    ) -> Self {
        Self {
            resource_id: resource_id.into(),
            check_id: check_id.into(),
            timestamp: Some(timestamp),
            status,
            severity,
            check_title: None,
            service: None,
            resource_type: None,
            resource_name: None,
            region: None,
            account_id: None,
            remediation_text: None,
        }
    }
}
