//! Finding-lifecycle analysis over cloud security scans.
//!
//! Pipelines: ingest Prowler exports, reconstruct per-resource remediation
//! history, prioritize open failures, and derive a quantitative risk
//! estimate with confidence intervals.

pub mod diff;
pub mod error;
pub mod history;
pub mod ingest;
pub mod prioritize;
pub mod report;
pub mod risk;
pub mod summary;

pub use error::AnalyzerError;
pub use history::reconstruct;
pub use prioritize::{prioritize, PlanEntry, PriorityPolicy, PriorityTier};
pub use summary::{account_metrics, summarize};
