pub mod finding;
pub mod remediation;
pub mod severity;

pub use finding::{CheckStatus, FindingRecord};
pub use remediation::{RemediationRecord, StatusChange};
pub use severity::Severity;
