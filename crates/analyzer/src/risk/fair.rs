//! Per-category risk aggregation.
//!
//! Each control category carries fixed base factors (threat capability,
//! control strength, asset value, exposure). A category's annualized risk
//! is vulnerability x threat event frequency x loss magnitude; the overall
//! score is the sum across categories present in the input.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use remtrack_core::{FindingRecord, Severity};

/// Control categories the aggregate model reasons about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ControlCategory {
    Iam,
    Logging,
    Networking,
    Monitoring,
}

impl ControlCategory {
    pub fn all() -> [ControlCategory; 4] {
        [
            ControlCategory::Iam,
            ControlCategory::Logging,
            ControlCategory::Networking,
            ControlCategory::Monitoring,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ControlCategory::Iam => "IAM",
            ControlCategory::Logging => "LOGGING",
            ControlCategory::Networking => "NETWORKING",
            ControlCategory::Monitoring => "MONITORING",
        }
    }

    /// Fixed base factors per category. Exposure is 8760 hours for all four:
    /// cloud control planes are reachable around the clock.
    pub fn base_factors(&self) -> CategoryFactors {
        match self {
            ControlCategory::Iam => CategoryFactors {
                threat_capability: 0.7,
                control_strength: 0.8,
                asset_value: 1_000_000.0,
                exposure_hours: 8760.0,
            },
            ControlCategory::Logging => CategoryFactors {
                threat_capability: 0.5,
                control_strength: 0.6,
                asset_value: 500_000.0,
                exposure_hours: 8760.0,
            },
            ControlCategory::Networking => CategoryFactors {
                threat_capability: 0.8,
                control_strength: 0.7,
                asset_value: 750_000.0,
                exposure_hours: 8760.0,
            },
            ControlCategory::Monitoring => CategoryFactors {
                threat_capability: 0.4,
                control_strength: 0.5,
                asset_value: 250_000.0,
                exposure_hours: 8760.0,
            },
        }
    }

    /// Assign a finding to a category by keyword on its service, check
    /// identifier, and title. Monitoring keys are matched before logging
    /// because CloudWatch metric-filter checks mention both.
    pub fn from_finding(finding: &FindingRecord) -> Option<ControlCategory> {
        let mut hay = String::new();
        if let Some(s) = &finding.service {
            hay.push_str(s);
            hay.push(' ');
        }
        hay.push_str(&finding.check_id);
        if let Some(t) = &finding.check_title {
            hay.push(' ');
            hay.push_str(t);
        }
        let hay = hay.to_ascii_lowercase();

        if hay.contains("cloudwatch") || hay.contains("monitor") {
            Some(ControlCategory::Monitoring)
        } else if hay.contains("cloudtrail") || hay.contains("log") {
            Some(ControlCategory::Logging)
        } else if hay.contains("iam") || hay.contains("account") || hay.contains("access") {
            Some(ControlCategory::Iam)
        } else if hay.contains("vpc")
            || hay.contains("ec2")
            || hay.contains("network")
            || hay.contains("security_group")
            || hay.contains("securitygroup")
        {
            Some(ControlCategory::Networking)
        } else {
            None
        }
    }
}

impl std::fmt::Display for ControlCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CategoryFactors {
    /// Attacker sophistication needed against this category, 0..1.
    pub threat_capability: f64,
    /// Effectiveness of properly configured controls, 0..1.
    pub control_strength: f64,
    /// Dollar value of the assets behind the category.
    pub asset_value: f64,
    /// Hours per year the category is exposed.
    pub exposure_hours: f64,
}

/// Severity weight used in the vulnerability fold; unrecognized severities
/// weigh 0.5 so a noisy scanner cannot zero out the estimate.
pub fn severity_weight(severity: Severity) -> f64 {
    match severity {
        Severity::Critical => 1.0,
        Severity::High => 0.7,
        Severity::Medium => 0.4,
        Severity::Low => 0.1,
        Severity::Informational | Severity::Unknown => 0.5,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskBand {
    High,
    Medium,
    Low,
}

impl RiskBand {
    pub fn from_score(score: f64) -> Self {
        if score > 1_000_000.0 {
            RiskBand::High
        } else if score > 100_000.0 {
            RiskBand::Medium
        } else {
            RiskBand::Low
        }
    }
}

/// Assessment of one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryAssessment {
    pub threat_event_frequency: f64,
    pub vulnerability: f64,
    pub loss_magnitude: f64,
    pub risk_score: f64,
    pub band: RiskBand,
    pub finding_count: usize,
}

/// Aggregate risk estimate across all categories present in the input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskEstimate {
    pub categories: BTreeMap<ControlCategory, CategoryAssessment>,
    pub overall_risk_score: f64,
}

/// Assess one category's findings against its base factors.
///
/// Zero findings yields zero vulnerability and zero risk, never a division
/// error.
pub fn assess_category(findings: &[&FindingRecord], factors: &CategoryFactors) -> CategoryAssessment {
    let mut total_weight = 0.0;
    let mut weighted_vuln = 0.0;
    let mut severity_counts = [0usize; 4]; // critical, high, medium, low
    for f in findings {
        let w = severity_weight(f.severity);
        total_weight += w;
        weighted_vuln += (1.0 - factors.control_strength) * w;
        match f.severity {
            Severity::Critical => severity_counts[0] += 1,
            Severity::High => severity_counts[1] += 1,
            Severity::Medium => severity_counts[2] += 1,
            Severity::Low => severity_counts[3] += 1,
            _ => {}
        }
    }

    let vulnerability = if total_weight > 0.0 {
        weighted_vuln / total_weight
    } else {
        0.0
    };

    let threat_event_frequency =
        factors.exposure_hours / 24.0 * 365.0 * factors.threat_capability * vulnerability;

    let loss_factors = [1.0, 0.7, 0.4, 0.1];
    let counted: usize = severity_counts.iter().sum();
    let total_loss_factor: f64 = severity_counts
        .iter()
        .zip(loss_factors.iter())
        .map(|(&count, &factor)| count as f64 * factor)
        .sum();
    let loss_magnitude = factors.asset_value * (total_loss_factor / counted.max(1) as f64);

    let risk_score = threat_event_frequency * loss_magnitude;

    CategoryAssessment {
        threat_event_frequency,
        vulnerability,
        loss_magnitude,
        risk_score,
        band: RiskBand::from_score(risk_score),
        finding_count: findings.len(),
    }
}

/// Group findings by category and assess each; categories with no findings
/// are omitted from the result.
pub fn assess(findings: &[FindingRecord]) -> RiskEstimate {
    let mut grouped: BTreeMap<ControlCategory, Vec<&FindingRecord>> = BTreeMap::new();
    for finding in findings {
        if let Some(category) = ControlCategory::from_finding(finding) {
            grouped.entry(category).or_default().push(finding);
        }
    }

    let mut categories = BTreeMap::new();
    let mut overall = 0.0;
    for (category, group) in grouped {
        let assessment = assess_category(&group, &category.base_factors());
        overall += assessment.risk_score;
        categories.insert(category, assessment);
    }

    RiskEstimate {
        categories,
        overall_risk_score: overall,
    }
}
