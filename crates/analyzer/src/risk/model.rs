//! Calibrated model inputs derived from aggregate finding counts.
//!
//! Converts a snapshot of findings into the seven three-point estimates
//! the quantitative model consumes: contact frequency, probability of
//! action, control strength, threat capability, primary loss, and the two
//! secondary-loss parameters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use remtrack_core::{FindingRecord, Severity};

use super::pert::{ConfidenceInterval, RiskParameter};

pub const DEFAULT_CONFIDENCE_LEVELS: [f64; 3] = [0.90, 0.95, 0.99];

/// Dollar cost assigned to one finding of each severity when sizing the
/// primary loss. Policy constants with illustrative defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeverityCosts {
    pub critical: f64,
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl Default for SeverityCosts {
    fn default() -> Self {
        Self {
            critical: 1_000_000.0,
            high: 500_000.0,
            medium: 100_000.0,
            low: 10_000.0,
        }
    }
}

/// The calibrated input distributions for one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskModelInputs {
    pub contact_frequency: RiskParameter,
    pub probability_of_action: RiskParameter,
    pub control_strength: RiskParameter,
    pub threat_capability: RiskParameter,
    pub primary_loss: RiskParameter,
    pub secondary_loss_event_frequency: RiskParameter,
    pub secondary_loss_event_magnitude: RiskParameter,
}

impl RiskModelInputs {
    /// Named view over all parameters, in a stable order.
    pub fn parameters(&self) -> [(&'static str, RiskParameter); 7] {
        [
            ("contact_frequency", self.contact_frequency),
            ("probability_of_action", self.probability_of_action),
            ("control_strength", self.control_strength),
            ("threat_capability", self.threat_capability),
            ("primary_loss", self.primary_loss),
            (
                "secondary_loss_event_frequency",
                self.secondary_loss_event_frequency,
            ),
            (
                "secondary_loss_event_magnitude",
                self.secondary_loss_event_magnitude,
            ),
        ]
    }
}

/// Derive the model inputs from aggregate counts of the supplied findings.
///
/// Degenerate inputs never error: an empty finding set produces floor
/// estimates via the clamping repair, and all denominators use
/// max(1, total).
pub fn estimate_parameters(findings: &[FindingRecord], costs: &SeverityCosts) -> RiskModelInputs {
    let mut critical = 0usize;
    let mut high = 0usize;
    let mut medium = 0usize;
    let mut low = 0usize;
    let mut pass = 0usize;
    for f in findings {
        match f.severity {
            Severity::Critical => critical += 1,
            Severity::High => high += 1,
            Severity::Medium => medium += 1,
            Severity::Low => low += 1,
            _ => {}
        }
        if f.status.is_pass() {
            pass += 1;
        }
    }
    let total = findings.len();
    let n = total.max(1) as f64;

    let contact_frequency = RiskParameter::clamped(0.8 * total as f64, total as f64, 1.2 * total as f64);

    let prob_action = (critical + high) as f64 / n;
    let probability_of_action = RiskParameter::clamped(
        (prob_action - 0.1).max(0.1),
        prob_action.max(0.1),
        (prob_action + 0.1).min(1.0),
    );

    let strength = (pass as f64 / n).max(0.1);
    let control_strength = RiskParameter::clamped(
        (strength - 0.1).max(0.1),
        strength,
        (strength + 0.1).min(1.0),
    );

    let capability = ((0.9 * critical as f64
        + 0.7 * high as f64
        + 0.5 * medium as f64
        + 0.3 * low as f64)
        / n)
        .max(0.1);
    let threat_capability = RiskParameter::clamped(
        (capability - 0.1).max(0.1),
        capability,
        (capability + 0.1).min(1.0),
    );

    let loss = (critical as f64 * costs.critical
        + high as f64 * costs.high
        + medium as f64 * costs.medium
        + low as f64 * costs.low)
        .max(10_000.0);
    let primary_loss = RiskParameter::clamped(0.7 * loss, loss, 1.3 * loss);

    RiskModelInputs {
        contact_frequency,
        probability_of_action,
        control_strength,
        threat_capability,
        primary_loss,
        secondary_loss_event_frequency: RiskParameter::clamped(0.2, 0.3, 0.4),
        secondary_loss_event_magnitude: RiskParameter::clamped(0.3 * loss, 0.5 * loss, 0.7 * loss),
    }
}

/// Two-sided confidence intervals for every model parameter, keyed by
/// parameter name, one interval per requested level.
pub fn confidence_intervals(
    inputs: &RiskModelInputs,
    levels: &[f64],
) -> BTreeMap<String, Vec<ConfidenceInterval>> {
    inputs
        .parameters()
        .iter()
        .map(|(name, param)| {
            let intervals = levels
                .iter()
                .map(|&level| param.confidence_interval(level))
                .collect();
            (name.to_string(), intervals)
        })
        .collect()
}
