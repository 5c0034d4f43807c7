//! Quantitative risk model: PERT parameter estimation, per-category
//! aggregation, and confidence intervals.

pub mod fair;
pub mod model;
pub mod pert;

pub use fair::{
    assess, assess_category, severity_weight, CategoryAssessment, CategoryFactors,
    ControlCategory, RiskBand, RiskEstimate,
};
pub use model::{
    confidence_intervals, estimate_parameters, RiskModelInputs, SeverityCosts,
    DEFAULT_CONFIDENCE_LEVELS,
};
pub use pert::{normal_inverse_cdf, ConfidenceInterval, RiskParameter};
