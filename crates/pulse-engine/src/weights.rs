use crate::domain::{TenantId, Vertical};
use serde::{Deserialize, Serialize};

/// Tolerance applied to the weight-sum invariant; sums within it pass.
const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// Scope key for a weight row: a specific vertical, or the tenant-wide
/// fallback row consulted when no vertical-specific row exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightVertical {
    Default,
    Tech,
    Healthcare,
    Manufacturing,
}

impl WeightVertical {
    pub const fn label(self) -> &'static str {
        match self {
            WeightVertical::Default => "default",
            WeightVertical::Tech => "tech",
            WeightVertical::Healthcare => "healthcare",
            WeightVertical::Manufacturing => "manufacturing",
        }
    }
}

impl From<Vertical> for WeightVertical {
    fn from(vertical: Vertical) -> Self {
        match vertical {
            Vertical::Tech => WeightVertical::Tech,
            Vertical::Healthcare => WeightVertical::Healthcare,
            Vertical::Manufacturing => WeightVertical::Manufacturing,
        }
    }
}

/// The four component weights plus the status thresholds. Weights must sum to
/// 1.00 within tolerance and green_min must sit strictly above amber_min;
/// both invariants are enforced by [`validate_weight_rows`] before any row is
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PulseWeights {
    pub usage_weight: f64,
    pub experience_weight: f64,
    pub outcome_weight: f64,
    pub risk_weight: f64,
    pub green_min: f64,
    pub amber_min: f64,
}

impl PulseWeights {
    pub fn weight_sum(&self) -> f64 {
        self.usage_weight + self.experience_weight + self.outcome_weight + self.risk_weight
    }
}

/// Hardcoded fallback synthesized when a tenant has neither a
/// vertical-specific nor a default row.
impl Default for PulseWeights {
    fn default() -> Self {
        Self {
            usage_weight: 0.35,
            experience_weight: 0.25,
            outcome_weight: 0.25,
            risk_weight: 0.15,
            green_min: 70.0,
            amber_min: 50.0,
        }
    }
}

/// One persisted weight configuration row, unique per (tenant, vertical).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PulseWeightRow {
    pub tenant_id: TenantId,
    pub vertical: WeightVertical,
    #[serde(flatten)]
    pub weights: PulseWeights,
}

/// Rejection raised by weight validation; carries the first offending
/// vertical so callers can surface what was computed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WeightValidationError {
    #[error("invalid weights for {vertical}: total must equal 1.00, got {sum:.2}")]
    InvalidSum { vertical: &'static str, sum: f64 },
    #[error(
        "invalid thresholds for {vertical}: green_min {green_min} must be greater than amber_min {amber_min}"
    )]
    InvalidThresholds {
        vertical: &'static str,
        green_min: f64,
        amber_min: f64,
    },
}

/// Validate a submitted batch of weight rows. All-or-nothing: the first
/// invalid row fails the whole update and nothing is applied.
pub fn validate_weight_rows(rows: &[PulseWeightRow]) -> Result<(), WeightValidationError> {
    for row in rows {
        let sum = row.weights.weight_sum();
        if (sum - 1.0).abs() >= WEIGHT_SUM_TOLERANCE {
            return Err(WeightValidationError::InvalidSum {
                vertical: row.vertical.label(),
                sum,
            });
        }
        if row.weights.green_min <= row.weights.amber_min {
            return Err(WeightValidationError::InvalidThresholds {
                vertical: row.vertical.label(),
                green_min: row.weights.green_min,
                amber_min: row.weights.amber_min,
            });
        }
    }
    Ok(())
}
