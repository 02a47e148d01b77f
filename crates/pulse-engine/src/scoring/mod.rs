//! Pure scoring pipeline: normalize raw metrics, aggregate them into the four
//! health components, and combine the components into the composite score.
//! Everything here is stateless and safe to run in parallel across accounts.

mod aggregator;
mod composite;
mod mapping;
mod normalizer;

pub use aggregator::{aggregate, MetricValue};
pub use composite::composite;
pub use mapping::{metric_profile, MetricProfile};
pub use normalizer::{normalize, NormalizeRule};

use crate::domain::{PulseComponents, PulseStatus, Vertical};
use crate::weights::PulseWeights;

/// Outcome of scoring one account for one period.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPeriod {
    pub components: PulseComponents,
    pub score: f64,
    pub status: PulseStatus,
}

/// Run the full pipeline over one account's period metrics.
pub fn score_period(
    metrics: &[MetricValue],
    vertical: Vertical,
    weights: &PulseWeights,
) -> ScoredPeriod {
    let components = aggregate(metrics, vertical);
    let (score, status) = composite(&components, weights);
    ScoredPeriod {
        components,
        score,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_scores_a_tech_account_end_to_end() {
        let metrics = vec![
            MetricValue {
                metric_type: "active_users_percent".to_string(),
                value: 90.0,
            },
            MetricValue {
                metric_type: "nps_score".to_string(),
                value: 40.0,
            },
            MetricValue {
                metric_type: "nrr_percent".to_string(),
                value: 110.0,
            },
        ];
        let weights = PulseWeights {
            usage_weight: 0.4,
            experience_weight: 0.2,
            outcome_weight: 0.3,
            risk_weight: 0.1,
            green_min: 70.0,
            amber_min: 50.0,
        };

        let scored = score_period(&metrics, Vertical::Tech, &weights);
        assert_eq!(scored.components.usage, 90.0);
        assert_eq!(scored.components.experience, 70.0);
        assert_eq!(scored.components.outcomes, 100.0);
        assert_eq!(scored.components.risk, 50.0);
        assert_eq!(scored.score, 85.0);
        assert_eq!(scored.status, PulseStatus::Green);
    }
}
