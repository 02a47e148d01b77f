use crate::domain::{PulseComponents, PulseStatus};
use crate::weights::PulseWeights;

/// Combine component averages into the single 0-100 pulse score, rounded to
/// one decimal. Risk is inverted here so its weight rewards low risk. Weights
/// are trusted input; the weight-update flow validates them upstream.
pub fn composite(components: &PulseComponents, weights: &PulseWeights) -> (f64, PulseStatus) {
    let score = components.usage * weights.usage_weight
        + components.experience * weights.experience_weight
        + components.outcomes * weights.outcome_weight
        + (100.0 - components.risk) * weights.risk_weight;

    let score = (score * 10.0).round() / 10.0;
    (score, status_for(score, weights))
}

/// Two-cut classifier with inclusive bounds; ties go to the higher band.
fn status_for(score: f64, weights: &PulseWeights) -> PulseStatus {
    if score >= weights.green_min {
        PulseStatus::Green
    } else if score >= weights.amber_min {
        PulseStatus::Amber
    } else {
        PulseStatus::Red
    }
}
