use super::mapping::metric_profile;
use super::normalizer;
use crate::domain::{Component, PulseComponents, Vertical};

/// Neutral midpoint used when a component has no contributing metrics in the
/// period, so partial data never collapses the composite to an extreme.
const NEUTRAL_COMPONENT: f64 = 50.0;

/// One metric observation handed to aggregation: the lowercased type and the
/// raw (not yet normalized) value.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricValue {
    pub metric_type: String,
    pub value: f64,
}

/// Group the period's metrics into the four health components, normalizing
/// each value through the vertical's table. Metrics with no table entry are
/// ignored; a component with no contributors averages to exactly 50.
pub fn aggregate(metrics: &[MetricValue], vertical: Vertical) -> PulseComponents {
    let mut usage = Vec::new();
    let mut experience = Vec::new();
    let mut outcomes = Vec::new();
    let mut risk = Vec::new();

    for metric in metrics {
        let Some(profile) = metric_profile(vertical, &metric.metric_type) else {
            continue;
        };
        let normalized = normalizer::normalize(&metric.metric_type, metric.value, vertical);
        match profile.component {
            Component::Usage => usage.push(normalized),
            Component::Experience => experience.push(normalized),
            Component::Outcomes => outcomes.push(normalized),
            Component::Risk => risk.push(normalized),
        }
    }

    PulseComponents {
        usage: mean_or_neutral(&usage),
        experience: mean_or_neutral(&experience),
        outcomes: mean_or_neutral(&outcomes),
        risk: mean_or_neutral(&risk),
    }
}

fn mean_or_neutral(values: &[f64]) -> f64 {
    if values.is_empty() {
        return NEUTRAL_COMPONENT;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
