use super::normalizer::NormalizeRule;
use crate::domain::{Component, Vertical};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Table entry tying a metric type to its transfer function and the health
/// component it contributes to. A metric type feeds at most one component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricProfile {
    pub rule: NormalizeRule,
    pub component: Component,
}

const fn profile(rule: NormalizeRule, component: Component) -> MetricProfile {
    MetricProfile { rule, component }
}

/// Tech vertical: adoption and licensing drive usage, survey scores drive
/// experience, revenue retention drives outcomes, contraction signals risk.
const TECH_METRICS: &[(&str, MetricProfile)] = &[
    ("active_users_percent", profile(NormalizeRule::Clamp, Component::Usage)),
    ("hero_feature_adoption_percent", profile(NormalizeRule::Clamp, Component::Usage)),
    ("license_utilisation_percent", profile(NormalizeRule::Clamp, Component::Usage)),
    (
        "integration_count",
        profile(NormalizeRule::ScaleToCeiling { ceiling: 10.0 }, Component::Usage),
    ),
    ("nps_score", profile(NormalizeRule::NpsRescale, Component::Experience)),
    ("csat_score", profile(NormalizeRule::Clamp, Component::Experience)),
    ("ces_score", profile(NormalizeRule::Clamp, Component::Experience)),
    ("nrr_percent", profile(NormalizeRule::Clamp, Component::Outcomes)),
    ("expansion_mrr", profile(NormalizeRule::Clamp, Component::Outcomes)),
    ("contraction_mrr", profile(NormalizeRule::Clamp, Component::Risk)),
];

/// Healthcare vertical: wait times, no-shows, and complaints are all
/// risk signals with lower-is-better semantics.
const HEALTHCARE_METRICS: &[(&str, MetricProfile)] = &[
    ("staff_adoption_percent", profile(NormalizeRule::Clamp, Component::Usage)),
    ("patient_experience_score", profile(NormalizeRule::Clamp, Component::Experience)),
    (
        "patient_wait_time_minutes",
        profile(NormalizeRule::InverseCeiling { ceiling: 30.0 }, Component::Risk),
    ),
    ("no_show_rate_percent", profile(NormalizeRule::Clamp, Component::Risk)),
    (
        "complaint_rate_per_1000",
        profile(NormalizeRule::InverseCeiling { ceiling: 5.0 }, Component::Risk),
    ),
];

/// Manufacturing vertical: delivery and yield drive outcomes, downtime and
/// repair time signal risk. MTBF is the one duration where higher is better.
const MANUFACTURING_METRICS: &[(&str, MetricProfile)] = &[
    ("sla_adherence_percent", profile(NormalizeRule::Clamp, Component::Usage)),
    ("otif_percent", profile(NormalizeRule::Clamp, Component::Outcomes)),
    ("first_pass_yield_percent", profile(NormalizeRule::Clamp, Component::Outcomes)),
    (
        "mtbf_hours",
        profile(NormalizeRule::ScaleToCeiling { ceiling: 100.0 }, Component::Outcomes),
    ),
    (
        "unplanned_downtime_hours",
        profile(NormalizeRule::InverseCeiling { ceiling: 8.0 }, Component::Risk),
    ),
    (
        "mttr_hours",
        profile(NormalizeRule::InverseCeiling { ceiling: 4.0 }, Component::Risk),
    ),
    (
        "line_stops_count",
        profile(NormalizeRule::InverseCeiling { ceiling: 20.0 }, Component::Risk),
    ),
];

static METRIC_TABLES: OnceLock<HashMap<(Vertical, &'static str), MetricProfile>> = OnceLock::new();

fn metric_tables() -> &'static HashMap<(Vertical, &'static str), MetricProfile> {
    METRIC_TABLES.get_or_init(|| {
        let verticals = [
            (Vertical::Tech, TECH_METRICS),
            (Vertical::Healthcare, HEALTHCARE_METRICS),
            (Vertical::Manufacturing, MANUFACTURING_METRICS),
        ];

        let mut map = HashMap::new();
        for (vertical, table) in verticals {
            for (metric_type, profile) in table {
                map.insert((vertical, *metric_type), *profile);
            }
        }
        map
    })
}

/// Look up the transfer function and component for a metric type within a
/// vertical. Returns None for unmapped types; aggregation ignores those.
pub fn metric_profile(vertical: Vertical, metric_type: &str) -> Option<MetricProfile> {
    metric_tables().get(&(vertical, metric_type)).copied()
}
