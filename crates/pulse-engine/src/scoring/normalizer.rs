use super::mapping::metric_profile;
use crate::domain::Vertical;

/// Transfer function placing one raw metric value onto the common 0-100
/// scale. Every benchmark ceiling lives in the mapping table, not here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NormalizeRule {
    /// Value is assumed to already be on a 0-100 scale; clamp into it.
    Clamp,
    /// NPS is defined on [-100, 100]; rescale via (v + 100) / 2, then clamp.
    NpsRescale,
    /// Higher is better against a practical ceiling: v / ceiling * 100, capped at 100.
    ScaleToCeiling { ceiling: f64 },
    /// Lower is better against a target ceiling: 100 - v / ceiling * 100, floored at 0.
    InverseCeiling { ceiling: f64 },
}

impl NormalizeRule {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            NormalizeRule::Clamp => clamp(value),
            NormalizeRule::NpsRescale => clamp((value + 100.0) / 2.0),
            NormalizeRule::ScaleToCeiling { ceiling } => (value / ceiling * 100.0).min(100.0),
            NormalizeRule::InverseCeiling { ceiling } => {
                (100.0 - value / ceiling * 100.0).max(0.0)
            }
        }
    }
}

fn clamp(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// Normalize a raw metric value to the 0-100 scale using the vertical's
/// mapping table. Total for finite input: metric types without a table entry
/// are assumed to already be 0-100 and are clamped unchanged.
pub fn normalize(metric_type: &str, value: f64, vertical: Vertical) -> f64 {
    match metric_profile(vertical, metric_type) {
        Some(profile) => profile.rule.apply(value),
        None => clamp(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_metrics_are_clamped() {
        assert_eq!(normalize("active_users_percent", 90.0, Vertical::Tech), 90.0);
        assert_eq!(normalize("nrr_percent", 110.0, Vertical::Tech), 100.0);
        assert_eq!(normalize("no_show_rate_percent", -3.0, Vertical::Healthcare), 0.0);
    }

    #[test]
    fn nps_rescales_from_its_own_range() {
        assert_eq!(normalize("nps_score", 100.0, Vertical::Tech), 100.0);
        assert_eq!(normalize("nps_score", -100.0, Vertical::Tech), 0.0);
        assert_eq!(normalize("nps_score", 0.0, Vertical::Tech), 50.0);
        assert_eq!(normalize("nps_score", 40.0, Vertical::Tech), 70.0);
    }

    #[test]
    fn counts_scale_against_their_ceilings() {
        assert_eq!(normalize("integration_count", 5.0, Vertical::Tech), 50.0);
        assert_eq!(normalize("integration_count", 25.0, Vertical::Tech), 100.0);
        assert_eq!(normalize("line_stops_count", 5.0, Vertical::Manufacturing), 75.0);
        assert_eq!(normalize("line_stops_count", 40.0, Vertical::Manufacturing), 0.0);
    }

    #[test]
    fn durations_invert_except_mtbf() {
        assert_eq!(
            normalize("patient_wait_time_minutes", 15.0, Vertical::Healthcare),
            50.0
        );
        assert_eq!(normalize("mttr_hours", 2.0, Vertical::Manufacturing), 50.0);
        assert_eq!(
            normalize("unplanned_downtime_hours", 16.0, Vertical::Manufacturing),
            0.0
        );
        assert_eq!(normalize("mtbf_hours", 50.0, Vertical::Manufacturing), 50.0);
        assert_eq!(normalize("mtbf_hours", 250.0, Vertical::Manufacturing), 100.0);
    }

    #[test]
    fn complaint_rate_inverts_against_benchmark() {
        assert_eq!(
            normalize("complaint_rate_per_1000", 2.5, Vertical::Healthcare),
            50.0
        );
        assert_eq!(
            normalize("complaint_rate_per_1000", 10.0, Vertical::Healthcare),
            0.0
        );
    }

    #[test]
    fn unknown_types_fall_back_to_clamping() {
        assert_eq!(normalize("custom_adoption_index", 72.0, Vertical::Tech), 72.0);
        assert_eq!(normalize("custom_adoption_index", 140.0, Vertical::Tech), 100.0);
        assert_eq!(normalize("custom_adoption_index", -8.0, Vertical::Tech), 0.0);
    }
}
