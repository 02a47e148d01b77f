use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use pulse_engine::store::InMemoryPulseStore;
use pulse_engine::PulseEngine;
use serde::Deserialize;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Shared handles threaded through the router via `Extension`. The engine is
/// pinned to the in-memory store; a relational backend would swap in here.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) engine: Arc<PulseEngine<InMemoryPulseStore>>,
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).map_err(serde::de::Error::custom)
}
