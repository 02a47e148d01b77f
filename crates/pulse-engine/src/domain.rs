use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for tenants; the absolute isolation boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TenantId(pub String);

/// Identifier wrapper for customer accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(pub String);

/// Industry segment an account belongs to; selects the metric-to-component
/// mapping and the default weight row used at scoring time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vertical {
    Tech,
    Healthcare,
    Manufacturing,
}

impl Vertical {
    pub const fn label(self) -> &'static str {
        match self {
            Vertical::Tech => "tech",
            Vertical::Healthcare => "healthcare",
            Vertical::Manufacturing => "manufacturing",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "tech" => Some(Vertical::Tech),
            "healthcare" => Some(Vertical::Healthcare),
            "manufacturing" => Some(Vertical::Manufacturing),
            _ => None,
        }
    }
}

/// Customer size band carried on the account record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccountSegment {
    Enterprise,
    MidMarket,
    Smb,
}

/// A customer record scoped to one tenant. Scores and metrics hang off it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub tenant_id: TenantId,
    pub name: String,
    pub vertical: Vertical,
    pub segment: Option<AccountSegment>,
    pub owner: Option<String>,
    pub mrr: f64,
    pub base_currency: String,
}

/// An immutable metric fact persisted through validated ingestion.
/// Corrections arrive as new rows; nothing is updated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub tenant_id: TenantId,
    pub account_id: AccountId,
    pub metric_type: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub value: f64,
    pub unit: Option<String>,
    pub source: String,
}

/// The four health dimensions combined into the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    Usage,
    Experience,
    Outcomes,
    Risk,
}

/// Component averages produced by aggregation, each on the 0-100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PulseComponents {
    pub usage: f64,
    pub experience: f64,
    pub outcomes: f64,
    pub risk: f64,
}

/// Status band derived from the composite score via tenant thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PulseStatus {
    Green,
    Amber,
    Red,
}

impl PulseStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PulseStatus::Green => "green",
            PulseStatus::Amber => "amber",
            PulseStatus::Red => "red",
        }
    }
}

/// Derived snapshot keyed by (tenant, account, period_start); recomputation
/// overwrites it in place, never appends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PulseScore {
    pub tenant_id: TenantId,
    pub account_id: AccountId,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub score: f64,
    pub status: PulseStatus,
    pub components: PulseComponents,
}
