mod memory;

pub use memory::InMemoryPulseStore;

use chrono::NaiveDate;

use crate::domain::{Account, AccountId, MetricRecord, PulseScore, TenantId};
use crate::weights::{PulseWeightRow, WeightVertical};

/// Storage abstraction over the relational collaborator so the engine can be
/// exercised against an in-memory backend in tests and demos. Every query is
/// tenant-scoped; nothing here crosses tenants.
pub trait PulseStore: Send + Sync {
    fn find_accounts_by_tenant(&self, tenant: &TenantId) -> Result<Vec<Account>, StoreError>;

    fn find_account_by_id(
        &self,
        tenant: &TenantId,
        account: &AccountId,
    ) -> Result<Option<Account>, StoreError>;

    /// Metrics whose period_start falls in the half-open window [start, end).
    fn find_metrics_by_account_and_period(
        &self,
        tenant: &TenantId,
        account: &AccountId,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<Vec<MetricRecord>, StoreError>;

    fn find_weights_by_tenant(&self, tenant: &TenantId) -> Result<Vec<PulseWeightRow>, StoreError>;

    fn find_weight_by_tenant_and_vertical(
        &self,
        tenant: &TenantId,
        vertical: WeightVertical,
    ) -> Result<Option<PulseWeightRow>, StoreError>;

    fn create_weight(&self, row: PulseWeightRow) -> Result<PulseWeightRow, StoreError>;

    /// Replace the tenant's weight rows in one operation. Only invoked after
    /// the batch validated in full; partial application is never allowed.
    fn replace_weights(
        &self,
        tenant: &TenantId,
        rows: Vec<PulseWeightRow>,
    ) -> Result<(), StoreError>;

    fn create_metrics_batch(&self, metrics: Vec<MetricRecord>) -> Result<usize, StoreError>;

    /// Atomic upsert keyed by (tenant, account, period_start); the required
    /// primitive for serializing concurrent recalculation triggers.
    fn upsert_pulse_score(&self, score: PulseScore) -> Result<(), StoreError>;

    fn find_pulse_score(
        &self,
        tenant: &TenantId,
        account: &AccountId,
        period_start: NaiveDate,
    ) -> Result<Option<PulseScore>, StoreError>;
}

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
