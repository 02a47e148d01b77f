use std::io::Read;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::domain::{Account, AccountId, PulseScore, TenantId};
use crate::ingest::{self, IngestError};
use crate::scoring::{self, MetricValue};
use crate::store::{PulseStore, StoreError};
use crate::weights::{
    validate_weight_rows, PulseWeightRow, PulseWeights, WeightValidationError, WeightVertical,
};

/// Engine facade composing ingestion, weight configuration, and the
/// tenant-wide recalculation orchestrator over a storage backend.
pub struct PulseEngine<S> {
    store: Arc<S>,
    recalc_concurrency: usize,
}

/// Receipt for a successful upload: what was persisted and, when the batch
/// carried a period window, the recalculation run it triggered.
#[derive(Debug, Serialize)]
pub struct IngestReceipt {
    pub uploaded: usize,
    pub window: Option<(NaiveDate, NaiveDate)>,
    pub recalc: Option<RecalcReport>,
}

/// Outcome of one tenant-wide recalculation run. Recomputation is
/// best-effort per account; failed accounts are reported, never dropped.
#[derive(Debug, Clone, Serialize)]
pub struct RecalcReport {
    pub scored: usize,
    pub failures: Vec<RecalcFailure>,
}

/// One account that could not be rescored, and why.
#[derive(Debug, Clone, Serialize)]
pub struct RecalcFailure {
    pub account_id: AccountId,
    pub account_name: String,
    pub reason: String,
}

/// Failure of a recalculation run as a whole, before per-account work.
#[derive(Debug, thiserror::Error)]
pub enum RecalcError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("recalculation worker panicked: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Failure applying a weight configuration update.
#[derive(Debug, thiserror::Error)]
pub enum WeightUpdateError {
    #[error(transparent)]
    Validation(#[from] WeightValidationError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl<S> PulseEngine<S>
where
    S: PulseStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self::with_concurrency(store, 8)
    }

    /// Bound for the recalculation worker pool; accounts are independent, so
    /// any bound >= 1 is correct.
    pub fn with_concurrency(store: Arc<S>, recalc_concurrency: usize) -> Self {
        Self {
            store,
            recalc_concurrency: recalc_concurrency.max(1),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Validate, persist, and rescore a CSV metrics upload. Persistence only
    /// happens when the full batch validates; the recompute window is the
    /// min/max period span observed across the upload.
    pub async fn ingest_csv<R: Read>(
        &self,
        tenant: &TenantId,
        reader: R,
    ) -> Result<IngestReceipt, IngestError> {
        let accounts = self.store.find_accounts_by_tenant(tenant)?;
        let staged = ingest::validate_and_stage(reader, tenant, &accounts)?;

        let uploaded = self.store.create_metrics_batch(staged.metrics)?;
        info!(tenant = %tenant.0, uploaded, "metrics batch persisted");

        let recalc = match staged.window {
            Some((start, end)) => {
                let report = self
                    .recalculate(tenant, start, end)
                    .await
                    .map_err(|err| match err {
                        RecalcError::Store(store) => IngestError::Store(store),
                        RecalcError::Worker(join) => {
                            IngestError::Store(StoreError::Unavailable(join.to_string()))
                        }
                    })?;
                Some(report)
            }
            None => None,
        };

        Ok(IngestReceipt {
            uploaded,
            window: staged.window,
            recalc,
        })
    }

    /// Recompute pulse scores for every account of the tenant over the
    /// half-open window [period_start, period_end), fanning out across a
    /// bounded worker pool and upserting one snapshot per account.
    pub async fn recalculate(
        &self,
        tenant: &TenantId,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<RecalcReport, RecalcError> {
        let accounts = self.store.find_accounts_by_tenant(tenant)?;
        let semaphore = Arc::new(Semaphore::new(self.recalc_concurrency));
        let mut workers = JoinSet::new();

        for account in accounts {
            let store = self.store.clone();
            let tenant = tenant.clone();
            let semaphore = semaphore.clone();
            workers.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("recalc semaphore closed");
                let result = score_account(store.as_ref(), &tenant, &account, period_start, period_end);
                (account, result)
            });
        }

        let mut scored = 0;
        let mut failures = Vec::new();
        while let Some(joined) = workers.join_next().await {
            let (account, result) = joined?;
            match result {
                Ok(()) => scored += 1,
                Err(err) => {
                    warn!(
                        account = %account.name,
                        error = %err,
                        "account recalculation failed; continuing run"
                    );
                    failures.push(RecalcFailure {
                        account_id: account.id,
                        account_name: account.name,
                        reason: err.to_string(),
                    });
                }
            }
        }

        info!(
            tenant = %tenant.0,
            scored,
            failed = failures.len(),
            %period_start,
            %period_end,
            "recalculation run complete"
        );

        Ok(RecalcReport { scored, failures })
    }

    /// Replace the tenant's weight configuration. All-or-nothing: the first
    /// invalid row rejects the whole submission and nothing is applied.
    pub fn update_weights(
        &self,
        tenant: &TenantId,
        rows: Vec<PulseWeightRow>,
    ) -> Result<(), WeightUpdateError> {
        validate_weight_rows(&rows)?;
        self.store.replace_weights(tenant, rows)?;
        Ok(())
    }

    pub fn list_weights(&self, tenant: &TenantId) -> Result<Vec<PulseWeightRow>, StoreError> {
        self.store.find_weights_by_tenant(tenant)
    }

    pub fn account_score(
        &self,
        tenant: &TenantId,
        account: &AccountId,
        period_start: NaiveDate,
    ) -> Result<Option<PulseScore>, StoreError> {
        self.store.find_pulse_score(tenant, account, period_start)
    }
}

/// Score one account for the window and upsert its snapshot. Pure pipeline in
/// the middle; the only writes are the possible synthesized weight row and
/// the final upsert.
fn score_account<S: PulseStore>(
    store: &S,
    tenant: &TenantId,
    account: &Account,
    period_start: NaiveDate,
    period_end: NaiveDate,
) -> Result<(), StoreError> {
    let weights = effective_weights(store, tenant, account)?;

    let metrics: Vec<MetricValue> = store
        .find_metrics_by_account_and_period(tenant, &account.id, period_start, period_end)?
        .into_iter()
        .map(|metric| MetricValue {
            metric_type: metric.metric_type,
            value: metric.value,
        })
        .collect();

    let scored = scoring::score_period(&metrics, account.vertical, &weights);

    store.upsert_pulse_score(PulseScore {
        tenant_id: tenant.clone(),
        account_id: account.id.clone(),
        period_start,
        period_end,
        score: scored.score,
        status: scored.status,
        components: scored.components,
    })
}

/// Resolve the weight row to score with: the account's vertical row, else the
/// tenant's default row, else synthesize and persist the hardcoded fallback.
/// A configuration gap never fails the computation.
fn effective_weights<S: PulseStore>(
    store: &S,
    tenant: &TenantId,
    account: &Account,
) -> Result<PulseWeights, StoreError> {
    if let Some(row) =
        store.find_weight_by_tenant_and_vertical(tenant, account.vertical.into())?
    {
        return Ok(row.weights);
    }

    if let Some(row) = store.find_weight_by_tenant_and_vertical(tenant, WeightVertical::Default)? {
        return Ok(row.weights);
    }

    let fallback = PulseWeightRow {
        tenant_id: tenant.clone(),
        vertical: WeightVertical::Default,
        weights: PulseWeights::default(),
    };
    match store.create_weight(fallback.clone()) {
        Ok(row) => Ok(row.weights),
        // A concurrent worker synthesized it first; read theirs back.
        Err(StoreError::Conflict) => Ok(store
            .find_weight_by_tenant_and_vertical(tenant, WeightVertical::Default)?
            .map(|row| row.weights)
            .unwrap_or_else(|| fallback.weights)),
        Err(other) => Err(other),
    }
}
