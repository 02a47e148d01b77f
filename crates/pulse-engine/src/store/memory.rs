use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use super::{PulseStore, StoreError};
use crate::domain::{Account, AccountId, MetricRecord, PulseScore, TenantId};
use crate::weights::{PulseWeightRow, WeightVertical};

/// Mutex-guarded map store backing the demo service and the test suites.
/// Upserts take the lock once, which gives the atomic write-by-key the
/// orchestrator relies on.
#[derive(Default, Clone)]
pub struct InMemoryPulseStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    accounts: HashMap<(TenantId, AccountId), Account>,
    metrics: Vec<MetricRecord>,
    weights: HashMap<(TenantId, WeightVertical), PulseWeightRow>,
    scores: HashMap<(TenantId, AccountId, NaiveDate), PulseScore>,
}

impl InMemoryPulseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an account directly; the engine itself never creates accounts.
    pub fn insert_account(&self, account: Account) {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.accounts.insert(
            (account.tenant_id.clone(), account.id.clone()),
            account,
        );
    }

    pub fn metric_count(&self) -> usize {
        self.inner.lock().expect("store mutex poisoned").metrics.len()
    }

    pub fn score_count(&self) -> usize {
        self.inner.lock().expect("store mutex poisoned").scores.len()
    }
}

impl PulseStore for InMemoryPulseStore {
    fn find_accounts_by_tenant(&self, tenant: &TenantId) -> Result<Vec<Account>, StoreError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        let mut accounts: Vec<Account> = inner
            .accounts
            .values()
            .filter(|account| &account.tenant_id == tenant)
            .cloned()
            .collect();
        accounts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(accounts)
    }

    fn find_account_by_id(
        &self,
        tenant: &TenantId,
        account: &AccountId,
    ) -> Result<Option<Account>, StoreError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner
            .accounts
            .get(&(tenant.clone(), account.clone()))
            .cloned())
    }

    fn find_metrics_by_account_and_period(
        &self,
        tenant: &TenantId,
        account: &AccountId,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<Vec<MetricRecord>, StoreError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner
            .metrics
            .iter()
            .filter(|metric| {
                &metric.tenant_id == tenant
                    && &metric.account_id == account
                    && metric.period_start >= period_start
                    && metric.period_start < period_end
            })
            .cloned()
            .collect())
    }

    fn find_weights_by_tenant(&self, tenant: &TenantId) -> Result<Vec<PulseWeightRow>, StoreError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        let mut rows: Vec<PulseWeightRow> = inner
            .weights
            .values()
            .filter(|row| &row.tenant_id == tenant)
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.vertical);
        Ok(rows)
    }

    fn find_weight_by_tenant_and_vertical(
        &self,
        tenant: &TenantId,
        vertical: WeightVertical,
    ) -> Result<Option<PulseWeightRow>, StoreError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner.weights.get(&(tenant.clone(), vertical)).cloned())
    }

    fn create_weight(&self, row: PulseWeightRow) -> Result<PulseWeightRow, StoreError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let key = (row.tenant_id.clone(), row.vertical);
        if inner.weights.contains_key(&key) {
            return Err(StoreError::Conflict);
        }
        inner.weights.insert(key, row.clone());
        Ok(row)
    }

    fn replace_weights(
        &self,
        tenant: &TenantId,
        rows: Vec<PulseWeightRow>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        for row in rows {
            if &row.tenant_id != tenant {
                return Err(StoreError::Unavailable(
                    "weight row crosses tenant boundary".to_string(),
                ));
            }
            inner
                .weights
                .insert((row.tenant_id.clone(), row.vertical), row);
        }
        Ok(())
    }

    fn create_metrics_batch(&self, metrics: Vec<MetricRecord>) -> Result<usize, StoreError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let count = metrics.len();
        inner.metrics.extend(metrics);
        Ok(count)
    }

    fn upsert_pulse_score(&self, score: PulseScore) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.scores.insert(
            (
                score.tenant_id.clone(),
                score.account_id.clone(),
                score.period_start,
            ),
            score,
        );
        Ok(())
    }

    fn find_pulse_score(
        &self,
        tenant: &TenantId,
        account: &AccountId,
        period_start: NaiveDate,
    ) -> Result<Option<PulseScore>, StoreError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner
            .scores
            .get(&(tenant.clone(), account.clone(), period_start))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Vertical;
    use crate::weights::PulseWeights;

    fn tenant() -> TenantId {
        TenantId("tenant-1".to_string())
    }

    fn account(id: &str, name: &str) -> Account {
        Account {
            id: AccountId(id.to_string()),
            tenant_id: tenant(),
            name: name.to_string(),
            vertical: Vertical::Tech,
            segment: None,
            owner: None,
            mrr: 1000.0,
            base_currency: "USD".to_string(),
        }
    }

    #[test]
    fn accounts_are_scoped_to_their_tenant() {
        let store = InMemoryPulseStore::new();
        store.insert_account(account("a-1", "Acme"));
        let mut other = account("a-2", "Globex");
        other.tenant_id = TenantId("tenant-2".to_string());
        store.insert_account(other);

        let accounts = store.find_accounts_by_tenant(&tenant()).expect("query");
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].name, "Acme");
    }

    #[test]
    fn metric_window_is_half_open() {
        let store = InMemoryPulseStore::new();
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid");
        let end = NaiveDate::from_ymd_opt(2025, 2, 1).expect("valid");
        let metric = |period_start| MetricRecord {
            tenant_id: tenant(),
            account_id: AccountId("a-1".to_string()),
            metric_type: "nrr_percent".to_string(),
            period_start,
            period_end: end,
            value: 100.0,
            unit: None,
            source: "csv_upload".to_string(),
        };
        store
            .create_metrics_batch(vec![metric(start), metric(end)])
            .expect("insert");

        let metrics = store
            .find_metrics_by_account_and_period(&tenant(), &AccountId("a-1".to_string()), start, end)
            .expect("query");
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].period_start, start);
    }

    #[test]
    fn duplicate_weight_rows_conflict() {
        let store = InMemoryPulseStore::new();
        let row = PulseWeightRow {
            tenant_id: tenant(),
            vertical: crate::weights::WeightVertical::Default,
            weights: PulseWeights::default(),
        };
        store.create_weight(row.clone()).expect("first insert");
        assert!(matches!(
            store.create_weight(row),
            Err(StoreError::Conflict)
        ));
    }
}
