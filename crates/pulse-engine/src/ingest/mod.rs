//! Batch metric ingestion: CSV parsing, per-row validation against the
//! tenant's accounts, and staging for persistence. Ingestion is strictly
//! all-or-nothing; a single bad row rejects the entire upload.

mod parser;
mod validator;

pub use validator::RowError;

use std::collections::HashMap;
use std::io::Read;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{Account, MetricRecord, TenantId};
use crate::store::StoreError;

/// A fully validated upload, ready to persist. The recompute window spans the
/// widest period observed across the batch; an empty upload has no window.
#[derive(Debug)]
pub struct StagedBatch {
    pub metrics: Vec<MetricRecord>,
    pub window: Option<(NaiveDate, NaiveDate)>,
}

/// Rejection payload returned to the uploader when any row fails: the full
/// per-row error list plus valid/total counts. Nothing was persisted.
#[derive(Debug, Clone, Serialize)]
pub struct BatchRejection {
    pub message: String,
    pub errors: Vec<RowError>,
    pub valid_rows: usize,
    pub total_rows: usize,
}

/// Failures raised while ingesting a metrics upload.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("invalid metrics CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("{}", .0.message)]
    Rejected(BatchRejection),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Parse and validate an upload against the tenant's account names,
/// partitioning into staged metrics or a full-batch rejection.
pub fn validate_and_stage<R: Read>(
    reader: R,
    tenant: &TenantId,
    accounts: &[Account],
) -> Result<StagedBatch, IngestError> {
    let rows = parser::parse_rows(reader)?;

    let accounts_by_name: HashMap<String, _> = accounts
        .iter()
        .map(|account| (account.name.to_lowercase(), account.id.clone()))
        .collect();

    let outcome = validator::validate_rows(&rows, tenant, &accounts_by_name);
    if !outcome.errors.is_empty() {
        return Err(IngestError::Rejected(BatchRejection {
            message: format!("Validation errors found in {} rows", outcome.errors.len()),
            valid_rows: outcome.valid.len(),
            total_rows: outcome.total_rows,
            errors: outcome.errors,
        }));
    }

    let window = outcome
        .valid
        .iter()
        .map(|metric| (metric.period_start, metric.period_end))
        .reduce(|(start, end), (row_start, row_end)| (start.min(row_start), end.max(row_end)));

    Ok(StagedBatch {
        metrics: outcome.valid,
        window,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccountId, Vertical};
    use std::io::Cursor;

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
    fn one_bad_row_rejects_the_whole_batch() {
        let mut csv = String::from("account_name,metric_type,period_start,period_end,value\n");
        csv.push_str(",nrr_percent,2025-01-01,2025-01-31,100\n");
        for _ in 0..9 {
            csv.push_str("Acme,nrr_percent,2025-01-01,2025-01-31,100\n");
        }

        let err = validate_and_stage(Cursor::new(csv), &tenant(), &[account("a-1", "Acme")])
            .expect_err("batch must be rejected");
        let IngestError::Rejected(rejection) = err else {
            panic!("expected rejection");
        };
        assert_eq!(rejection.errors.len(), 1);
        assert_eq!(rejection.errors[0].row, 2);
        assert_eq!(rejection.valid_rows, 9);
        assert_eq!(rejection.total_rows, 10);
    }

    #[test]
    fn window_spans_the_widest_period_in_the_batch() {
        let csv = "account_name,metric_type,period_start,period_end,value\n\
Acme,nrr_percent,2025-02-01,2025-02-28,100\n\
Acme,nps_score,2025-01-01,2025-01-31,40\n\
Acme,csat_score,2025-03-01,2025-03-31,80\n";

        let staged = validate_and_stage(Cursor::new(csv), &tenant(), &[account("a-1", "Acme")])
            .expect("batch validates");
        let (start, end) = staged.window.expect("window computed");
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid"));
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 3, 31).expect("valid"));
        assert_eq!(staged.metrics.len(), 3);
    }

    #[test]
    fn empty_upload_stages_nothing() {
        let csv = "account_name,metric_type,period_start,period_end,value\n";
        let staged = validate_and_stage(Cursor::new(csv), &tenant(), &[account("a-1", "Acme")])
            .expect("empty batch validates");
        assert!(staged.metrics.is_empty());
        assert!(staged.window.is_none());
    }
}
