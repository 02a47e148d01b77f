use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::parser::RawMetricRow;
use crate::domain::{AccountId, MetricRecord, TenantId};

/// Sentinel recorded when the upload does not carry a source column.
const DEFAULT_SOURCE: &str = "csv_upload";

/// One per-row rejection. Row numbers are reported as seen in the file: data
/// row 0 is row 2, accounting for the header line and 0-based indexing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    pub row: usize,
    pub field: &'static str,
    pub message: String,
}

/// Result of validating a parsed batch against the tenant's accounts.
#[derive(Debug)]
pub(crate) struct ValidationOutcome {
    pub(crate) valid: Vec<MetricRecord>,
    pub(crate) errors: Vec<RowError>,
    pub(crate) total_rows: usize,
}

/// Validate each row in fixed field order, attributing exactly one error per
/// invalid row. Account names match case-insensitively within the tenant.
pub(crate) fn validate_rows(
    rows: &[RawMetricRow],
    tenant: &TenantId,
    accounts_by_name: &HashMap<String, AccountId>,
) -> ValidationOutcome {
    let mut valid = Vec::new();
    let mut errors = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        let row_num = index + 2;
        match validate_row(row, tenant, accounts_by_name) {
            Ok(metric) => valid.push(metric),
            Err((field, message)) => errors.push(RowError {
                row: row_num,
                field,
                message,
            }),
        }
    }

    ValidationOutcome {
        valid,
        errors,
        total_rows: rows.len(),
    }
}

fn validate_row(
    row: &RawMetricRow,
    tenant: &TenantId,
    accounts_by_name: &HashMap<String, AccountId>,
) -> Result<MetricRecord, (&'static str, String)> {
    let account_name = row
        .account_name
        .as_deref()
        .ok_or(("account_name", "Account name is required".to_string()))?;

    let account_id = accounts_by_name
        .get(&account_name.to_lowercase())
        .ok_or_else(|| {
            (
                "account_name",
                format!("Account \"{account_name}\" not found"),
            )
        })?;

    let metric_type = row
        .metric_type
        .as_deref()
        .ok_or(("metric_type", "Metric type is required".to_string()))?;

    let period_start = parse_period(row.period_start.as_deref(), "period_start", "Period start")?;
    let period_end = parse_period(row.period_end.as_deref(), "period_end", "Period end")?;

    let raw_value = row
        .value
        .as_deref()
        .ok_or(("value", "Value is required".to_string()))?;
    let value: f64 = raw_value
        .parse()
        .map_err(|_| ("value", "Value must be a number".to_string()))?;

    Ok(MetricRecord {
        tenant_id: tenant.clone(),
        account_id: account_id.clone(),
        metric_type: metric_type.to_lowercase(),
        period_start,
        period_end,
        value,
        unit: row.unit.clone(),
        source: row
            .source
            .clone()
            .unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
    })
}

fn parse_period(
    raw: Option<&str>,
    field: &'static str,
    label: &str,
) -> Result<NaiveDate, (&'static str, String)> {
    let raw = raw.ok_or((field, format!("{label} is required")))?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| (field, "Invalid date format (expected YYYY-MM-DD)".to_string()))
}
