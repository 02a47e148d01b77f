use clap::Args;
use pulse_engine::domain::{Account, AccountId, AccountSegment, TenantId, Vertical};
use pulse_engine::error::AppError;
use pulse_engine::ingest::IngestError;
use pulse_engine::store::{InMemoryPulseStore, PulseStore, StoreError};
use pulse_engine::weights::{PulseWeightRow, PulseWeights, WeightVertical};
use pulse_engine::PulseEngine;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

pub(crate) const DEMO_TENANT: &str = "demo-tenant-1";

/// Sample upload covering all three verticals for one monthly period.
const SAMPLE_CSV: &str = "\
account_name,metric_type,period_start,period_end,value
Acme Cloud,active_users_percent,2025-01-01,2025-01-31,90
Acme Cloud,nps_score,2025-01-01,2025-01-31,40
Acme Cloud,nrr_percent,2025-01-01,2025-01-31,110
Northwind Labs,active_users_percent,2025-01-01,2025-01-31,55
Northwind Labs,csat_score,2025-01-01,2025-01-31,62
Northwind Labs,contraction_mrr,2025-01-01,2025-01-31,35
Mercy Health Partners,staff_adoption_percent,2025-01-01,2025-01-31,78
Mercy Health Partners,patient_experience_score,2025-01-01,2025-01-31,84
Mercy Health Partners,patient_wait_time_minutes,2025-01-01,2025-01-31,18
Ridgeline Fabrication,sla_adherence_percent,2025-01-01,2025-01-31,96
Ridgeline Fabrication,otif_percent,2025-01-01,2025-01-31,92
Ridgeline Fabrication,unplanned_downtime_hours,2025-01-01,2025-01-31,3
Ridgeline Fabrication,line_stops_count,2025-01-01,2025-01-31,4
";

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Optional metrics CSV to ingest instead of the built-in sample batch
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
}

/// Seed the demo tenant: four accounts across the verticals plus the
/// per-vertical weight rows the settings screen would normally manage.
pub(crate) fn seed_demo_tenant(store: &InMemoryPulseStore) -> Result<(), AppError> {
    let tenant = TenantId(DEMO_TENANT.to_string());

    let accounts = [
        ("acct-1", "Acme Cloud", Vertical::Tech, AccountSegment::Enterprise, 12_500.0),
        ("acct-2", "Northwind Labs", Vertical::Tech, AccountSegment::Smb, 1_800.0),
        (
            "acct-3",
            "Mercy Health Partners",
            Vertical::Healthcare,
            AccountSegment::MidMarket,
            6_400.0,
        ),
        (
            "acct-4",
            "Ridgeline Fabrication",
            Vertical::Manufacturing,
            AccountSegment::MidMarket,
            7_900.0,
        ),
    ];
    for (id, name, vertical, segment, mrr) in accounts {
        store.insert_account(Account {
            id: AccountId(id.to_string()),
            tenant_id: tenant.clone(),
            name: name.to_string(),
            vertical,
            segment: Some(segment),
            owner: Some("csm-demo".to_string()),
            mrr,
            base_currency: "USD".to_string(),
        });
    }

    let weight_rows = [
        (WeightVertical::Default, 0.35, 0.25, 0.25, 0.15, 70.0, 50.0),
        (WeightVertical::Tech, 0.4, 0.25, 0.25, 0.1, 75.0, 55.0),
        (WeightVertical::Healthcare, 0.3, 0.35, 0.2, 0.15, 70.0, 50.0),
        (WeightVertical::Manufacturing, 0.35, 0.2, 0.3, 0.15, 68.0, 48.0),
    ];
    for (vertical, usage, experience, outcome, risk, green_min, amber_min) in weight_rows {
        let row = PulseWeightRow {
            tenant_id: tenant.clone(),
            vertical,
            weights: PulseWeights {
                usage_weight: usage,
                experience_weight: experience,
                outcome_weight: outcome,
                risk_weight: risk,
                green_min,
                amber_min,
            },
        };
        match store.create_weight(row) {
            Ok(_) | Err(StoreError::Conflict) => {}
            Err(other) => return Err(AppError::Store(other)),
        }
    }

    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let store = Arc::new(InMemoryPulseStore::new());
    seed_demo_tenant(store.as_ref())?;
    let engine = PulseEngine::new(store.clone());
    let tenant = TenantId(DEMO_TENANT.to_string());

    println!("Pulse scoring demo (tenant {DEMO_TENANT})");

    let csv = match &args.csv {
        Some(path) => std::fs::read_to_string(path)?,
        None => SAMPLE_CSV.to_string(),
    };

    let receipt = match engine.ingest_csv(&tenant, Cursor::new(csv.into_bytes())).await {
        Ok(receipt) => receipt,
        Err(IngestError::Rejected(rejection)) => {
            println!("\nUpload rejected: {}", rejection.message);
            for error in &rejection.errors {
                println!("- row {} ({}): {}", error.row, error.field, error.message);
            }
            println!(
                "{} of {} rows were valid; nothing was persisted.",
                rejection.valid_rows, rejection.total_rows
            );
            return Ok(());
        }
        Err(other) => return Err(other.into()),
    };

    println!("Uploaded {} metrics", receipt.uploaded);
    let Some((period_start, period_end)) = receipt.window else {
        println!("Empty batch; nothing to score.");
        return Ok(());
    };
    println!("Recompute window: {period_start} -> {period_end}");

    if let Some(report) = &receipt.recalc {
        println!(
            "Rescored {} account(s), {} failure(s)",
            report.scored,
            report.failures.len()
        );
        for failure in &report.failures {
            println!("- {}: {}", failure.account_name, failure.reason);
        }
    }

    println!("\nPortfolio");
    for account in engine.store().find_accounts_by_tenant(&tenant)? {
        match engine.account_score(&tenant, &account.id, period_start)? {
            Some(score) => println!(
                "- {} [{}] score {:.1} ({}) | usage {:.0} experience {:.0} outcomes {:.0} risk {:.0}",
                account.name,
                account.vertical.label(),
                score.score,
                score.status.label(),
                score.components.usage,
                score.components.experience,
                score.components.outcomes,
                score.components.risk,
            ),
            None => println!(
                "- {} [{}]: no score for {period_start}",
                account.name,
                account.vertical.label()
            ),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_engine::domain::PulseStatus;

    #[tokio::test]
    async fn sample_batch_scores_the_whole_demo_portfolio() {
        let store = Arc::new(InMemoryPulseStore::new());
        seed_demo_tenant(store.as_ref()).expect("seed succeeds");
        let engine = PulseEngine::new(store.clone());
        let tenant = TenantId(DEMO_TENANT.to_string());

        let receipt = engine
            .ingest_csv(&tenant, Cursor::new(SAMPLE_CSV))
            .await
            .expect("sample batch is valid");
        assert_eq!(receipt.uploaded, 13);
        let report = receipt.recalc.expect("recalc ran");
        assert_eq!(report.scored, 4);
        assert!(report.failures.is_empty());

        let period_start = chrono::NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid");
        let acme = engine
            .account_score(&tenant, &AccountId("acct-1".to_string()), period_start)
            .expect("query")
            .expect("scored");
        // usage 90, experience 70, outcomes 100, risk neutral 50 under the
        // seeded tech weights (.4/.25/.25/.1, green at 75).
        assert_eq!(acme.score, 83.5);
        assert_eq!(acme.status, PulseStatus::Green);
    }

    #[test]
    fn seeding_twice_is_idempotent() {
        let store = InMemoryPulseStore::new();
        seed_demo_tenant(&store).expect("first seed");
        seed_demo_tenant(&store).expect("second seed tolerates existing rows");
    }
}
