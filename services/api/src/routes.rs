use crate::infra::{deserialize_date, AppState};
use axum::extract::{Path, Query};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::NaiveDate;
use pulse_engine::domain::{AccountId, PulseComponents, PulseStatus, TenantId};
use pulse_engine::error::AppError;
use pulse_engine::store::StoreError;
use pulse_engine::weights::{PulseWeightRow, PulseWeights, WeightVertical};
use pulse_engine::RecalcReport;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;

#[derive(Debug, Deserialize)]
pub(crate) struct UploadRequest {
    pub(crate) tenant_id: String,
    /// Raw CSV text: account_name,metric_type,period_start,period_end,value[,unit,source]
    pub(crate) csv: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct UploadResponse {
    pub(crate) success: bool,
    pub(crate) message: String,
    pub(crate) uploaded: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) period: Option<PeriodSpan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) recalc: Option<RecalcReport>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PeriodSpan {
    pub(crate) start: NaiveDate,
    pub(crate) end: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WeightsQuery {
    pub(crate) tenant_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WeightsUpdateRequest {
    pub(crate) tenant_id: String,
    pub(crate) weights: Vec<WeightRowPayload>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WeightRowPayload {
    pub(crate) vertical: WeightVertical,
    #[serde(flatten)]
    pub(crate) weights: PulseWeights,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecalculateRequest {
    pub(crate) tenant_id: String,
    #[serde(deserialize_with = "deserialize_date")]
    pub(crate) period_start: NaiveDate,
    #[serde(deserialize_with = "deserialize_date")]
    pub(crate) period_end: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScoreQuery {
    pub(crate) tenant_id: String,
    #[serde(deserialize_with = "deserialize_date")]
    pub(crate) period_start: NaiveDate,
}

/// Persisted score representation exposed to read consumers.
#[derive(Debug, Serialize)]
pub(crate) struct ScoreView {
    pub(crate) score: f64,
    pub(crate) status: PulseStatus,
    pub(crate) components: PulseComponents,
    pub(crate) period_start: NaiveDate,
}

pub(crate) fn app_router() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/metrics/upload", post(upload_metrics_endpoint))
        .route(
            "/api/v1/pulse-weights",
            get(get_weights_endpoint).put(put_weights_endpoint),
        )
        .route("/api/v1/recalculate", post(recalculate_endpoint))
        .route(
            "/api/v1/accounts/:account_id/score",
            get(account_score_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn upload_metrics_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<UploadRequest>,
) -> Result<Json<UploadResponse>, AppError> {
    let tenant = TenantId(payload.tenant_id);
    let receipt = state
        .engine
        .ingest_csv(&tenant, Cursor::new(payload.csv.into_bytes()))
        .await?;

    Ok(Json(UploadResponse {
        success: true,
        message: format!("Successfully uploaded {} metrics", receipt.uploaded),
        uploaded: receipt.uploaded,
        period: receipt.window.map(|(start, end)| PeriodSpan { start, end }),
        recalc: receipt.recalc,
    }))
}

pub(crate) async fn get_weights_endpoint(
    Extension(state): Extension<AppState>,
    Query(query): Query<WeightsQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let tenant = TenantId(query.tenant_id);
    let weights = state.engine.list_weights(&tenant)?;
    Ok(Json(json!({ "weights": weights })))
}

pub(crate) async fn put_weights_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<WeightsUpdateRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let tenant = TenantId(payload.tenant_id);
    let rows: Vec<PulseWeightRow> = payload
        .weights
        .into_iter()
        .map(|row| PulseWeightRow {
            tenant_id: tenant.clone(),
            vertical: row.vertical,
            weights: row.weights,
        })
        .collect();

    state.engine.update_weights(&tenant, rows)?;
    Ok(Json(json!({ "success": true })))
}

pub(crate) async fn recalculate_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<RecalculateRequest>,
) -> Result<Json<RecalcReport>, AppError> {
    let tenant = TenantId(payload.tenant_id);
    let report = state
        .engine
        .recalculate(&tenant, payload.period_start, payload.period_end)
        .await?;
    Ok(Json(report))
}

pub(crate) async fn account_score_endpoint(
    Extension(state): Extension<AppState>,
    Path(account_id): Path<String>,
    Query(query): Query<ScoreQuery>,
) -> Result<Json<ScoreView>, AppError> {
    let tenant = TenantId(query.tenant_id);
    let account = AccountId(account_id);
    let score = state
        .engine
        .account_score(&tenant, &account, query.period_start)?
        .ok_or(AppError::Store(StoreError::NotFound))?;

    Ok(Json(ScoreView {
        score: score.score,
        status: score.status,
        components: score.components,
        period_start: score.period_start,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use pulse_engine::domain::{Account, Vertical};
    use pulse_engine::store::InMemoryPulseStore;
    use pulse_engine::PulseEngine;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn test_state() -> AppState {
        let store = Arc::new(InMemoryPulseStore::new());
        store.insert_account(Account {
            id: AccountId("a-1".to_string()),
            tenant_id: TenantId("tenant-1".to_string()),
            name: "Acme".to_string(),
            vertical: Vertical::Tech,
            segment: None,
            owner: None,
            mrr: 1000.0,
            base_currency: "USD".to_string(),
        });
        AppState {
            readiness: Arc::new(AtomicBool::new(true)),
            metrics: Arc::new(
                PrometheusBuilder::new()
                    .build_recorder()
                    .handle(),
            ),
            engine: Arc::new(PulseEngine::new(store)),
        }
    }

    #[tokio::test]
    async fn health_endpoint_responds_ok() {
        let app = app_router().layer(Extension(test_state()));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn upload_endpoint_scores_and_reports_the_window() {
        let state = test_state();
        let request = UploadRequest {
            tenant_id: "tenant-1".to_string(),
            csv: "account_name,metric_type,period_start,period_end,value\n\
Acme,active_users_percent,2025-01-01,2025-01-31,90\n"
                .to_string(),
        };

        let Json(body) = upload_metrics_endpoint(Extension(state), Json(request))
            .await
            .expect("upload succeeds");

        assert!(body.success);
        assert_eq!(body.uploaded, 1);
        let period = body.period.expect("window present");
        assert_eq!(period.start, NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid"));
        let recalc = body.recalc.expect("recalc ran");
        assert_eq!(recalc.scored, 1);
    }

    #[tokio::test]
    async fn score_endpoint_returns_404_until_scored() {
        let state = test_state();
        let query = ScoreQuery {
            tenant_id: "tenant-1".to_string(),
            period_start: NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid"),
        };
        let result = account_score_endpoint(
            Extension(state),
            Path("a-1".to_string()),
            Query(query),
        )
        .await;
        assert!(matches!(
            result,
            Err(AppError::Store(StoreError::NotFound))
        ));
    }

    #[tokio::test]
    async fn weights_roundtrip_through_the_handlers() {
        let state = test_state();
        let update = WeightsUpdateRequest {
            tenant_id: "tenant-1".to_string(),
            weights: vec![WeightRowPayload {
                vertical: WeightVertical::Tech,
                weights: PulseWeights {
                    usage_weight: 0.4,
                    experience_weight: 0.25,
                    outcome_weight: 0.25,
                    risk_weight: 0.1,
                    green_min: 75.0,
                    amber_min: 55.0,
                },
            }],
        };

        put_weights_endpoint(Extension(state.clone()), Json(update))
            .await
            .expect("update applies");

        let Json(body) = get_weights_endpoint(
            Extension(state),
            Query(WeightsQuery {
                tenant_id: "tenant-1".to_string(),
            }),
        )
        .await
        .expect("listing succeeds");
        let rows = body["weights"].as_array().expect("array");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["vertical"], "tech");
    }

    #[tokio::test]
    async fn invalid_weight_update_is_rejected() {
        let state = test_state();
        let update = WeightsUpdateRequest {
            tenant_id: "tenant-1".to_string(),
            weights: vec![WeightRowPayload {
                vertical: WeightVertical::Default,
                weights: PulseWeights {
                    usage_weight: 0.5,
                    experience_weight: 0.25,
                    outcome_weight: 0.25,
                    risk_weight: 0.15,
                    green_min: 70.0,
                    amber_min: 50.0,
                },
            }],
        };

        let result = put_weights_endpoint(Extension(state), Json(update)).await;
        assert!(result.is_err());
    }
}
