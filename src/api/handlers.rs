use super::auth;
use super::error::ApiError;
use super::server::AppState;
use crate::core::{BatchStatus, LeadImporter};
use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub service: &'static str,
    pub status: &'static str,
    pub mode: String,
    pub import_key_configured: bool,
    pub crm_configured: bool,
    pub uptime_seconds: u64,
    pub time: String,
}

/// Readiness probe. Unauthenticated; reports only whether secrets are present.
pub async fn get_health(Extension(state): Extension<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        service: "lead-relay",
        status: "ok",
        mode: state.settings.mode.to_string(),
        import_key_configured: state.import_api_key.is_some(),
        crm_configured: state.crm.is_some(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        time: chrono::Utc::now().to_rfc3339(),
    })
}

fn passthrough(body: &Value, key: &str) -> Option<Value> {
    body.get(key).filter(|v| !v.is_null()).cloned()
}

/// Imports a batch of leads into the CRM.
///
/// Check order is fixed: import key configured, bearer token, CRM credentials,
/// then the body. A body that is not JSON at all is an unexpected failure (500);
/// a JSON body without a non-empty `leads` array is a bad request (400).
pub async fn post_leads(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let expected = state
        .import_api_key
        .as_deref()
        .ok_or(ApiError::NotConfigured("IMPORT_API_KEY"))?;
    auth::verify_bearer(&headers, expected)?;

    let crm = state
        .crm
        .clone()
        .ok_or(ApiError::NotConfigured("CRM_BASE_URL / CRM_ACCESS_TOKEN"))?;

    let payload: Value = serde_json::from_slice(&body)
        .map_err(|e| ApiError::Internal(format!("invalid request body: {}", e)))?;

    let leads = match payload.get("leads") {
        Some(Value::Array(leads)) if !leads.is_empty() => leads.clone(),
        _ => {
            return Err(ApiError::BadRequest(
                "Body must include a non-empty 'leads' array".to_string(),
            ))
        }
    };
    let source_run_id = passthrough(&payload, "source_run_id");
    let generated_at = passthrough(&payload, "generated_at");

    tracing::info!(
        "Received {} leads (source_run_id: {:?}, mode: {})",
        leads.len(),
        source_run_id,
        state.settings.mode
    );

    let importer = LeadImporter::new(&*crm, &state.settings);
    let report = importer
        .import_batch(leads)
        .await
        .finish(source_run_id, generated_at);

    tracing::info!(
        "Batch finished: {} imported, {} failed",
        report.count,
        report.errors.len()
    );

    let status = match report.status() {
        BatchStatus::Success => StatusCode::CREATED,
        BatchStatus::Failure => StatusCode::BAD_REQUEST,
    };
    Ok((status, Json(report)).into_response())
}
