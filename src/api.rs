use std::sync::Arc;

use chrono::{DateTime, Utc};
use shuttle_axum::axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::citations::{
    extract_numbers, Citation, CitationEngine, CitationError, SourceType, ToolResult,
};
use crate::history::{ExtractionEntry, ExtractionHistory};

#[derive(Clone)]
pub struct AppState {
    pub citations: Arc<CitationEngine>,
    pub runs: Arc<ExtractionHistory>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/citations/extract", post(extract))
        .route("/citations/{id}", get(citation_detail))
        .route("/threads/{thread_id}/citations", get(thread_citations))
        .route("/debug/extractions", get(debug_extractions))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Caller identity comes from the gateway as a trusted header. No header,
/// no service.
fn require_user(headers: &HeaderMap) -> Result<String, Response> {
    match headers.get("x-user-id").and_then(|v| v.to_str().ok()) {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err((
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": "missing x-user-id header" })),
        )
            .into_response()),
    }
}

impl IntoResponse for CitationError {
    fn into_response(self) -> Response {
        let status = match &self {
            CitationError::NotFound => StatusCode::NOT_FOUND,
            CitationError::Forbidden => StatusCode::FORBIDDEN,
            CitationError::Store(e) => {
                tracing::error!(error = ?e, "citation store failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExtractReq {
    thread_id: String,
    final_output: String,
    #[serde(default)]
    tool_results: Vec<ToolResult>,
}

/// Lightweight wire view of a citation; the payload itself is only served
/// by the detail endpoint.
#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct CitationSummary {
    id: String,
    source_type: SourceType,
    source_identifier: String,
    citation_text: String,
    position_in_text: usize,
    created_at: DateTime<Utc>,
}

fn summary_of(c: &Citation) -> CitationSummary {
    CitationSummary {
        id: c.id.clone(),
        source_type: c.source_type,
        source_identifier: c.source_identifier.clone(),
        citation_text: c.citation_text.clone(),
        position_in_text: c.position_in_text,
        created_at: c.created_at,
    }
}

async fn extract(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ExtractReq>,
) -> Response {
    let user_id = match require_user(&headers) {
        Ok(u) => u,
        Err(resp) => return resp,
    };

    let numbers_found = extract_numbers(&body.final_output).count();
    let citations = state
        .citations
        .extract_citations(
            &body.thread_id,
            &user_id,
            &body.final_output,
            &body.tool_results,
        )
        .await;

    state.runs.push(
        &body.thread_id,
        &user_id,
        body.tool_results.len(),
        numbers_found,
        citations.len(),
    );

    let out = citations.iter().map(summary_of).collect::<Vec<_>>();
    Json(out).into_response()
}

async fn thread_citations(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let user_id = match require_user(&headers) {
        Ok(u) => u,
        Err(resp) => return resp,
    };

    match state
        .citations
        .citations_for_thread(&thread_id, &user_id)
        .await
    {
        Ok(records) => Json(records.iter().map(summary_of).collect::<Vec<_>>()).into_response(),
        Err(e) => e.into_response(),
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct CitationData {
    id: String,
    source_type: SourceType,
    source_identifier: String,
    data_point: serde_json::Value,
    citation_text: String,
    metadata: CitationMetadata,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct CitationMetadata {
    thread_id: String,
    position_in_text: usize,
    retrieved_at: DateTime<Utc>,
}

async fn citation_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let user_id = match require_user(&headers) {
        Ok(u) => u,
        Err(resp) => return resp,
    };

    match state.citations.citation_data(&id, &user_id).await {
        Ok(c) => Json(CitationData {
            id: c.id,
            source_type: c.source_type,
            source_identifier: c.source_identifier,
            data_point: c.data_point,
            citation_text: c.citation_text,
            metadata: CitationMetadata {
                thread_id: c.thread_id,
                position_in_text: c.position_in_text,
                retrieved_at: c.created_at,
            },
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

async fn debug_extractions(State(state): State<AppState>) -> Json<Vec<ExtractionEntry>> {
    Json(state.runs.snapshot_last_n(10))
}
