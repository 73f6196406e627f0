//! Trace viewer API handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use trajview_graph::{project, FlowGraph};
use trajview_trace::{timeline, SpanDetails, SpanNode, TimelineEntry, TraceModel, TraceSummary};
use uuid::Uuid;

use crate::error::AppError;
use crate::ServerState;

const DEFAULT_SOURCE: &str = "upload.traj";

/// Response for a successful load.
#[derive(Serialize)]
pub struct LoadResponse {
    pub load_id: Uuid,
    pub source: String,
    pub summary: TraceSummary,
}

/// Response for the current trace.
#[derive(Serialize)]
pub struct TraceResponse {
    pub load_id: Uuid,
    pub source: String,
    pub summary: TraceSummary,
    pub selected: Option<String>,
    pub trace_tree: Vec<SpanNode>,
}

/// Query parameters for uploading a trace.
#[derive(Debug, Deserialize, Default)]
pub struct UploadQuery {
    pub name: Option<String>,
}

/// Query parameters for the flow graph.
#[derive(Debug, Deserialize, Default)]
pub struct GraphQuery {
    pub selected: Option<String>,
}

/// POST /api/trace - Load a trace from the raw request body.
pub async fn upload(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<UploadQuery>,
    body: Bytes,
) -> Result<Json<LoadResponse>, AppError> {
    let source = params
        .name
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_SOURCE.to_string());

    let text = std::str::from_utf8(&body).map_err(|e| {
        tracing::warn!(source = %source, "Rejected trace upload: {}", e);
        AppError::BadRequest(format!("Trace file is not valid UTF-8: {}", e))
    })?;
    let model = TraceModel::from_text(text).inspect_err(|e| {
        tracing::warn!(source = %source, "Rejected trace upload: {}", e);
    })?;

    Ok(Json(install(&state, source, model).await))
}

/// POST /api/trace/demo - Load the configured demo trace.
pub async fn demo(State(state): State<Arc<ServerState>>) -> Result<Json<LoadResponse>, AppError> {
    let path = state
        .config
        .demo_trace
        .clone()
        .ok_or_else(|| AppError::NotFound("demo trace not configured".into()))?;

    let model = TraceModel::from_path(&path).inspect_err(|e| {
        tracing::error!("Failed to load demo trace: {}", e);
    })?;
    let source = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(Json(install(&state, source, model).await))
}

/// Swaps the parsed model in under the write lock.
async fn install(state: &ServerState, source: String, model: TraceModel) -> LoadResponse {
    let summary = model.summary();
    let mut session = state.session.write().await;
    let loaded = session.replace(source, model);
    LoadResponse {
        load_id: loaded.load_id,
        source: loaded.source.clone(),
        summary,
    }
}

/// GET /api/trace - Summary and span forest of the current trace.
pub async fn get(State(state): State<Arc<ServerState>>) -> Result<Json<TraceResponse>, AppError> {
    let session = state.session.read().await;
    let loaded = session.current().ok_or_else(AppError::no_trace)?;

    Ok(Json(TraceResponse {
        load_id: loaded.load_id,
        source: loaded.source.clone(),
        summary: loaded.model.summary(),
        selected: session.selected().map(str::to_string),
        trace_tree: loaded.model.roots().to_vec(),
    }))
}

/// GET /api/trace/spans/:id - Span details. Also selects the span.
pub async fn span(
    State(state): State<Arc<ServerState>>,
    Path(span_id): Path<String>,
) -> Result<Json<SpanDetails>, AppError> {
    let mut session = state.session.write().await;
    if session.current().is_none() {
        return Err(AppError::no_trace());
    }
    let span = session
        .select(&span_id)
        .ok_or_else(|| AppError::NotFound(format!("span not found: {}", span_id)))?;

    Ok(Json(SpanDetails::from_span(&span)))
}

/// GET /api/trace/timeline - Spans in start-time order.
pub async fn timeline_entries(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<Vec<TimelineEntry>>, AppError> {
    let session = state.session.read().await;
    let model = session.model().ok_or_else(AppError::no_trace)?;

    Ok(Json(timeline(&model, session.selected())))
}

/// GET /api/trace/graph - Laid-out flow graph. Defaults to the session's selection.
pub async fn graph(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<GraphQuery>,
) -> Result<Json<FlowGraph>, AppError> {
    let (model, selected) = {
        let session = state.session.read().await;
        let model = session.model().ok_or_else(AppError::no_trace)?;
        let selected = params.selected.or_else(|| session.selected().map(str::to_string));
        (model, selected)
    };

    let config = &state.config.graph;
    let graph = project(&model, selected.as_deref(), config).layout_with(state.layout.as_ref(), config);

    Ok(Json(graph))
}
