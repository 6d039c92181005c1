//! Baseline API Handlers
//!
//! HTTP endpoints for marking and reading execution baselines.

use std::sync::Arc;

use anchor_core::domain::actor::Actor;
use anchor_core::domain::baseline::BaselineRecord;
use anchor_core::dto::baseline::{
    ACTOR_ID_HEADER, ACTOR_NAME_HEADER, BaselineDetailsQuery, MarkBaseline,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::HeaderMap,
};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::service::BaselineService;

/// Reads the acting user from request headers
///
/// The id header is required; the name falls back to the id.
fn actor_from_headers(headers: &HeaderMap) -> ApiResult<Actor> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    let id = header(ACTOR_ID_HEADER)
        .ok_or_else(|| ApiError::BadRequest(format!("Missing {} header", ACTOR_ID_HEADER)))?;
    let name = header(ACTOR_NAME_HEADER).unwrap_or(id);

    Ok(Actor::new(id, name))
}

/// POST /app/{app_id}/execution/{execution_id}/baseline
/// Mark or unmark an execution as baseline
pub async fn mark_baseline(
    State(service): State<Arc<BaselineService>>,
    Path((app_id, execution_id)): Path<(Uuid, Uuid)>,
    headers: HeaderMap,
    Json(req): Json<MarkBaseline>,
) -> ApiResult<Json<Vec<BaselineRecord>>> {
    let actor = actor_from_headers(&headers)?;
    tracing::info!(
        "{} requested baseline={} for execution {}",
        actor.name,
        req.mark,
        execution_id
    );

    let records = service
        .mark_baseline(&actor, app_id, execution_id, req.mark)
        .await?;

    Ok(Json(records))
}

/// GET /app/{app_id}/baseline/details
pub async fn get_baseline_details(
    State(service): State<Arc<BaselineService>>,
    Path(app_id): Path<Uuid>,
    Query(query): Query<BaselineDetailsQuery>,
) -> ApiResult<Json<Option<BaselineRecord>>> {
    tracing::debug!(
        "Getting baseline details for execution {}",
        query.workflow_execution_id
    );

    let record = service
        .get_baseline_details(
            app_id,
            query.workflow_execution_id,
            query.state_execution_id,
            query.current_execution_id,
        )
        .await?;

    Ok(Json(record))
}

/// GET /app/{app_id}/workflow/{workflow_id}/baselines
pub async fn list_baselines(
    State(service): State<Arc<BaselineService>>,
    Path((app_id, workflow_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Vec<BaselineRecord>>> {
    tracing::debug!("Listing baselines for workflow {}", workflow_id);

    let records = service.list_baselines(app_id, workflow_id).await?;
    Ok(Json(records))
}
