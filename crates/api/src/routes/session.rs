use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use staging::{SelectOutcome, StagingSnapshot};
use types::{DayId, FinalizeSummary, PeriodId, PlacementId, RequirementId, ScheduleId, StagedPlacement};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/v1/session",
    responses((status = 200, description = "Current staging session", body = StagingSnapshot))
)]
pub async fn snapshot(State(state): State<AppState>) -> Json<StagingSnapshot> {
    Json(state.session.snapshot())
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectIn {
    #[serde(default)]
    pub requirement_id: Option<RequirementId>,
}

#[utoipa::path(
    post,
    path = "/v1/session/select",
    request_body = SelectIn,
    responses(
    (status = 200, description = "Selection applied", body = SelectOutcome),
    (status = 409, description = "A finalize is in progress"),
    (status = 502, description = "Slot query failed")
    )
)]
pub async fn select(
    State(state): State<AppState>,
    Json(input): Json<SelectIn>,
) -> Result<Json<SelectOutcome>, ApiError> {
    let out = state.session.select_requirement(input.requirement_id).await?;
    Ok(Json(out))
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StageIn {
    pub day_id: DayId,
    pub start_period_id: PeriodId,
}

#[utoipa::path(
    post,
    path = "/v1/session/stage",
    request_body = StageIn,
    responses(
    (status = 200, description = "Placement staged", body = StagedPlacement),
    (status = 400, description = "Nothing selected or slots not loaded"),
    (status = 502, description = "Staging service failed")
    )
)]
pub async fn stage(
    State(state): State<AppState>,
    Json(input): Json<StageIn>,
) -> Result<Json<StagedPlacement>, ApiError> {
    let placement = state
        .session
        .stage_placement(input.day_id, input.start_period_id)
        .await?;
    Ok(Json(placement))
}

#[utoipa::path(
    delete,
    path = "/v1/session/placements/{id}",
    params(("id" = i64, Path, description = "Staged placement ID")),
    responses(
    (status = 200, description = "Placement removed; candidates reloaded", body = SelectOutcome),
    (status = 404, description = "Placement is not staged")
    )
)]
pub async fn unstage(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<SelectOutcome>, ApiError> {
    let out = state.session.unstage_placement(PlacementId(id)).await?;
    Ok(Json(out))
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeIn {
    pub schedule_id: ScheduleId,
}

#[utoipa::path(
    post,
    path = "/v1/session/finalize",
    request_body = FinalizeIn,
    responses(
    (status = 200, description = "Staged placements committed", body = FinalizeSummary),
    (status = 409, description = "A finalize is already running"),
    (status = 502, description = "Finalize service failed")
    )
)]
pub async fn finalize(
    State(state): State<AppState>,
    Json(input): Json<FinalizeIn>,
) -> Result<Json<FinalizeSummary>, ApiError> {
    let summary = state.session.finalize_schedule(input.schedule_id).await?;
    Ok(Json(summary))
}

#[utoipa::path(
    post,
    path = "/v1/session/reset",
    responses((status = 200, description = "Session cleared", body = StagingSnapshot))
)]
pub async fn reset(State(state): State<AppState>) -> Json<StagingSnapshot> {
    state.session.reset();
    Json(state.session.snapshot())
}
