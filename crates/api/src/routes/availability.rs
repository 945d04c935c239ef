use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ApiError;
use sched_core::availability::resolve;
use sched_core::geometry::sort_periods;
use sched_core::grid::{build_availability_cells, AvailabilityCell};
use sched_core::validate_axes;
use types::{
    AvailabilityConstraintSet, ConstraintLevel, ConstraintSource, Day, OverrideLayer, Period,
    ScheduleId, TimeSlotKey,
};

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolveIn {
    #[serde(default)]
    pub defaults: AvailabilityConstraintSet,
    #[serde(default)]
    pub overrides: Vec<OverrideLayer>,
    #[serde(default)]
    pub active_context_id: Option<ScheduleId>,
}

#[derive(Serialize, ToSchema, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedEntry {
    pub slot: TimeSlotKey,
    pub level: ConstraintLevel,
    pub source: ConstraintSource,
}

#[utoipa::path(
    post,
    path = "/v1/availability/resolve",
    request_body = ResolveIn,
    responses(
    (status = 200, description = "Effective constraint per slot, ordered by day then period", body = [ResolvedEntry])
    )
)]
pub async fn resolve_handler(Json(input): Json<ResolveIn>) -> Json<Vec<ResolvedEntry>> {
    let map = resolve(&input.defaults, &input.overrides, input.active_context_id);
    Json(
        map.into_iter()
            .map(|(slot, eff)| ResolvedEntry {
                slot,
                level: eff.level,
                source: eff.source,
            })
            .collect(),
    )
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityGridIn {
    pub days: Vec<Day>,
    pub periods: Vec<Period>,
    #[serde(flatten)]
    pub layers: ResolveIn,
}

#[utoipa::path(
    post,
    path = "/v1/availability/grid",
    request_body = AvailabilityGridIn,
    responses(
    (status = 200, description = "Availability cells placed on the weekly grid", body = [AvailabilityCell]),
    (status = 400, description = "Invalid day or period axes")
    )
)]
pub async fn grid_handler(
    Json(mut input): Json<AvailabilityGridIn>,
) -> Result<Json<Vec<AvailabilityCell>>, ApiError> {
    sort_periods(&mut input.periods);
    validate_axes(&input.days, &input.periods)?;
    let layers = &input.layers;
    let map = resolve(&layers.defaults, &layers.overrides, layers.active_context_id);
    Ok(Json(build_availability_cells(
        &input.days,
        &input.periods,
        &map,
    )))
}
