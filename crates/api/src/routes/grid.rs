use axum::Json;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::ApiError;
use sched_core::geometry::sort_periods;
use sched_core::grid::{build, CellDescriptor};
use sched_core::{validate_axes, validate_layers};
use types::{CandidateSlot, Day, Period, StagedPlacement};

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GridIn {
    pub days: Vec<Day>,
    pub periods: Vec<Period>,
    #[serde(default)]
    pub staged: Vec<StagedPlacement>,
    #[serde(default)]
    pub candidates: Vec<CandidateSlot>,
}

#[utoipa::path(
    post,
    path = "/v1/grid",
    request_body = GridIn,
    responses(
    (status = 200, description = "Renderable scheduling grid cells", body = [CellDescriptor]),
    (status = 400, description = "Invalid grid input")
    )
)]
pub async fn build_handler(
    Json(mut input): Json<GridIn>,
) -> Result<Json<Vec<CellDescriptor>>, ApiError> {
    sort_periods(&mut input.periods);
    let mut errors = Vec::new();
    if let Err(e) = validate_axes(&input.days, &input.periods) {
        errors.extend(e.messages());
    }
    if let Err(e) = validate_layers(&input.periods, &input.staged, &input.candidates) {
        errors.extend(e.messages());
    }
    if !errors.is_empty() {
        return Err(ApiError {
            status: axum::http::StatusCode::BAD_REQUEST,
            errors,
        });
    }
    Ok(Json(build(
        &input.days,
        &input.periods,
        &input.staged,
        &input.candidates,
    )))
}
