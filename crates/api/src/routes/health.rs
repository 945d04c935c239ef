use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub status: &'static str,
    pub staged: usize,
    pub finalizing: bool,
}

#[utoipa::path(
         get,
         path = "/v1/health",
         responses((status = 200, description = "Service is up", body = Health))
     )]
pub async fn health(State(state): State<AppState>) -> Json<Health> {
    let snap = state.session.snapshot();
    Json(Health {
        status: "ok",
        staged: snap.staged.len(),
        finalizing: snap.finalizing,
    })
}
