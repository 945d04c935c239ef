use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sched_core::ValidationError;
use staging::StagingError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub errors: Vec<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            errors: vec![message.into()],
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            errors: e.messages(),
        }
    }
}

impl From<StagingError> for ApiError {
    fn from(e: StagingError) -> Self {
        let status = match &e {
            StagingError::Service(_) => StatusCode::BAD_GATEWAY,
            StagingError::PlacementNotFound(_) => StatusCode::NOT_FOUND,
            StagingError::Finalizing => StatusCode::CONFLICT,
            StagingError::NoSelection
            | StagingError::SlotsNotReady(_)
            | StagingError::NotACandidate { .. } => StatusCode::BAD_REQUEST,
        };
        Self::new(status, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "ok": false, "errors": self.errors });
        (self.status, Json(body)).into_response()
    }
}
