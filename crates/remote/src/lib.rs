//! JSON-over-HTTP implementation of the scheduling collaborators.

pub mod config;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use sched_core::{
    AvailabilityDataService, FinalizeService, PlacementStagingService, ServiceError,
    ServiceErrorKind, SlotQueryService,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use types::{
    AvailabilityConstraintSet, CandidateSlot, DayId, FinalizeSummary, PeriodId, PlacementId,
    RequirementId, ScheduleId, StagedPlacement, TeacherAvailability, TeacherId,
};

pub use config::RemoteConfig;

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StageRequest {
    pub requirement_id: RequirementId,
    pub day_id: DayId,
    pub start_period_id: PeriodId,
}

#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: Client,
    base: String,
}

impl HttpBackend {
    pub fn new(config: &RemoteConfig) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ServiceError::network(e.to_string()))?;
        Ok(Self::with_client(client, &config.base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}

fn transport(e: reqwest::Error) -> ServiceError {
    ServiceError::network(e.to_string())
}

fn kind_for(status: StatusCode) -> ServiceErrorKind {
    match status {
        StatusCode::NOT_FOUND => ServiceErrorKind::NotFound,
        StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
            ServiceErrorKind::Validation
        }
        _ => ServiceErrorKind::Remote,
    }
}

/// Pulls a human-readable message out of an error body.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "detail", "message"] {
            if let Some(s) = v.get(key).and_then(|x| x.as_str()) {
                return s.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status.to_string()
    } else {
        trimmed.to_string()
    }
}

async fn check(resp: Response) -> Result<Response, ServiceError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ServiceError::new(kind_for(status), error_message(status, &body)))
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ServiceError> {
    let resp = check(resp).await?;
    resp.json::<T>()
        .await
        .map_err(|e| ServiceError::new(ServiceErrorKind::Decode, e.to_string()))
}

#[async_trait]
impl SlotQueryService for HttpBackend {
    async fn valid_slots(
        &self,
        requirement: RequirementId,
    ) -> Result<Vec<CandidateSlot>, ServiceError> {
        let url = self.url(&format!("/requirements/{requirement}/valid-slots"));
        debug!(%url, "GET valid slots");
        let resp = self.client.get(url).send().await.map_err(transport)?;
        decode(resp).await
    }
}

#[async_trait]
impl PlacementStagingService for HttpBackend {
    async fn stage(
        &self,
        requirement: RequirementId,
        day: DayId,
        start_period: PeriodId,
    ) -> Result<StagedPlacement, ServiceError> {
        let url = self.url("/staged-placements");
        let body = StageRequest {
            requirement_id: requirement,
            day_id: day,
            start_period_id: start_period,
        };
        debug!(%url, %requirement, %day, period = %start_period, "POST stage");
        let resp = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        decode(resp).await
    }

    async fn unstage(&self, placement: PlacementId) -> Result<(), ServiceError> {
        let url = self.url(&format!("/staged-placements/{placement}"));
        debug!(%url, "DELETE staged placement");
        let resp = self.client.delete(url).send().await.map_err(transport)?;
        check(resp).await.map(|_| ())
    }
}

#[async_trait]
impl FinalizeService for HttpBackend {
    async fn finalize(&self, schedule: ScheduleId) -> Result<FinalizeSummary, ServiceError> {
        let url = self.url(&format!("/schedules/{schedule}/finalize"));
        debug!(%url, "POST finalize");
        let resp = self.client.post(url).send().await.map_err(transport)?;
        decode(resp).await
    }
}

#[async_trait]
impl AvailabilityDataService for HttpBackend {
    async fn load(&self, teacher: TeacherId) -> Result<TeacherAvailability, ServiceError> {
        let url = self.url(&format!("/teachers/{teacher}/availability"));
        let resp = self.client.get(url).send().await.map_err(transport)?;
        decode(resp).await
    }

    async fn save_defaults(
        &self,
        teacher: TeacherId,
        constraints: &AvailabilityConstraintSet,
    ) -> Result<(), ServiceError> {
        let url = self.url(&format!("/teachers/{teacher}/availability/default"));
        let resp = self
            .client
            .put(url)
            .json(constraints)
            .send()
            .await
            .map_err(transport)?;
        check(resp).await.map(|_| ())
    }

    async fn save_override(
        &self,
        teacher: TeacherId,
        schedule: ScheduleId,
        constraints: &AvailabilityConstraintSet,
    ) -> Result<(), ServiceError> {
        let url = self.url(&format!(
            "/teachers/{teacher}/availability/overrides/{schedule}"
        ));
        let resp = self
            .client
            .put(url)
            .json(constraints)
            .send()
            .await
            .map_err(transport)?;
        check(resp).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_prefers_known_json_fields() {
        let s = StatusCode::UNPROCESSABLE_ENTITY;
        assert_eq!(error_message(s, r#"{"error":"slot taken"}"#), "slot taken");
        assert_eq!(error_message(s, r#"{"detail":"Not found."}"#), "Not found.");
        assert_eq!(error_message(s, "  plain text \n"), "plain text");
        assert_eq!(error_message(s, ""), s.to_string());
        assert_eq!(error_message(s, r#"{"other":1}"#), r#"{"other":1}"#);
    }

    #[test]
    fn status_maps_to_error_kind() {
        assert_eq!(kind_for(StatusCode::NOT_FOUND), ServiceErrorKind::NotFound);
        assert_eq!(kind_for(StatusCode::CONFLICT), ServiceErrorKind::Validation);
        assert_eq!(
            kind_for(StatusCode::INTERNAL_SERVER_ERROR),
            ServiceErrorKind::Remote
        );
    }

    #[test]
    fn base_url_loses_trailing_slash() {
        let b = HttpBackend::with_client(Client::new(), "http://host/api/");
        assert_eq!(b.url("/x"), "http://host/api/x");
    }
}
