//! Collaborator interfaces the core talks through. Transport lives elsewhere
//! (see the `remote` crate); tests implement these with scripted doubles.

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;
use types::{
    AvailabilityConstraintSet, CandidateSlot, DayId, FinalizeSummary, PeriodId, PlacementId,
    RequirementId, ScheduleId, StagedPlacement, TeacherAvailability, TeacherId,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ServiceErrorKind {
    Network,
    NotFound,
    Validation,
    Decode,
    Remote,
}

impl fmt::Display for ServiceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ServiceErrorKind::Network => "network",
            ServiceErrorKind::NotFound => "not found",
            ServiceErrorKind::Validation => "validation",
            ServiceErrorKind::Decode => "decode",
            ServiceErrorKind::Remote => "remote",
        };
        f.write_str(s)
    }
}

/// Any failure reported by a collaborator call.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("{kind} error: {message}")]
pub struct ServiceError {
    pub kind: ServiceErrorKind,
    pub message: String,
}

impl ServiceError {
    pub fn new(kind: ServiceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Network, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::NotFound, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Validation, message)
    }
}

#[async_trait]
pub trait SlotQueryService: Send + Sync + 'static {
    async fn valid_slots(&self, requirement: RequirementId)
        -> Result<Vec<CandidateSlot>, ServiceError>;
}

#[async_trait]
pub trait PlacementStagingService: Send + Sync + 'static {
    async fn stage(
        &self,
        requirement: RequirementId,
        day: DayId,
        start_period: PeriodId,
    ) -> Result<StagedPlacement, ServiceError>;

    async fn unstage(&self, placement: PlacementId) -> Result<(), ServiceError>;
}

#[async_trait]
pub trait FinalizeService: Send + Sync + 'static {
    async fn finalize(&self, schedule: ScheduleId) -> Result<FinalizeSummary, ServiceError>;
}

#[async_trait]
pub trait AvailabilityDataService: Send + Sync + 'static {
    async fn load(&self, teacher: TeacherId) -> Result<TeacherAvailability, ServiceError>;

    async fn save_defaults(
        &self,
        teacher: TeacherId,
        constraints: &AvailabilityConstraintSet,
    ) -> Result<(), ServiceError>;

    async fn save_override(
        &self,
        teacher: TeacherId,
        schedule: ScheduleId,
        constraints: &AvailabilityConstraintSet,
    ) -> Result<(), ServiceError>;
}

/// Everything the staging engine needs from the outside world.
pub trait SchedulingBackend: SlotQueryService + PlacementStagingService + FinalizeService {}

impl<T> SchedulingBackend for T where T: SlotQueryService + PlacementStagingService + FinalizeService
{}
