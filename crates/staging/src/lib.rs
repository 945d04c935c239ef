pub mod config;

use parking_lot::RwLock;
use sched_core::quality::{count_by_quality, QualityCounts};
use sched_core::{SchedulingBackend, ServiceError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use types::{
    CandidateSlot, DayId, FinalizeSummary, PeriodId, PlacementId, Requirement, RequirementId,
    ScheduleId, StagedPlacement,
};
use utoipa::ToSchema;

pub use config::StagingConfig;

#[derive(Clone, Copy, Debug, Default, serde::Serialize, ToSchema, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    SlotsLoading,
    SlotsReady,
    /// A stage request for the selection is in flight.
    Staging,
}

#[derive(Clone, Debug, serde::Serialize, ToSchema, Eq, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SelectOutcome {
    /// Selection and candidates were dropped.
    Cleared,
    /// Candidates for the selection are loaded.
    Ready { candidates: usize },
    /// A newer selection was made while this one was loading; its response
    /// was discarded.
    Superseded,
}

#[derive(Debug, Error)]
pub enum StagingError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("no requirement is selected")]
    NoSelection,
    #[error("candidate slots for requirement {0} are not loaded")]
    SlotsNotReady(RequirementId),
    #[error("a finalize is in progress")]
    Finalizing,
    #[error("placement {0} is not staged")]
    PlacementNotFound(PlacementId),
    #[error("day {day}, period {period} is not a candidate for requirement {requirement}")]
    NotACandidate {
        requirement: RequirementId,
        day: DayId,
        period: PeriodId,
    },
}

/// Read-only copy of the engine state.
#[derive(Clone, Debug, Default, serde::Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StagingSnapshot {
    pub selection: Option<RequirementId>,
    pub phase: Phase,
    pub finalizing: bool,
    pub candidates: Vec<CandidateSlot>,
    pub quality: QualityCounts,
    pub staged: Vec<StagedPlacement>,
    pub last_error: Option<String>,
}

#[derive(Default)]
struct EngineState {
    selection: Option<RequirementId>,
    phase: Phase,
    finalizing: bool,
    candidates: Vec<CandidateSlot>,
    staged: Vec<StagedPlacement>,
    last_error: Option<String>,
    // bumped on every selection change; tags in-flight slot queries
    generation: u64,
    // bumped by reset; results from before a reset are dropped
    epoch: u64,
}

impl EngineState {
    fn clear_selection(&mut self) {
        self.selection = None;
        self.candidates.clear();
        self.phase = Phase::Idle;
        self.generation += 1;
    }

    fn record_error(&mut self, e: &ServiceError) {
        self.last_error = Some(e.to_string());
    }

    fn snapshot(&self) -> StagingSnapshot {
        StagingSnapshot {
            selection: self.selection,
            phase: self.phase,
            finalizing: self.finalizing,
            candidates: self.candidates.clone(),
            quality: count_by_quality(&self.candidates),
            staged: self.staged.clone(),
            last_error: self.last_error.clone(),
        }
    }
}

/// Client-side staging session.
///
/// Cloning yields another handle to the same session. State is only locked
/// between collaborator calls, never across one, so overlapping operations
/// interleave at their single await point.
pub struct StagingEngine<B: SchedulingBackend> {
    inner: Arc<RwLock<EngineState>>,
    backend: Arc<B>,
    config: StagingConfig,
}

impl<B: SchedulingBackend> Clone for StagingEngine<B> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            backend: self.backend.clone(),
            config: self.config.clone(),
        }
    }
}

impl<B: SchedulingBackend> StagingEngine<B> {
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, StagingConfig::default())
    }

    pub fn with_config(backend: B, config: StagingConfig) -> Self {
        Self::from_shared(Arc::new(backend), config)
    }

    pub fn from_shared(backend: Arc<B>, config: StagingConfig) -> Self {
        Self {
            inner: Default::default(),
            backend,
            config,
        }
    }

    pub fn snapshot(&self) -> StagingSnapshot {
        self.inner.read().snapshot()
    }

    pub fn selection(&self) -> Option<RequirementId> {
        self.inner.read().selection
    }

    pub fn staged(&self) -> Vec<StagedPlacement> {
        self.inner.read().staged.clone()
    }

    /// How many more placements `requirement` needs beyond what is staged.
    pub fn remaining_for(&self, requirement: &Requirement) -> u32 {
        let staged = self
            .inner
            .read()
            .staged
            .iter()
            .filter(|p| p.requirement_id == requirement.id)
            .count() as u32;
        requirement.frequency.saturating_sub(staged)
    }

    pub fn clear_error(&self) {
        self.inner.write().last_error = None;
    }

    /// Arms `requirement` and loads its candidate slots.
    ///
    /// `None`, or the id that is already selected, clears the selection
    /// without a service call. A failed query clears the selection too.
    pub async fn select_requirement(
        &self,
        requirement: Option<RequirementId>,
    ) -> Result<SelectOutcome, StagingError> {
        let target = {
            let mut st = self.inner.write();
            if st.finalizing {
                return Err(StagingError::Finalizing);
            }
            match requirement {
                Some(id) if st.selection != Some(id) => id,
                _ => {
                    let previous = st.selection;
                    st.clear_selection();
                    debug!(?previous, "selection cleared");
                    return Ok(SelectOutcome::Cleared);
                }
            }
        };
        self.load_candidates(target).await
    }

    async fn load_candidates(
        &self,
        requirement: RequirementId,
    ) -> Result<SelectOutcome, StagingError> {
        let generation = {
            let mut st = self.inner.write();
            st.generation += 1;
            st.selection = Some(requirement);
            st.candidates.clear();
            st.phase = Phase::SlotsLoading;
            st.generation
        };
        debug!(%requirement, generation, "querying valid slots");

        let result = self.backend.valid_slots(requirement).await;

        let mut st = self.inner.write();
        if st.generation != generation {
            debug!(%requirement, generation, current = st.generation, "discarding stale slot response");
            return Ok(SelectOutcome::Superseded);
        }
        match result {
            Ok(candidates) => {
                let n = candidates.len();
                st.candidates = candidates;
                st.phase = Phase::SlotsReady;
                st.last_error = None;
                info!(%requirement, candidates = n, "slots ready");
                Ok(SelectOutcome::Ready { candidates: n })
            }
            Err(e) => {
                warn!(%requirement, error = %e, "slot query failed");
                st.clear_selection();
                st.record_error(&e);
                Err(e.into())
            }
        }
    }

    /// Stages the selected requirement at (`day`, `start_period`).
    ///
    /// Only one stage per selection can be in flight; a second call fails
    /// with [`StagingError::SlotsNotReady`] until the first one settles.
    pub async fn stage_placement(
        &self,
        day: DayId,
        start_period: PeriodId,
    ) -> Result<StagedPlacement, StagingError> {
        let (requirement, generation, epoch) = {
            let mut st = self.inner.write();
            if st.finalizing {
                return Err(StagingError::Finalizing);
            }
            let Some(requirement) = st.selection else {
                return Err(StagingError::NoSelection);
            };
            if st.phase != Phase::SlotsReady {
                return Err(StagingError::SlotsNotReady(requirement));
            }
            if self.config.strict_candidates
                && !st
                    .candidates
                    .iter()
                    .any(|c| c.day_id == day && c.start_period_id == start_period)
            {
                return Err(StagingError::NotACandidate {
                    requirement,
                    day,
                    period: start_period,
                });
            }
            st.phase = Phase::Staging;
            (requirement, st.generation, st.epoch)
        };

        let result = self.backend.stage(requirement, day, start_period).await;

        let mut st = self.inner.write();
        if st.epoch != epoch {
            match &result {
                Ok(placement) => {
                    warn!(placement = %placement.id, "session was reset while staging; dropping placement")
                }
                Err(e) => debug!(%requirement, error = %e, "stage failed after reset"),
            }
            return result.map_err(StagingError::from);
        }
        // a newer selection owns the phase if the generation moved on
        let current = st.generation == generation;
        match result {
            Ok(placement) => {
                st.staged.push(placement.clone());
                if current {
                    st.clear_selection();
                }
                st.last_error = None;
                info!(%requirement, placement = %placement.id, %day, period = %start_period, "placement staged");
                Ok(placement)
            }
            Err(e) => {
                warn!(%requirement, %day, period = %start_period, error = %e, "stage failed");
                if current {
                    st.phase = Phase::SlotsReady;
                }
                st.record_error(&e);
                Err(e.into())
            }
        }
    }

    /// Removes a staged placement and reloads candidates for the requirement
    /// it came from, so the freed cell is offered again.
    pub async fn unstage_placement(
        &self,
        placement: PlacementId,
    ) -> Result<SelectOutcome, StagingError> {
        let requirement = {
            let st = self.inner.read();
            if st.finalizing {
                return Err(StagingError::Finalizing);
            }
            st.staged
                .iter()
                .find(|p| p.id == placement)
                .map(|p| p.requirement_id)
                .ok_or(StagingError::PlacementNotFound(placement))?
        };

        let result = self.backend.unstage(placement).await;

        {
            let mut st = self.inner.write();
            if let Err(e) = result {
                warn!(%placement, error = %e, "unstage failed");
                st.record_error(&e);
                return Err(e.into());
            }
            st.staged.retain(|p| p.id != placement);
            st.last_error = None;
        }
        info!(%placement, %requirement, "placement unstaged");

        // always refetch, even if the requirement is already selected
        self.load_candidates(requirement).await
    }

    /// Turns every staged placement into a permanent schedule entry.
    ///
    /// On failure the staged set is kept as it was so the call can be retried.
    pub async fn finalize_schedule(
        &self,
        schedule: ScheduleId,
    ) -> Result<FinalizeSummary, StagingError> {
        let (staged, epoch) = {
            let mut st = self.inner.write();
            if st.finalizing {
                return Err(StagingError::Finalizing);
            }
            st.finalizing = true;
            (st.staged.len(), st.epoch)
        };
        info!(%schedule, staged, "finalizing schedule");

        let result = self.backend.finalize(schedule).await;

        let mut st = self.inner.write();
        if st.epoch != epoch {
            warn!(%schedule, "session was reset while finalizing");
            return result.map_err(StagingError::from);
        }
        st.finalizing = false;
        match result {
            Ok(summary) => {
                st.staged.clear();
                st.clear_selection();
                st.last_error = None;
                info!(%schedule, entries = summary.entries_created, "schedule finalized");
                Ok(summary)
            }
            Err(e) => {
                warn!(%schedule, error = %e, "finalize failed");
                st.record_error(&e);
                Err(e.into())
            }
        }
    }

    /// Drops the whole session: selection, candidates, staged set and error.
    pub fn reset(&self) {
        let mut st = self.inner.write();
        let generation = st.generation + 1;
        let epoch = st.epoch + 1;
        *st = EngineState {
            generation,
            epoch,
            ..EngineState::default()
        };
        debug!("staging session reset");
    }
}
