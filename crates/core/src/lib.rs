pub mod availability;
pub mod geometry;
pub mod grid;
pub mod quality;
pub mod services;

use std::collections::HashSet;
use thiserror::Error;

pub use services::{
    AvailabilityDataService, FinalizeService, PlacementStagingService, SchedulingBackend,
    ServiceError, ServiceErrorKind, SlotQueryService,
};
pub use types::{
    AvailabilityConstraintSet, CandidateSlot, ConstraintLevel, ConstraintSource, Day,
    EffectiveConstraint, OverrideLayer, Period, StagedPlacement, TimeSlotKey,
};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid grid input: {0}")]
    Msg(String),
}

impl ValidationError {
    pub fn messages(&self) -> Vec<String> {
        match self {
            ValidationError::Msg(msg) => msg
                .split(';')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}

fn chk_unique<I: ToString>(name: &str, ids: impl Iterator<Item = I>, errors: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for id in ids {
        let s = id.to_string();
        if !seen.insert(s.clone()) {
            errors.push(format!("duplicate {name} id: {s}"));
        }
    }
}

fn finish(errors: Vec<String>) -> Result<(), ValidationError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Msg(errors.join("; ")))
    }
}

/// Checks the day and period axes a grid is built from. Periods must already
/// be in display order (see [`geometry::sort_periods`]).
pub fn validate_axes(days: &[Day], periods: &[Period]) -> Result<(), ValidationError> {
    let mut errors: Vec<String> = Vec::new();

    if days.is_empty() {
        errors.push("days is empty".into());
    }
    if periods.is_empty() {
        errors.push("periods is empty".into());
    }
    chk_unique("day", days.iter().map(|d| d.id), &mut errors);
    chk_unique("period", periods.iter().map(|p| p.id), &mut errors);

    for p in periods {
        if p.end_minute <= p.start_minute {
            errors.push(format!(
                "period {} ends at {} before it starts at {}",
                p.id, p.end_minute, p.start_minute
            ));
        }
    }
    for w in periods.windows(2) {
        if w[1].start_minute < w[0].start_minute {
            errors.push(format!(
                "period {} starts before period {} but is listed after it",
                w[1].id, w[0].id
            ));
        }
    }

    finish(errors)
}

/// Checks the dynamic layers drawn on top of the axes.
pub fn validate_layers(
    periods: &[Period],
    staged: &[StagedPlacement],
    candidates: &[CandidateSlot],
) -> Result<(), ValidationError> {
    let mut errors: Vec<String> = Vec::new();

    chk_unique("placement", staged.iter().map(|p| p.id), &mut errors);
    for p in staged {
        if p.length_in_periods == 0 {
            errors.push(format!("placement {} has zero length", p.id));
        } else if p.length_in_periods as usize > periods.len() {
            errors.push(format!(
                "placement {} spans {} periods but the grid has {}",
                p.id,
                p.length_in_periods,
                periods.len()
            ));
        }
    }
    for c in candidates {
        if c.satisfaction_score > quality::IDEAL_SCORE {
            errors.push(format!(
                "candidate {} has score {} above {}",
                TimeSlotKey {
                    day_id: c.day_id,
                    period_id: c.start_period_id
                },
                c.satisfaction_score,
                quality::IDEAL_SCORE
            ));
        }
    }

    finish(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{DayId, PeriodId, PlacementId, RequirementId};

    fn period(id: i64, start: u32, end: u32) -> Period {
        Period {
            id: PeriodId(id),
            name: String::new(),
            start_minute: start,
            end_minute: end,
        }
    }

    #[test]
    fn axes_report_every_problem() {
        let days = vec![
            Day { id: DayId(1), name: "Mon".into() },
            Day { id: DayId(1), name: "Tue".into() },
        ];
        let periods = vec![period(1, 600, 645), period(2, 480, 470)];
        let err = validate_axes(&days, &periods).unwrap_err();
        let msgs = err.messages();
        assert_eq!(msgs.len(), 3, "{msgs:?}");
        assert!(msgs[0].contains("duplicate day id: 1"));
    }

    #[test]
    fn well_formed_axes_pass() {
        let days = vec![Day { id: DayId(1), name: "Mon".into() }];
        let periods = vec![period(1, 480, 525), period(2, 480, 525), period(3, 540, 585)];
        assert!(validate_axes(&days, &periods).is_ok());
    }

    #[test]
    fn layers_reject_zero_length_and_out_of_range_scores() {
        let staged = vec![StagedPlacement {
            id: PlacementId(1),
            requirement_id: RequirementId(1),
            course_label: String::new(),
            day_id: DayId(1),
            start_period_id: PeriodId(1),
            length_in_periods: 0,
        }];
        let candidates = vec![CandidateSlot {
            day_id: DayId(1),
            start_period_id: PeriodId(2),
            satisfaction_score: 101,
            detail_messages: vec![],
        }];
        let periods = vec![period(1, 480, 525), period(2, 540, 585)];
        let msgs = validate_layers(&periods, &staged, &candidates)
            .unwrap_err()
            .messages();
        assert_eq!(msgs.len(), 2);
        assert!(msgs[1].contains("1.2"));
    }

    #[test]
    fn layers_reject_placements_longer_than_the_grid() {
        let periods = vec![period(1, 480, 525), period(2, 540, 585)];
        let placement = |id: i64, len: u32| StagedPlacement {
            id: PlacementId(id),
            requirement_id: RequirementId(1),
            course_label: String::new(),
            day_id: DayId(1),
            start_period_id: PeriodId(1),
            length_in_periods: len,
        };
        assert!(validate_layers(&periods, &[placement(1, 2)], &[]).is_ok());

        let msgs = validate_layers(&periods, &[placement(2, u32::MAX)], &[])
            .unwrap_err()
            .messages();
        assert_eq!(msgs, vec!["placement 2 spans 4294967295 periods but the grid has 2"]);
    }
}
