use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;
use types::{
    CandidateSlot, ConstraintLevel, ConstraintSource, Day, DayId, Period, PeriodId, SlotQuality,
    StagedPlacement,
};
use utoipa::ToSchema;

use crate::availability::EffectiveMap;
use crate::geometry::{GridCell, GridGeometry};
use crate::quality::{classify, detail_text};

/// One renderable cell of the scheduling grid. Cells without a descriptor
/// are empty background.
#[derive(Clone, Debug, Serialize, ToSchema, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CellDescriptor {
    #[serde(rename_all = "camelCase")]
    StagedPlacement {
        column: usize,
        row: usize,
        row_span: u32,
        placement: StagedPlacement,
    },
    #[serde(rename_all = "camelCase")]
    ValidSlot {
        column: usize,
        row: usize,
        day_id: DayId,
        period_id: PeriodId,
        score: u8,
        quality: SlotQuality,
        details: String,
    },
}

impl CellDescriptor {
    pub fn cell(&self) -> GridCell {
        match self {
            CellDescriptor::StagedPlacement { column, row, .. }
            | CellDescriptor::ValidSlot { column, row, .. } => GridCell {
                column: *column,
                row: *row,
            },
        }
    }

    pub fn is_placement(&self) -> bool {
        matches!(self, CellDescriptor::StagedPlacement { .. })
    }
}

/// Builds the scheduling grid view.
///
/// Placements go first and mark their whole footprint occupied; a candidate
/// whose cell is occupied is dropped, so a suggestion can never sit on top of
/// an existing placement.
pub fn build(
    days: &[Day],
    periods: &[Period],
    staged: &[StagedPlacement],
    candidates: &[CandidateSlot],
) -> Vec<CellDescriptor> {
    let geometry = GridGeometry::new(days, periods);
    let mut occupied: HashSet<GridCell> = HashSet::new();
    let mut out = Vec::with_capacity(staged.len() + candidates.len());

    for p in staged {
        let footprint = geometry.footprint(p.day_id, p.start_period_id, p.length_in_periods);
        let Some(origin) = footprint.first().copied() else {
            debug!(placement = %p.id, day = %p.day_id, period = %p.start_period_id, "placement outside grid");
            continue;
        };
        let footprint_rows = footprint.len() as u32;
        occupied.extend(footprint);
        out.push(CellDescriptor::StagedPlacement {
            column: origin.column,
            row: origin.row,
            row_span: footprint_rows,
            placement: p.clone(),
        });
    }

    for c in candidates {
        let Some(cell) = geometry.cell(c.day_id, c.start_period_id) else {
            debug!(day = %c.day_id, period = %c.start_period_id, "candidate outside grid");
            continue;
        };
        if occupied.contains(&cell) {
            continue;
        }
        out.push(CellDescriptor::ValidSlot {
            column: cell.column,
            row: cell.row,
            day_id: c.day_id,
            period_id: c.start_period_id,
            score: c.satisfaction_score,
            quality: classify(c.satisfaction_score),
            details: detail_text(c),
        });
    }

    out
}

#[derive(Clone, Debug, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityCell {
    pub column: usize,
    pub row: usize,
    pub day_id: DayId,
    pub period_id: PeriodId,
    pub level: ConstraintLevel,
    pub source: ConstraintSource,
}

/// Places resolved availability on the same grid the scheduler uses. Slots
/// whose day or period is not on the axes are left out.
pub fn build_availability_cells(
    days: &[Day],
    periods: &[Period],
    effective: &EffectiveMap,
) -> Vec<AvailabilityCell> {
    let geometry = GridGeometry::new(days, periods);
    effective
        .iter()
        .filter_map(|(slot, eff)| {
            let cell = geometry.cell(slot.day_id, slot.period_id)?;
            Some(AvailabilityCell {
                column: cell.column,
                row: cell.row,
                day_id: slot.day_id,
                period_id: slot.period_id,
                level: eff.level,
                source: eff.source,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::resolve;
    use types::{AvailabilityConstraintSet, PlacementId, RequirementId, TimeSlotKey};

    fn days() -> Vec<Day> {
        (1..=5)
            .map(|i| Day {
                id: DayId(i),
                name: format!("D{i}"),
            })
            .collect()
    }

    fn periods() -> Vec<Period> {
        (1..=6)
            .map(|i| Period {
                id: PeriodId(i),
                name: format!("P{i}"),
                start_minute: 480 + 60 * i as u32,
                end_minute: 525 + 60 * i as u32,
            })
            .collect()
    }

    fn placement(id: i64, day: i64, start: i64, len: u32) -> StagedPlacement {
        StagedPlacement {
            id: PlacementId(id),
            requirement_id: RequirementId(id * 10),
            course_label: format!("C{id}"),
            day_id: DayId(day),
            start_period_id: PeriodId(start),
            length_in_periods: len,
        }
    }

    fn cand(day: i64, period: i64, score: u8) -> CandidateSlot {
        CandidateSlot {
            day_id: DayId(day),
            start_period_id: PeriodId(period),
            satisfaction_score: score,
            detail_messages: vec![],
        }
    }

    #[test]
    fn placement_wins_over_candidate_on_same_cell() {
        let out = build(
            &days(),
            &periods(),
            &[placement(1, 1, 2, 1)],
            &[cand(1, 2, 100)],
        );
        assert_eq!(out.len(), 1);
        assert!(out[0].is_placement());
    }

    #[test]
    fn candidates_under_multi_period_footprint_are_hidden() {
        let out = build(
            &days(),
            &periods(),
            &[placement(1, 3, 2, 3)],
            &[cand(3, 2, 90), cand(3, 3, 90), cand(3, 4, 90), cand(3, 5, 90)],
        );
        assert_eq!(out.len(), 2);
        match &out[0] {
            CellDescriptor::StagedPlacement {
                column,
                row,
                row_span,
                ..
            } => {
                assert_eq!((*column, *row, *row_span), (4, 3, 3));
            }
            other => panic!("expected placement, got {other:?}"),
        }
        match &out[1] {
            CellDescriptor::ValidSlot { period_id, row, .. } => {
                assert_eq!(*period_id, PeriodId(5));
                assert_eq!(*row, 6);
            }
            other => panic!("expected slot, got {other:?}"),
        }
    }

    #[test]
    fn overlong_placement_spans_only_remaining_rows() {
        let out = build(
            &days(),
            &periods(),
            &[placement(1, 2, 5, u32::MAX)],
            &[cand(2, 6, 100), cand(2, 4, 100)],
        );
        assert_eq!(out.len(), 2);
        match &out[0] {
            CellDescriptor::StagedPlacement { row, row_span, .. } => {
                assert_eq!((*row, *row_span), (6, 2));
            }
            other => panic!("expected placement, got {other:?}"),
        }
        assert!(matches!(
            &out[1],
            CellDescriptor::ValidSlot { period_id, .. } if *period_id == PeriodId(4)
        ));
    }

    #[test]
    fn candidate_order_and_quality_come_from_input() {
        let out = build(
            &days(),
            &periods(),
            &[],
            &[cand(3, 5, 75), cand(1, 2, 100)],
        );
        let qualities: Vec<SlotQuality> = out
            .iter()
            .map(|d| match d {
                CellDescriptor::ValidSlot { quality, .. } => *quality,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(qualities, vec![SlotQuality::Viable, SlotQuality::Ideal]);
    }

    #[test]
    fn placement_footprints_never_intersect_candidates() {
        let staged = [placement(1, 1, 1, 2), placement(2, 2, 4, 2)];
        let candidates: Vec<CandidateSlot> = (1..=5)
            .flat_map(|d| (1..=6).map(move |p| cand(d, p, 50)))
            .collect();
        let out = build(&days(), &periods(), &staged, &candidates);
        let mut seen = HashSet::new();
        for d in &out {
            assert!(seen.insert(d.cell()), "two descriptors on {:?}", d.cell());
        }
        assert_eq!(out.len(), 30 - 4 + 2);
    }

    #[test]
    fn off_grid_entries_are_skipped() {
        let out = build(
            &days(),
            &periods(),
            &[placement(1, 9, 1, 1)],
            &[cand(1, 42, 100)],
        );
        assert!(out.is_empty());
    }

    #[test]
    fn valid_slot_serializes_with_kind_tag() {
        let out = build(&days(), &periods(), &[], &[cand(2, 1, 100)]);
        let v = serde_json::to_value(&out[0]).unwrap();
        assert_eq!(v["kind"], "VALID_SLOT");
        assert_eq!(v["dayId"], 2);
        assert_eq!(v["quality"], "ideal");
    }

    #[test]
    fn availability_cells_follow_resolved_map() {
        let defaults = AvailabilityConstraintSet::from_assignments([
            (TimeSlotKey::new(1, 1), ConstraintLevel::Hard),
            (TimeSlotKey::new(2, 3), ConstraintLevel::Soft),
            (TimeSlotKey::new(8, 1), ConstraintLevel::Soft),
        ]);
        let eff = resolve(&defaults, &[], None);
        let cells = build_availability_cells(&days(), &periods(), &eff);
        assert_eq!(cells.len(), 2);
        assert_eq!((cells[0].column, cells[0].row), (2, 2));
        assert_eq!(cells[1].level, ConstraintLevel::Soft);
        assert_eq!(cells[1].source, ConstraintSource::Default);
    }
}
