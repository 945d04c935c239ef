use serde::Serialize;
use types::{CandidateSlot, SlotQuality};
use utoipa::ToSchema;

/// Score the external service gives a slot with no unmet preferences.
pub const IDEAL_SCORE: u8 = 100;

pub fn classify(score: u8) -> SlotQuality {
    if score >= IDEAL_SCORE {
        SlotQuality::Ideal
    } else {
        SlotQuality::Viable
    }
}

/// Ideal and viable candidates among the loaded slots.
#[derive(Clone, Copy, Debug, Default, Serialize, ToSchema, Eq, PartialEq)]
pub struct QualityCounts {
    pub ideal: usize,
    pub viable: usize,
}

/// Tallies candidates without reordering them.
pub fn count_by_quality(candidates: &[CandidateSlot]) -> QualityCounts {
    let mut counts = QualityCounts::default();
    for c in candidates {
        match classify(c.satisfaction_score) {
            SlotQuality::Ideal => counts.ideal += 1,
            SlotQuality::Viable => counts.viable += 1,
        }
    }
    counts
}

/// Detail messages joined the way a cell tooltip shows them.
pub fn detail_text(candidate: &CandidateSlot) -> String {
    candidate.detail_messages.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{DayId, PeriodId};

    fn cand(score: u8) -> CandidateSlot {
        CandidateSlot {
            day_id: DayId(1),
            start_period_id: PeriodId(1),
            satisfaction_score: score,
            detail_messages: vec!["teacher prefers mornings".into(), "room ok".into()],
        }
    }

    #[test]
    fn only_full_score_is_ideal() {
        assert_eq!(classify(100), SlotQuality::Ideal);
        assert_eq!(classify(99), SlotQuality::Viable);
        assert_eq!(classify(0), SlotQuality::Viable);
    }

    #[test]
    fn counts_split_by_score() {
        let c = count_by_quality(&[cand(100), cand(75), cand(40)]);
        assert_eq!(c, QualityCounts { ideal: 1, viable: 2 });
    }

    #[test]
    fn detail_lines_are_newline_joined() {
        assert_eq!(detail_text(&cand(10)), "teacher prefers mornings\nroom ok");
    }
}
