use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use utoipa::ToSchema;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Clone,
            Copy,
            Debug,
            Serialize,
            Deserialize,
            ToSchema,
            JsonSchema,
            Eq,
            PartialEq,
            Hash,
            Ord,
            PartialOrd,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<i64> for $name {
            fn from(v: i64) -> Self {
                Self(v)
            }
        }
    };
}
id_newtype!(DayId);
id_newtype!(PeriodId);
id_newtype!(TeacherId);
id_newtype!(CourseId);
id_newtype!(GroupId);
id_newtype!(RequirementId);
id_newtype!(PlacementId);
id_newtype!(ScheduleId);

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintLevel {
    /// Slot cannot be used.
    Hard,
    /// Slot can be used but is discouraged.
    Soft,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintSource {
    Default,
    LocalOverride,
}

/// One cell of the weekly grid.
#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash, Ord,
    PartialOrd,
)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlotKey {
    pub day_id: DayId,
    pub period_id: PeriodId,
}

impl TimeSlotKey {
    pub fn new(day_id: impl Into<DayId>, period_id: impl Into<PeriodId>) -> Self {
        Self {
            day_id: day_id.into(),
            period_id: period_id.into(),
        }
    }
}

impl fmt::Display for TimeSlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.day_id, self.period_id)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintBucket {
    pub level: ConstraintLevel,
    #[serde(default)]
    pub slots: BTreeSet<TimeSlotKey>,
}

/// A single availability layer: the teacher's defaults or one schedule override.
///
/// A slot belongs to at most one bucket. The editing methods below keep that
/// true by letting the most recent assignment win; a deserialized layer may
/// violate it until [`AvailabilityConstraintSet::normalized`] is applied.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
#[serde(transparent)]
pub struct AvailabilityConstraintSet {
    pub buckets: Vec<ConstraintBucket>,
}

impl AvailabilityConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a layer from `(slot, level)` pairs; a later pair for the same slot
    /// replaces the earlier one.
    pub fn from_assignments<I>(assignments: I) -> Self
    where
        I: IntoIterator<Item = (TimeSlotKey, ConstraintLevel)>,
    {
        let mut set = Self::new();
        for (slot, level) in assignments {
            set.assign(slot, Some(level));
        }
        set
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(|b| b.slots.is_empty())
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(|b| b.slots.len()).sum()
    }

    /// Level the layer assigns to `slot`. If the layer is not normalized the
    /// last bucket mentioning the slot decides.
    pub fn level_of(&self, slot: &TimeSlotKey) -> Option<ConstraintLevel> {
        self.buckets
            .iter()
            .rev()
            .find(|b| b.slots.contains(slot))
            .map(|b| b.level)
    }

    /// Moves `slot` into the bucket for `level`, or drops it when `level` is `None`.
    pub fn assign(&mut self, slot: TimeSlotKey, level: Option<ConstraintLevel>) {
        for bucket in &mut self.buckets {
            bucket.slots.remove(&slot);
        }
        if let Some(level) = level {
            match self.buckets.iter_mut().find(|b| b.level == level) {
                Some(bucket) => {
                    bucket.slots.insert(slot);
                }
                None => self.buckets.push(ConstraintBucket {
                    level,
                    slots: BTreeSet::from([slot]),
                }),
            }
        }
        self.buckets.retain(|b| !b.slots.is_empty());
    }

    /// Editor click: unset -> soft -> hard -> unset. Returns the new level.
    pub fn cycle(&mut self, slot: TimeSlotKey) -> Option<ConstraintLevel> {
        let next = match self.level_of(&slot) {
            None => Some(ConstraintLevel::Soft),
            Some(ConstraintLevel::Soft) => Some(ConstraintLevel::Hard),
            Some(ConstraintLevel::Hard) => None,
        };
        self.assign(slot, next);
        next
    }

    /// Rebuilds the layer so each slot sits in exactly one bucket, keeping the
    /// level from the last bucket that mentioned it.
    pub fn normalized(&self) -> Self {
        let pairs = self
            .buckets
            .iter()
            .flat_map(|b| b.slots.iter().map(move |s| (*s, b.level)));
        Self::from_assignments(pairs)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TimeSlotKey, ConstraintLevel)> + '_ {
        self.buckets
            .iter()
            .flat_map(|b| b.slots.iter().map(move |s| (*s, b.level)))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OverrideLayer {
    pub context_id: ScheduleId,
    #[serde(default)]
    pub constraints: AvailabilityConstraintSet,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeacherAvailability {
    pub teacher_id: TeacherId,
    #[serde(default)]
    pub defaults: AvailabilityConstraintSet,
    #[serde(default)]
    pub overrides: Vec<OverrideLayer>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveConstraint {
    pub level: ConstraintLevel,
    pub source: ConstraintSource,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Day {
    pub id: DayId,
    #[serde(default)]
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub id: PeriodId,
    #[serde(default)]
    pub name: String,
    /// Minutes after midnight.
    pub start_minute: u32,
    pub end_minute: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClassType {
    #[default]
    Lecture,
    Lab,
    Seminar,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    pub id: RequirementId,
    pub course_id: CourseId,
    pub student_group_id: GroupId,
    #[serde(default)]
    pub class_type: ClassType,
    pub length_in_periods: u32,
    pub frequency: u32,
    #[serde(default)]
    pub course_label: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSlot {
    pub day_id: DayId,
    pub start_period_id: PeriodId,
    /// 0..=100, computed by the external scheduling service.
    pub satisfaction_score: u8,
    #[serde(default)]
    pub detail_messages: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StagedPlacement {
    pub id: PlacementId,
    pub requirement_id: RequirementId,
    #[serde(default)]
    pub course_label: String,
    pub day_id: DayId,
    pub start_period_id: PeriodId,
    pub length_in_periods: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeSummary {
    #[serde(default)]
    pub message: String,
    pub entries_created: u32,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SlotQuality {
    Ideal,
    Viable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_key_uses_camel_case_on_the_wire() {
        let key = TimeSlotKey::new(1, 3);
        let v = serde_json::to_value(key).unwrap();
        assert_eq!(v, serde_json::json!({"dayId": 1, "periodId": 3}));
    }

    #[test]
    fn slot_keys_order_by_day_then_period() {
        let mut keys = vec![
            TimeSlotKey::new(2, 1),
            TimeSlotKey::new(1, 5),
            TimeSlotKey::new(1, 2),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                TimeSlotKey::new(1, 2),
                TimeSlotKey::new(1, 5),
                TimeSlotKey::new(2, 1)
            ]
        );
    }

    #[test]
    fn constraint_set_is_a_plain_bucket_list() {
        let raw = serde_json::json!([
            {"level": "hard", "slots": [{"dayId": 1, "periodId": 1}]},
            {"level": "soft", "slots": []}
        ]);
        let set: AvailabilityConstraintSet = serde_json::from_value(raw).unwrap();
        assert_eq!(set.buckets.len(), 2);
        assert_eq!(set.buckets[0].level, ConstraintLevel::Hard);
        assert!(set.buckets[1].slots.is_empty());
    }

    #[test]
    fn reassigning_a_slot_drops_its_previous_level() {
        let s = TimeSlotKey::new(1, 1);
        let mut set = AvailabilityConstraintSet::new();
        set.assign(s, Some(ConstraintLevel::Hard));
        set.assign(s, Some(ConstraintLevel::Soft));
        assert_eq!(set.level_of(&s), Some(ConstraintLevel::Soft));
        assert_eq!(set.len(), 1);
        assert_eq!(set.buckets.len(), 1);
    }

    #[test]
    fn from_assignments_is_last_write_wins() {
        let s = TimeSlotKey::new(2, 4);
        let set = AvailabilityConstraintSet::from_assignments([
            (s, ConstraintLevel::Soft),
            (TimeSlotKey::new(3, 1), ConstraintLevel::Hard),
            (s, ConstraintLevel::Hard),
        ]);
        assert_eq!(set.level_of(&s), Some(ConstraintLevel::Hard));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn cycle_walks_soft_hard_unset() {
        let s = TimeSlotKey::new(1, 2);
        let mut set = AvailabilityConstraintSet::new();
        assert_eq!(set.cycle(s), Some(ConstraintLevel::Soft));
        assert_eq!(set.cycle(s), Some(ConstraintLevel::Hard));
        assert_eq!(set.cycle(s), None);
        assert!(set.is_empty());
        assert!(set.buckets.is_empty());
    }

    #[test]
    fn normalized_keeps_last_bucket_for_duplicates() {
        let s = TimeSlotKey::new(5, 5);
        let broken = AvailabilityConstraintSet {
            buckets: vec![
                ConstraintBucket {
                    level: ConstraintLevel::Hard,
                    slots: BTreeSet::from([s, TimeSlotKey::new(1, 1)]),
                },
                ConstraintBucket {
                    level: ConstraintLevel::Soft,
                    slots: BTreeSet::from([s]),
                },
            ],
        };
        assert_eq!(broken.len(), 3);
        let fixed = broken.normalized();
        assert_eq!(fixed.len(), 2);
        assert_eq!(fixed.level_of(&s), Some(ConstraintLevel::Soft));
        assert_eq!(
            fixed.level_of(&TimeSlotKey::new(1, 1)),
            Some(ConstraintLevel::Hard)
        );
    }

    #[test]
    fn requirement_defaults_optional_fields() {
        let raw = serde_json::json!({
            "id": 4, "courseId": 10, "studentGroupId": 2,
            "lengthInPeriods": 2, "frequency": 1
        });
        let r: Requirement = serde_json::from_value(raw).unwrap();
        assert!(matches!(r.class_type, ClassType::Lecture));
        assert!(r.course_label.is_none());
    }
}
