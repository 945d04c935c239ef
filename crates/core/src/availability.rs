use std::collections::BTreeMap;
use tracing::debug;
use types::{
    AvailabilityConstraintSet, ConstraintSource, EffectiveConstraint, OverrideLayer, ScheduleId,
    TeacherId, TimeSlotKey,
};

use crate::services::{AvailabilityDataService, ServiceError};

pub type EffectiveMap = BTreeMap<TimeSlotKey, EffectiveConstraint>;

/// Merges a teacher's defaults with the override layer for `active_context`.
///
/// An override entry replaces the default entry for the same slot outright;
/// levels are never combined. Without an active context (or without a layer
/// for it) the result is the defaults alone.
pub fn resolve(
    defaults: &AvailabilityConstraintSet,
    overrides: &[OverrideLayer],
    active_context: Option<ScheduleId>,
) -> EffectiveMap {
    let mut map = EffectiveMap::new();
    apply_layer(&mut map, defaults, ConstraintSource::Default);

    if let Some(ctx) = active_context {
        // first layer wins if the data service ever returns duplicates
        match overrides.iter().find(|l| l.context_id == ctx) {
            Some(layer) => apply_layer(&mut map, &layer.constraints, ConstraintSource::LocalOverride),
            None => debug!(context = %ctx, "no override layer for context"),
        }
    }
    map
}

fn apply_layer(map: &mut EffectiveMap, layer: &AvailabilityConstraintSet, source: ConstraintSource) {
    for bucket in &layer.buckets {
        for slot in &bucket.slots {
            map.insert(
                *slot,
                EffectiveConstraint {
                    level: bucket.level,
                    source,
                },
            );
        }
    }
}

/// Reads a teacher's layers and resolves them for `active_context`.
pub async fn load_effective<S>(
    service: &S,
    teacher: TeacherId,
    active_context: Option<ScheduleId>,
) -> Result<EffectiveMap, ServiceError>
where
    S: AvailabilityDataService + ?Sized,
{
    let availability = service.load(teacher).await?;
    let map = resolve(
        &availability.defaults,
        &availability.overrides,
        active_context,
    );
    debug!(teacher = %teacher, slots = map.len(), "resolved availability");
    Ok(map)
}

/// Persists an edited layer: the defaults when `context` is `None`, otherwise
/// the override for that schedule. The layer is normalized first.
pub async fn save_layer<S>(
    service: &S,
    teacher: TeacherId,
    context: Option<ScheduleId>,
    constraints: &AvailabilityConstraintSet,
) -> Result<(), ServiceError>
where
    S: AvailabilityDataService + ?Sized,
{
    let normalized = constraints.normalized();
    match context {
        None => service.save_defaults(teacher, &normalized).await,
        Some(schedule) => service.save_override(teacher, schedule, &normalized).await,
    }
}
