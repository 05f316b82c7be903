//! Shared fixtures for engine integration tests.

use pitchside_engine::{FieldSpec, ScheduleRequest, SlotSpec, TeamPool};

pub const HOUR: i64 = 3_600_000;

/// A slot starting `index` hours after the epoch, one hour long.
pub fn hour_slot(index: i64, concurrency: u8) -> SlotSpec {
    SlotSpec {
        start: index * HOUR,
        end: (index + 1) * HOUR,
        concurrency,
    }
}

/// A field with `count` consecutive disjoint one-hour slots.
pub fn field_with_hours(id: i32, count: i64, concurrency: u8) -> FieldSpec {
    FieldSpec {
        id,
        slots: (0..count).map(|i| hour_slot(i, concurrency)).collect(),
    }
}

/// A pool repeated once per requested round, which is how the payload
/// builder encodes match multiplicity.
pub fn rounds(pool: TeamPool, times: usize) -> Vec<TeamPool> {
    std::iter::repeat(pool).take(times).collect()
}

pub fn request(
    unique_id: u32,
    pools: Vec<TeamPool>,
    fields: Vec<FieldSpec>,
    is_practice: bool,
) -> ScheduleRequest {
    ScheduleRequest {
        unique_id,
        pools,
        fields,
        conflicts: vec![],
        is_practice,
    }
}
