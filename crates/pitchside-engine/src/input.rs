//! Engine request types.
//!
//! A [`ScheduleRequest`] is an immutable, self-contained unit of work:
//! the teams that may be paired, the fields with their usable slots, and
//! the coach conflicts to respect. The engine never reaches back into a
//! store; the caller snapshots everything up front.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{EngineError, Result};

/// A team participating in one request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Team {
    pub id: i32,
}

/// Teams that may be paired against each other.
///
/// Pair multiplicity is expressed by repeating a pool: each occurrence
/// contributes every unordered pair once.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamPool {
    pub teams: Vec<Team>,
}

impl TeamPool {
    #[must_use]
    pub fn new(ids: impl IntoIterator<Item = i32>) -> Self {
        Self {
            teams: ids.into_iter().map(|id| Team { id }).collect(),
        }
    }
}

/// A bookable interval on a field, with its reservation lanes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSpec {
    /// Milliseconds since the epoch, half-open `[start, end)`.
    pub start: i64,
    pub end: i64,
    /// Parallel reservation lanes this slot supports.
    pub concurrency: u8,
}

/// A field and the slots usable for this request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub id: i32,
    pub slots: Vec<SlotSpec>,
}

/// Teams that share a coach and must not occupy overlapping lanes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictSpec {
    pub id: i32,
    pub region_id: i32,
    pub team_ids: Vec<i32>,
}

/// One unit of scheduling work.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub unique_id: u32,
    pub pools: Vec<TeamPool>,
    pub fields: Vec<FieldSpec>,
    pub conflicts: Vec<ConflictSpec>,
    pub is_practice: bool,
}

impl ScheduleRequest {
    /// Rejects inputs the engine must not attempt: duplicate team ids
    /// within a collection and inverted or empty slots.
    pub fn validate(&self) -> Result<()> {
        for (index, pool) in self.pools.iter().enumerate() {
            let mut seen = HashSet::with_capacity(pool.teams.len());
            for team in &pool.teams {
                if !seen.insert(team.id) {
                    return Err(EngineError::DuplicateTeam {
                        team: team.id,
                        collection: index,
                    });
                }
            }
        }

        for field in &self.fields {
            for slot in &field.slots {
                if slot.end <= slot.start {
                    return Err(EngineError::InvalidSlot {
                        field: field.id,
                        start: slot.start,
                        end: slot.end,
                    });
                }
            }
        }

        Ok(())
    }

    /// Total number of distinct teams mentioned across all pools.
    #[must_use]
    pub fn team_count(&self) -> usize {
        self.pools
            .iter()
            .flat_map(|p| p.teams.iter().map(|t| t.id))
            .collect::<HashSet<_>>()
            .len()
    }
}
