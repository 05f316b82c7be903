//! Pitchside scheduling engine.
//!
//! Turns one [`ScheduleRequest`] into one [`ScheduleResult`]:
//!
//! 1. **Pair enumeration** - every unordered team pair per pool
//!    occurrence (singletons for practice requests), shuffled with a seed
//!    derived from the request id so repeats spread across the calendar.
//! 2. **Lane expansion** - each slot becomes `concurrency` parallel
//!    lanes, walked in (start, field, lane) order.
//! 3. **Assignment** - a greedy walk that books the first pending pairing
//!    each lane can legally hold: no team in two overlapping lanes, no
//!    coach conflict across overlapping lanes, home/away balanced per
//!    team.
//!
//! The engine is synchronous and pure: identical requests produce
//! identical results, and nothing here locks or suspends. Callers run one
//! engine invocation per stream input on their own task.

mod assign;
pub mod error;
pub mod input;
pub mod lanes;
pub mod output;
pub mod pairing;

pub use error::{EngineError, Result};
pub use input::{ConflictSpec, FieldSpec, ScheduleRequest, SlotSpec, Team, TeamPool};
pub use lanes::{expand_lanes, Lane};
pub use output::{Booking, Reservation, ScheduleResult};
pub use pairing::{enumerate_pairings, seed_for, Pairing};

use tracing::debug;

/// Schedules one request.
///
/// Malformed inputs (duplicate team ids within a collection, slots with
/// `end <= start`) fail fast without partial output. Exhausting the lanes
/// is not an error: the result then carries the leftover pairings as a
/// diagnostic.
pub fn schedule(request: &ScheduleRequest) -> Result<ScheduleResult> {
    request.validate()?;

    let pending = enumerate_pairings(request);
    let lanes = expand_lanes(request);

    debug!(
        unique_id = request.unique_id,
        pairings = pending.len(),
        lanes = lanes.len(),
        practice = request.is_practice,
        "scheduling request"
    );

    let (reservations, unplaced) = assign::assign(request, &lanes, pending);

    if !unplaced.is_empty() {
        debug!(
            unique_id = request.unique_id,
            unplaced = unplaced.len(),
            "lanes exhausted before all pairings were placed"
        );
    }

    Ok(ScheduleResult {
        unique_id: request.unique_id,
        reservations,
        unplaced,
    })
}
