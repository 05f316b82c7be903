//! Engine result types.

use serde::{Deserialize, Serialize};

use crate::input::Team;

/// What a reservation books.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Booking {
    /// A match between two distinct teams.
    Game { home: Team, away: Team },
    /// A single-team practice.
    Practice { team: Team },
}

impl Booking {
    /// The teams this booking occupies.
    #[must_use]
    pub fn teams(&self) -> [Team; 2] {
        match *self {
            Self::Game { home, away } => [home, away],
            Self::Practice { team } => [team, team],
        }
    }
}

/// A placed reservation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub field_id: i32,
    /// Milliseconds since the epoch.
    pub start: i64,
    pub end: i64,
    pub booking: Booking,
}

impl Reservation {
    /// Half-open overlap test against another reservation.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// The outcome of scheduling one request.
///
/// Pairings that could not be placed are omitted from `reservations` and
/// carried here as a diagnostic; a reservation never ships without a
/// booking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleResult {
    pub unique_id: u32,
    pub reservations: Vec<Reservation>,
    /// Pairings left over once every usable lane was exhausted.
    pub unplaced: Vec<Booking>,
}

impl ScheduleResult {
    /// Number of pairings that could not be placed.
    #[must_use]
    pub fn unplaced_count(&self) -> usize {
        self.unplaced.len()
    }

    /// True when every requested pairing found a lane.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unplaced.is_empty()
    }
}
