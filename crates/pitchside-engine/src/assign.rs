//! Constrained lane assignment.
//!
//! Walks the lanes in order and, for each lane, books the first pending
//! pairing that violates no constraint:
//!
//! - neither team may already occupy an overlapping lane,
//! - no two teams of one coach conflict may occupy overlapping lanes,
//! - home/away alternates per team so home counts stay balanced.

use std::collections::{HashMap, HashSet};

use crate::input::{ScheduleRequest, Team};
use crate::lanes::Lane;
use crate::output::{Booking, Reservation};
use crate::pairing::Pairing;

/// Mutable state for one assignment run.
struct Assignment {
    /// Windows each team already occupies.
    busy: HashMap<i32, Vec<(i64, i64)>>,
    /// Coach-conflict adjacency: team -> teams it must never overlap.
    conflicts: HashMap<i32, HashSet<i32>>,
    /// Home placements per team, for balancing.
    home_counts: HashMap<i32, u32>,
}

impl Assignment {
    fn new(request: &ScheduleRequest) -> Self {
        let mut conflicts: HashMap<i32, HashSet<i32>> = HashMap::new();
        for conflict in &request.conflicts {
            for &a in &conflict.team_ids {
                for &b in &conflict.team_ids {
                    if a != b {
                        conflicts.entry(a).or_default().insert(b);
                    }
                }
            }
        }

        Self {
            busy: HashMap::new(),
            conflicts,
            home_counts: HashMap::new(),
        }
    }

    fn is_busy_during(&self, team: i32, lane: &Lane) -> bool {
        self.busy
            .get(&team)
            .is_some_and(|windows| windows.iter().any(|&(s, e)| lane.overlaps_window(s, e)))
    }

    /// True if booking `team` into `lane` would put it alongside a
    /// conflicting teammate, or alongside `partner` when the two share a
    /// coach (a pair within one conflict can never be placed at all).
    fn violates_conflict(&self, team: i32, partner: Option<i32>, lane: &Lane) -> bool {
        let Some(adjacent) = self.conflicts.get(&team) else {
            return false;
        };

        if partner.is_some_and(|p| adjacent.contains(&p)) {
            return true;
        }

        adjacent.iter().any(|&other| self.is_busy_during(other, lane))
    }

    fn fits(&self, pairing: &Pairing, lane: &Lane) -> bool {
        match *pairing {
            Pairing::Game { a, b } => {
                !self.is_busy_during(a.id, lane)
                    && !self.is_busy_during(b.id, lane)
                    && !self.violates_conflict(a.id, Some(b.id), lane)
                    && !self.violates_conflict(b.id, Some(a.id), lane)
            }
            Pairing::Practice { team } => {
                !self.is_busy_during(team.id, lane) && !self.violates_conflict(team.id, None, lane)
            }
        }
    }

    fn occupy(&mut self, team: i32, lane: &Lane) {
        self.busy
            .entry(team)
            .or_default()
            .push((lane.start, lane.end));
    }

    /// Orders a pair into (home, away): the team with fewer home games so
    /// far plays home; ties break toward the smaller id.
    fn choose_home(&mut self, a: Team, b: Team) -> (Team, Team) {
        let home_a = self.home_counts.get(&a.id).copied().unwrap_or(0);
        let home_b = self.home_counts.get(&b.id).copied().unwrap_or(0);

        let (home, away) = match home_a.cmp(&home_b) {
            std::cmp::Ordering::Less => (a, b),
            std::cmp::Ordering::Greater => (b, a),
            std::cmp::Ordering::Equal => {
                if a.id <= b.id {
                    (a, b)
                } else {
                    (b, a)
                }
            }
        };

        *self.home_counts.entry(home.id).or_default() += 1;
        (home, away)
    }

    fn book(&mut self, pairing: Pairing, lane: &Lane) -> Reservation {
        let booking = match pairing {
            Pairing::Game { a, b } => {
                self.occupy(a.id, lane);
                self.occupy(b.id, lane);
                let (home, away) = self.choose_home(a, b);
                Booking::Game { home, away }
            }
            Pairing::Practice { team } => {
                self.occupy(team.id, lane);
                Booking::Practice { team }
            }
        };

        Reservation {
            field_id: lane.field_id,
            start: lane.start,
            end: lane.end,
            booking,
        }
    }
}

/// Runs the lane walk. Returns the booked reservations plus the pairings
/// that never found a lane.
pub(crate) fn assign(
    request: &ScheduleRequest,
    lanes: &[Lane],
    mut pending: Vec<Pairing>,
) -> (Vec<Reservation>, Vec<Booking>) {
    let mut state = Assignment::new(request);
    let mut reservations = Vec::new();

    for lane in lanes {
        if pending.is_empty() {
            break;
        }

        let Some(position) = pending.iter().position(|p| state.fits(p, lane)) else {
            continue;
        };

        let pairing = pending.remove(position);
        reservations.push(state.book(pairing, lane));
    }

    let unplaced = pending
        .into_iter()
        .map(|pairing| match pairing {
            // Leftovers have no lane, so home/away is reported by id order.
            Pairing::Game { a, b } => {
                if a.id <= b.id {
                    Booking::Game { home: a, away: b }
                } else {
                    Booking::Game { home: b, away: a }
                }
            }
            Pairing::Practice { team } => Booking::Practice { team },
        })
        .collect();

    (reservations, unplaced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{ConflictSpec, TeamPool};

    fn lane(field_id: i32, start: i64, end: i64, index: u8) -> Lane {
        Lane {
            field_id,
            start,
            end,
            index,
        }
    }

    fn bare_request(conflicts: Vec<ConflictSpec>) -> ScheduleRequest {
        ScheduleRequest {
            unique_id: 1,
            pools: vec![TeamPool::new([1, 2, 3, 4])],
            fields: vec![],
            conflicts,
            is_practice: false,
        }
    }

    fn game(a: i32, b: i32) -> Pairing {
        Pairing::Game {
            a: Team { id: a },
            b: Team { id: b },
        }
    }

    #[test]
    fn team_cannot_occupy_overlapping_lanes() {
        let request = bare_request(vec![]);
        // Two lanes of the same slot.
        let lanes = [lane(1, 0, 100, 0), lane(1, 0, 100, 1)];
        let pending = vec![game(1, 2), game(1, 3)];

        let (reservations, unplaced) = assign(&request, &lanes, pending);

        // (1,3) cannot share the window with (1,2); only one is placed.
        assert_eq!(reservations.len(), 1);
        assert_eq!(unplaced.len(), 1);
    }

    #[test]
    fn disjoint_pairs_share_a_slot() {
        let request = bare_request(vec![]);
        let lanes = [lane(1, 0, 100, 0), lane(1, 0, 100, 1)];
        let pending = vec![game(1, 2), game(3, 4)];

        let (reservations, unplaced) = assign(&request, &lanes, pending);
        assert_eq!(reservations.len(), 2);
        assert!(unplaced.is_empty());
    }

    #[test]
    fn conflicting_teams_are_serialised() {
        let request = bare_request(vec![ConflictSpec {
            id: 1,
            region_id: 1,
            team_ids: vec![1, 2],
        }]);
        // Concurrency two, then a later disjoint slot.
        let lanes = [
            lane(1, 0, 100, 0),
            lane(1, 0, 100, 1),
            lane(1, 100, 200, 0),
        ];
        let pending = vec![game(1, 3), game(2, 4)];

        let (reservations, unplaced) = assign(&request, &lanes, pending);
        assert!(unplaced.is_empty());
        assert_eq!(reservations.len(), 2);

        // The conflicting pair landed in non-overlapping windows.
        assert!(!reservations[0].overlaps(&reservations[1]));
    }

    #[test]
    fn pair_within_one_conflict_is_never_placed() {
        let request = bare_request(vec![ConflictSpec {
            id: 1,
            region_id: 1,
            team_ids: vec![1, 2],
        }]);
        let lanes = [lane(1, 0, 100, 0), lane(1, 200, 300, 0)];
        let pending = vec![game(1, 2)];

        let (reservations, unplaced) = assign(&request, &lanes, pending);
        assert!(reservations.is_empty());
        assert_eq!(unplaced.len(), 1);
    }

    #[test]
    fn home_assignment_balances_and_breaks_ties_by_id() {
        let request = bare_request(vec![]);
        let lanes = [
            lane(1, 0, 100, 0),
            lane(1, 100, 200, 0),
            lane(1, 200, 300, 0),
        ];
        // Team 1 plays three times in a row.
        let pending = vec![game(1, 2), game(1, 3), game(1, 4)];

        let (reservations, _) = assign(&request, &lanes, pending);

        let homes: Vec<i32> = reservations
            .iter()
            .map(|r| match r.booking {
                Booking::Game { home, .. } => home.id,
                Booking::Practice { .. } => unreachable!(),
            })
            .collect();

        // First game: equal counts, smaller id (1) is home. Second game:
        // team 1 already has a home game, so the opponent takes it. Third:
        // 1 and 4 tie at home-count parity; the balance rule keeps team
        // 1's home total within one of its opponents'.
        assert_eq!(homes[0], 1);
        assert_eq!(homes[1], 3);
        assert_eq!(homes[2], 4);
    }
}
