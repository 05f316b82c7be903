//! End-to-end engine scenarios.

mod common;

use std::collections::{HashMap, HashSet};

use common::{field_with_hours, request, rounds};
use pitchside_engine::{schedule, Booking, ConflictSpec, TeamPool};

fn booked_pairs(result: &pitchside_engine::ScheduleResult) -> Vec<(i32, i32)> {
    result
        .reservations
        .iter()
        .map(|r| match r.booking {
            Booking::Game { home, away } => {
                (home.id.min(away.id), home.id.max(away.id))
            }
            Booking::Practice { team } => (team.id, team.id),
        })
        .collect()
}

#[test]
fn four_team_round_robin_places_every_pair_once() {
    // One region, four teams, six disjoint slots: the full round robin
    // fits exactly.
    let input = request(
        1,
        vec![TeamPool::new([1, 2, 3, 4])],
        vec![field_with_hours(1, 6, 1)],
        false,
    );

    let result = schedule(&input).unwrap();
    assert!(result.is_complete());
    assert_eq!(result.reservations.len(), 6);

    let pairs: HashSet<(i32, i32)> = booked_pairs(&result).into_iter().collect();
    assert_eq!(pairs.len(), 6, "every pair appears exactly once");
}

#[test]
fn two_regions_two_rounds_never_cross_regions() {
    // Regions A = {1,2,3}, B = {4,5,6}; two rounds each. The builder
    // expresses regional play as one pool per region, repeated per round.
    let region_a = TeamPool::new([1, 2, 3]);
    let region_b = TeamPool::new([4, 5, 6]);
    let mut pools = rounds(region_a, 2);
    pools.extend(rounds(region_b, 2));

    let input = request(2, pools, vec![field_with_hours(1, 12, 1)], false);

    let result = schedule(&input).unwrap();
    assert!(result.is_complete());
    assert_eq!(result.reservations.len(), 12);

    for (a, b) in booked_pairs(&result) {
        let same_region = (a <= 3 && b <= 3) || (a >= 4 && b >= 4);
        assert!(same_region, "pair ({a},{b}) crosses regions");
    }

    // Each pair within a region appears exactly twice.
    let mut multiplicity: HashMap<(i32, i32), usize> = HashMap::new();
    for pair in booked_pairs(&result) {
        *multiplicity.entry(pair).or_default() += 1;
    }
    assert!(multiplicity.values().all(|&count| count == 2));
}

#[test]
fn capacity_bounds_concurrent_reservations() {
    // One two-lane slot, three disjoint pairs: only two fit.
    let input = request(
        3,
        vec![TeamPool::new([1, 2, 3, 4, 5, 6])],
        vec![field_with_hours(1, 1, 2)],
        false,
    );

    let result = schedule(&input).unwrap();
    assert_eq!(result.reservations.len(), 2);
    assert_eq!(result.unplaced_count(), 15 - 2);

    // The two bookings occupy four distinct teams.
    let teams: HashSet<i32> = result
        .reservations
        .iter()
        .flat_map(|r| r.booking.teams().map(|t| t.id))
        .collect();
    assert_eq!(teams.len(), 4);
}

#[test]
fn coach_conflict_is_serialised_across_lanes() {
    // Teams 1 and 2 share a coach. Two lanes overlap at hour zero, plus a
    // disjoint slot afterwards; 1's and 2's games must not overlap.
    let mut input = request(
        4,
        vec![TeamPool::new([1, 2, 3, 4])],
        vec![field_with_hours(1, 2, 2)],
        false,
    );
    input.conflicts = vec![ConflictSpec {
        id: 1,
        region_id: 1,
        team_ids: vec![1, 2],
    }];

    let result = schedule(&input).unwrap();

    let windows_of = |team: i32| -> Vec<(i64, i64)> {
        result
            .reservations
            .iter()
            .filter(|r| r.booking.teams().iter().any(|t| t.id == team))
            .map(|r| (r.start, r.end))
            .collect()
    };

    for w1 in windows_of(1) {
        for w2 in windows_of(2) {
            assert!(
                w1.1 <= w2.0 || w2.1 <= w1.0,
                "conflicting teams 1 and 2 overlap: {w1:?} vs {w2:?}"
            );
        }
    }
}

#[test]
fn practice_round_places_each_team_once() {
    let input = request(
        5,
        vec![TeamPool::new([1, 2, 3, 4, 5])],
        vec![field_with_hours(1, 5, 1)],
        true,
    );

    let result = schedule(&input).unwrap();
    assert!(result.is_complete());
    assert_eq!(result.reservations.len(), 5);

    let teams: HashSet<i32> = result
        .reservations
        .iter()
        .map(|r| match r.booking {
            Booking::Practice { team } => team.id,
            Booking::Game { .. } => panic!("practice input produced a game"),
        })
        .collect();
    assert_eq!(teams, HashSet::from([1, 2, 3, 4, 5]));
}

#[test]
fn practice_underrun_is_flagged_not_fatal() {
    // Three rounds of practice for five teams is fifteen singletons, but
    // only five slots exist.
    let input = request(
        6,
        rounds(TeamPool::new([1, 2, 3, 4, 5]), 3),
        vec![field_with_hours(1, 5, 1)],
        true,
    );

    let result = schedule(&input).unwrap();
    assert_eq!(result.reservations.len(), 5);
    assert_eq!(result.unplaced_count(), 10);
    assert!(!result.is_complete());
}

#[test]
fn identical_inputs_produce_identical_outputs() {
    let input = request(
        7,
        rounds(TeamPool::new([1, 2, 3, 4, 5, 6, 7]), 2),
        vec![field_with_hours(1, 30, 1), field_with_hours(2, 30, 2)],
        false,
    );

    let first = schedule(&input).unwrap();
    let second = schedule(&input).unwrap();
    assert_eq!(first, second);
}

#[test]
fn no_team_is_double_booked_within_capacity() {
    // Dense input: every reservation pair on the same field must either
    // be disjoint in time or sit in distinct lanes, and no team may
    // appear in two overlapping reservations.
    let input = request(
        8,
        rounds(TeamPool::new([1, 2, 3, 4, 5, 6]), 2),
        vec![field_with_hours(1, 10, 2)],
        false,
    );

    let result = schedule(&input).unwrap();

    for (i, a) in result.reservations.iter().enumerate() {
        for b in &result.reservations[i + 1..] {
            if !a.overlaps(b) {
                continue;
            }
            let teams_a: HashSet<i32> = a.booking.teams().map(|t| t.id).into_iter().collect();
            let teams_b: HashSet<i32> = b.booking.teams().map(|t| t.id).into_iter().collect();
            assert!(
                teams_a.is_disjoint(&teams_b),
                "team double-booked across overlapping reservations"
            );
        }
    }

    // Two lanes per slot: never more than two overlapping reservations.
    for a in &result.reservations {
        let concurrent = result
            .reservations
            .iter()
            .filter(|b| a.overlaps(b))
            .count();
        assert!(concurrent <= 2, "capacity exceeded: {concurrent} concurrent");
    }
}

#[test]
fn malformed_input_aborts_without_output() {
    let mut input = request(
        9,
        vec![TeamPool::new([1, 1])],
        vec![field_with_hours(1, 2, 1)],
        false,
    );

    assert!(schedule(&input).is_err());

    input.pools = vec![TeamPool::new([1, 2])];
    input.fields[0].slots[0].end = input.fields[0].slots[0].start;
    assert!(schedule(&input).is_err());
}
