//! Slot expansion into reservation lanes.

use crate::input::ScheduleRequest;

/// A single concurrent reservation slot derived from a time slot's
/// capacity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lane {
    pub field_id: i32,
    pub start: i64,
    pub end: i64,
    pub index: u8,
}

impl Lane {
    /// Half-open overlap against an arbitrary window.
    #[must_use]
    pub fn overlaps_window(&self, start: i64, end: i64) -> bool {
        self.start < end && start < self.end
    }
}

/// Expands every slot of every field into `concurrency` parallel lanes,
/// ordered by slot start ascending, then field id ascending, then lane
/// index. The walk order is part of the engine's determinism contract.
#[must_use]
pub fn expand_lanes(request: &ScheduleRequest) -> Vec<Lane> {
    let mut lanes = Vec::new();

    for field in &request.fields {
        for slot in &field.slots {
            for index in 0..slot.concurrency {
                lanes.push(Lane {
                    field_id: field.id,
                    start: slot.start,
                    end: slot.end,
                    index,
                });
            }
        }
    }

    lanes.sort_by_key(|lane| (lane.start, lane.field_id, lane.index));
    lanes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{FieldSpec, SlotSpec, TeamPool};

    fn slot(start: i64, end: i64, concurrency: u8) -> SlotSpec {
        SlotSpec {
            start,
            end,
            concurrency,
        }
    }

    #[test]
    fn expansion_respects_capacity_and_order() {
        let request = ScheduleRequest {
            unique_id: 1,
            pools: vec![TeamPool::new([1, 2])],
            fields: vec![
                FieldSpec {
                    id: 20,
                    slots: vec![slot(100, 200, 1)],
                },
                FieldSpec {
                    id: 10,
                    slots: vec![slot(100, 200, 2), slot(300, 400, 1)],
                },
            ],
            conflicts: vec![],
            is_practice: false,
        };

        let lanes = expand_lanes(&request);
        assert_eq!(lanes.len(), 4);

        // Sorted by (start, field, lane): field 10 comes before field 20
        // at the shared start time, then the later slot.
        assert_eq!(
            lanes
                .iter()
                .map(|l| (l.start, l.field_id, l.index))
                .collect::<Vec<_>>(),
            vec![(100, 10, 0), (100, 10, 1), (100, 20, 0), (300, 10, 0)]
        );
    }

    #[test]
    fn lane_window_overlap_is_half_open() {
        let lane = Lane {
            field_id: 1,
            start: 100,
            end: 200,
            index: 0,
        };

        assert!(lane.overlaps_window(150, 250));
        assert!(!lane.overlaps_window(200, 300));
        assert!(!lane.overlaps_window(0, 100));
    }
}
