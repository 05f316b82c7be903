//! Per-field slot calendars.
//!
//! A [`FieldCalendar`] owns the time slots of exactly one field and
//! enforces the non-overlap invariant through every mutation. Batch
//! operations address slots by an inclusive id range; ids inside the
//! range need not be contiguous, only present.

use std::collections::BTreeMap;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::CalendarError;
use crate::types::{FieldId, ReservationTypeId, SlotId};
use crate::window::TimeWindow;

/// One slot held by a calendar.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarSlot {
    pub id: SlotId,
    pub reservation_type_id: ReservationTypeId,
    pub window: TimeWindow,
}

/// The slot set of a single field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCalendar {
    field_id: FieldId,
    slots: BTreeMap<SlotId, CalendarSlot>,
    next_id: SlotId,
}

impl FieldCalendar {
    #[must_use]
    pub fn new(field_id: FieldId) -> Self {
        Self {
            field_id,
            slots: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Rebuilds a calendar around pre-assigned slot ids, e.g. when the
    /// store hands out ids itself.
    #[must_use]
    pub fn with_slots(field_id: FieldId, slots: impl IntoIterator<Item = CalendarSlot>) -> Self {
        let slots: BTreeMap<SlotId, CalendarSlot> =
            slots.into_iter().map(|s| (s.id, s)).collect();
        let next_id = slots.keys().next_back().map_or(1, |id| id + 1);
        Self {
            field_id,
            slots,
            next_id,
        }
    }

    pub const fn field_id(&self) -> FieldId {
        self.field_id
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, id: SlotId) -> Option<&CalendarSlot> {
        self.slots.get(&id)
    }

    /// Slots in id order.
    pub fn slots(&self) -> impl Iterator<Item = &CalendarSlot> {
        self.slots.values()
    }

    /// Returns the first stored window overlapping `window`, excluding the
    /// ids in `exclude`.
    fn find_conflict(&self, window: &TimeWindow, exclude: &[SlotId]) -> Option<&CalendarSlot> {
        self.slots
            .values()
            .find(|slot| !exclude.contains(&slot.id) && slot.window.overlaps(window))
    }

    fn conflict_error(slot: &CalendarSlot) -> CalendarError {
        CalendarError::Overlap {
            o_start: slot.window.start(),
            o_end: slot.window.end(),
        }
    }

    /// Inserts a new slot, failing with `Overlap` if any existing slot on
    /// this field intersects the window.
    pub fn insert(
        &mut self,
        window: TimeWindow,
        reservation_type_id: ReservationTypeId,
    ) -> Result<SlotId, CalendarError> {
        let id = self.next_id;
        self.insert_with_id(id, window, reservation_type_id)?;
        Ok(id)
    }

    /// Inserts under a caller-assigned id, for stores that hand out slot
    /// ids globally across fields.
    pub fn insert_with_id(
        &mut self,
        id: SlotId,
        window: TimeWindow,
        reservation_type_id: ReservationTypeId,
    ) -> Result<(), CalendarError> {
        if let Some(existing) = self.find_conflict(&window, &[]) {
            return Err(Self::conflict_error(existing));
        }

        self.next_id = self.next_id.max(id + 1);
        self.slots.insert(
            id,
            CalendarSlot {
                id,
                reservation_type_id,
                window,
            },
        );
        Ok(())
    }

    /// Moves or resizes a slot. The slot's own current window is ignored
    /// during conflict detection, so a no-op move always succeeds.
    pub fn move_slot(&mut self, id: SlotId, window: TimeWindow) -> Result<(), CalendarError> {
        if !self.slots.contains_key(&id) {
            return Err(CalendarError::SlotNotFound(id));
        }

        if let Some(existing) = self.find_conflict(&window, &[id]) {
            return Err(Self::conflict_error(existing));
        }

        // Checked above.
        if let Some(slot) = self.slots.get_mut(&id) {
            slot.window = window;
        }
        Ok(())
    }

    pub fn delete(&mut self, id: SlotId) -> Result<CalendarSlot, CalendarError> {
        self.slots.remove(&id).ok_or(CalendarError::SlotNotFound(id))
    }

    /// Copies every slot whose id lies in `first_id..=last_id`, shifted so
    /// the earliest copy starts at `dst_start`. Either every copy lands or
    /// none do; the reservation type of each source slot is preserved.
    pub fn batch_copy(
        &mut self,
        first_id: SlotId,
        last_id: SlotId,
        dst_start: chrono::DateTime<chrono::Utc>,
    ) -> Result<Vec<SlotId>, CalendarError> {
        let mut next = self.next_id;
        let created = self.batch_copy_with_ids(first_id, last_id, dst_start, || {
            let id = next;
            next += 1;
            id
        })?;
        Ok(created)
    }

    /// [`Self::batch_copy`] with caller-assigned ids for the copies.
    pub fn batch_copy_with_ids(
        &mut self,
        first_id: SlotId,
        last_id: SlotId,
        dst_start: chrono::DateTime<chrono::Utc>,
        mut alloc: impl FnMut() -> SlotId,
    ) -> Result<Vec<SlotId>, CalendarError> {
        let first = self
            .slots
            .get(&first_id)
            .ok_or(CalendarError::SlotNotFound(first_id))?;
        let last = self
            .slots
            .get(&last_id)
            .ok_or(CalendarError::SlotNotFound(last_id))?;

        if first_id > last_id || first.window.start() > last.window.start() {
            return Err(CalendarError::OutOfOrder {
                first_start: first.window.start(),
                last_start: last.window.start(),
            });
        }

        let delta: TimeDelta = dst_start - first.window.start();

        // Stage the shifted copies, sorted by start so "in order" matches
        // the calendar view rather than id allocation order.
        let mut staged: Vec<(ReservationTypeId, TimeWindow)> = self
            .slots
            .range(first_id..=last_id)
            .map(|(_, slot)| (slot.reservation_type_id, slot.window.shifted(delta)))
            .collect();
        staged.sort_by_key(|(_, window)| window.start());

        // All-or-nothing: validate every copy against the existing slot set
        // and against the other copies before inserting any of them.
        for (i, (_, window)) in staged.iter().enumerate() {
            if let Some(existing) = self.find_conflict(window, &[]) {
                return Err(Self::conflict_error(existing));
            }
            for (_, other) in &staged[..i] {
                if other.overlaps(window) {
                    return Err(CalendarError::Overlap {
                        o_start: other.start(),
                        o_end: other.end(),
                    });
                }
            }
        }

        let mut created = Vec::with_capacity(staged.len());
        for (reservation_type_id, window) in staged {
            let id = alloc();
            self.next_id = self.next_id.max(id + 1);
            self.slots.insert(
                id,
                CalendarSlot {
                    id,
                    reservation_type_id,
                    window,
                },
            );
            created.push(id);
        }
        Ok(created)
    }

    /// Deletes every slot whose id lies in the inclusive range. Returns the
    /// number of slots removed.
    pub fn batch_delete(&mut self, first_id: SlotId, last_id: SlotId) -> usize {
        if first_id > last_id {
            return 0;
        }
        let doomed: Vec<SlotId> = self.slots.range(first_id..=last_id).map(|(id, _)| *id).collect();
        for id in &doomed {
            self.slots.remove(id);
        }
        doomed.len()
    }
}

/// Resolves per-field concurrency: an override if present, otherwise the
/// reservation type's default.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcurrencyTable {
    defaults: BTreeMap<ReservationTypeId, u8>,
    overrides: BTreeMap<(FieldId, ReservationTypeId), u8>,
}

impl ConcurrencyTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_default(&mut self, reservation_type_id: ReservationTypeId, concurrency: u8) {
        self.defaults.insert(reservation_type_id, concurrency);
    }

    pub fn set_override(
        &mut self,
        field_id: FieldId,
        reservation_type_id: ReservationTypeId,
        concurrency: u8,
    ) {
        self.overrides
            .insert((field_id, reservation_type_id), concurrency);
    }

    pub fn clear_override(&mut self, field_id: FieldId, reservation_type_id: ReservationTypeId) {
        self.overrides.remove(&(field_id, reservation_type_id));
    }

    /// The effective concurrency for `(field, reservation type)`.
    #[must_use]
    pub fn capacity(&self, field_id: FieldId, reservation_type_id: ReservationTypeId) -> u8 {
        self.overrides
            .get(&(field_id, reservation_type_id))
            .or_else(|| self.defaults.get(&reservation_type_id))
            .copied()
            .unwrap_or(crate::MIN_GAMES_PER_FIELD_TYPE)
    }

    pub fn overrides(&self) -> impl Iterator<Item = (FieldId, ReservationTypeId, u8)> + '_ {
        self.overrides.iter().map(|(&(f, r), &c)| (f, r, c))
    }
}
