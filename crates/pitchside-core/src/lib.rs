//! Pitchside core - domain model and time-slot calendar algebra.
//!
//! This crate holds the pure building blocks shared by every other
//! component:
//!
//! - **Domain entities**: regions, fields, teams, groups, reservation
//!   types, targets, coach conflicts, schedules
//! - **Time windows**: half-open `[start, end)` intervals with overlap
//!   detection
//! - **Calendar algebra**: per-field slot sets with overlap-checked
//!   insert/move, transactional batch copy, and batch delete
//! - **Validation**: the shared name and profile-name rules
//!
//! Nothing in here is async and nothing touches a database; the store
//! facade and the services build on top of these types.

pub mod calendar;
pub mod error;
pub mod types;
pub mod validate;
pub mod window;

pub use calendar::{CalendarSlot, ConcurrencyTable, FieldCalendar};
pub use error::{CalendarError, NameError, ProfileNameError, WindowError};
pub use types::{
    CoachConflict, Field, FieldId, GroupId, Region, RegionId, ReservationType, ReservationTypeId,
    Schedule, ScheduleGame, ScheduleId, SeasonPhase, SlotId, Target, TargetId, Team, TeamGroup,
    TeamId, TimeSlot,
};
pub use validate::{validate_name, validate_profile_name, MAX_NAME_LEN};
pub use window::TimeWindow;

/// Default per-field concurrency bounds for a reservation type.
pub const MIN_GAMES_PER_FIELD_TYPE: u8 = 1;
/// Upper bound on per-field concurrency for a reservation type.
pub const MAX_GAMES_PER_FIELD_TYPE: u8 = 8;
