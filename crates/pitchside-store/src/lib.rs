//! Pitchside entity store facade.
//!
//! The [`EntityStore`] trait is the narrow contract every higher layer
//! consumes: reads over regions, fields, teams, groups, targets,
//! reservation types, time slots, and coach conflicts, plus the
//! mutations the editor drives. [`MemoryStore`] implements it fully in
//! memory and backs both tests and profile isolation; the SQL-backed
//! store in the deployed desktop app sits behind the same trait.
//!
//! Time-slot mutations delegate to the calendar algebra in
//! `pitchside-core`, so the non-overlap invariant holds at every step no
//! matter which backend is in use.

pub mod error;
pub mod inputs;
pub mod memory;
pub mod profile;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use inputs::{
    CoachConflictTeamOp, CopyTimeSlots, CreateCoachConflict, CreateField, CreateRegion,
    CreateReservationType, CreateTeam, CreateTimeSlot, EditRegion, EditReservationType,
    EditSchedule, EditTeam, MembershipOp, MoveTimeSlot, NewScheduleGame, TargetGroupOp,
};
pub use memory::MemoryStore;
pub use profile::{ProfileManager, DEFAULT_PROFILE};
pub use traits::EntityStore;
