//! Wire protocol for the Pitchside scheduling service.
//!
//! The protobuf schema lives in `proto/scheduling.proto` and its field
//! tags are frozen; both the desktop client and the hosted scheduler
//! decode these messages. Instants travel as milliseconds since the
//! epoch; practice reservations carry the same team as both home and
//! away.

pub mod scheduling {
    tonic::include_proto!("scheduling");
}

pub use scheduling::scheduler_client::SchedulerClient;
pub use scheduling::scheduler_server::{Scheduler, SchedulerServer};
pub use scheduling::{
    reservation, CoachConflict, Field, PlayableTeamCollection, Reservation, ScheduledInput,
    ScheduledOutput, Team, TimeSlot,
};

/// The fully-qualified service name, as used by health checks.
pub const SCHEDULER_SERVICE_NAME: &str = "scheduling.Scheduler";

impl Reservation {
    /// True when this reservation books a single-team practice.
    #[must_use]
    pub fn is_practice(&self) -> bool {
        self.booking
            .as_ref()
            .is_some_and(|b| b.home_team == b.away_team && b.home_team.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn practice_detection() {
        let team = Some(Team { unique_id: 4 });
        let practice = Reservation {
            field: None,
            start: 0,
            end: 1,
            booking: Some(reservation::Booked {
                home_team: team.clone(),
                away_team: team,
            }),
        };
        assert!(practice.is_practice());

        let game = Reservation {
            field: None,
            start: 0,
            end: 1,
            booking: Some(reservation::Booked {
                home_team: Some(Team { unique_id: 4 }),
                away_team: Some(Team { unique_id: 5 }),
            }),
        };
        assert!(!game.is_practice());

        let empty = Reservation {
            field: None,
            start: 0,
            end: 1,
            booking: None,
        };
        assert!(!empty.is_practice());
    }
}
