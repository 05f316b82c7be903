//! Wire to engine conversions.
//!
//! Wire ids are unsigned; the engine works on the signed ids of the
//! store. Requests carrying ids outside the signed range are rejected as
//! malformed rather than crashing the stream task.

use std::collections::BTreeMap;

use pitchside_engine as engine;
use pitchside_proto::scheduling as proto;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    #[error("id {0} does not fit a signed 32-bit store id")]
    IdOutOfRange(u32),

    #[error("concurrency {0} does not fit an 8-bit lane count")]
    ConcurrencyOutOfRange(u32),
}

fn store_id(id: u32) -> Result<i32, ConvertError> {
    id.try_into().map_err(|_| ConvertError::IdOutOfRange(id))
}

/// Converts a wire input into an engine request, plus the original
/// fields keyed by id so reservations can echo them back.
pub fn request_from_wire(
    input: &proto::ScheduledInput,
) -> Result<(engine::ScheduleRequest, BTreeMap<i32, proto::Field>), ConvertError> {
    let mut pools = Vec::with_capacity(input.team_groups.len());
    for collection in &input.team_groups {
        let mut teams = Vec::with_capacity(collection.teams.len());
        for team in &collection.teams {
            teams.push(engine::Team {
                id: store_id(team.unique_id)?,
            });
        }
        pools.push(engine::TeamPool { teams });
    }

    let mut fields = Vec::with_capacity(input.fields.len());
    let mut field_index = BTreeMap::new();
    for field in &input.fields {
        let id = store_id(field.unique_id)?;
        let mut slots = Vec::with_capacity(field.time_slots.len());
        for slot in &field.time_slots {
            let concurrency: u8 = slot
                .concurrency
                .try_into()
                .map_err(|_| ConvertError::ConcurrencyOutOfRange(slot.concurrency))?;
            slots.push(engine::SlotSpec {
                start: slot.start,
                end: slot.end,
                concurrency,
            });
        }
        fields.push(engine::FieldSpec { id, slots });
        field_index.insert(id, field.clone());
    }

    let mut conflicts = Vec::with_capacity(input.coach_conflicts.len());
    for conflict in &input.coach_conflicts {
        let mut team_ids = Vec::with_capacity(conflict.teams.len());
        for team in &conflict.teams {
            team_ids.push(store_id(team.unique_id)?);
        }
        conflicts.push(engine::ConflictSpec {
            id: store_id(conflict.unique_id)?,
            region_id: store_id(conflict.region_id)?,
            team_ids,
        });
    }

    Ok((
        engine::ScheduleRequest {
            unique_id: input.unique_id,
            pools,
            fields,
            conflicts,
            is_practice: input.is_practice,
        },
        field_index,
    ))
}

fn wire_team(team: engine::Team) -> proto::Team {
    proto::Team {
        // Engine team ids came from the wire, so the round trip is safe.
        unique_id: team.id.unsigned_abs(),
    }
}

/// Converts an engine result back to the wire, echoing each
/// reservation's field from the request.
pub fn result_to_wire(
    result: engine::ScheduleResult,
    field_index: &BTreeMap<i32, proto::Field>,
) -> proto::ScheduledOutput {
    let time_slots = result
        .reservations
        .into_iter()
        .map(|reservation| {
            let (home, away) = match reservation.booking {
                engine::Booking::Game { home, away } => (home, away),
                engine::Booking::Practice { team } => (team, team),
            };

            proto::Reservation {
                field: field_index.get(&reservation.field_id).cloned(),
                start: reservation.start,
                end: reservation.end,
                booking: Some(proto::reservation::Booked {
                    home_team: Some(wire_team(home)),
                    away_team: Some(wire_team(away)),
                }),
            }
        })
        .collect();

    proto::ScheduledOutput {
        unique_id: result.unique_id,
        time_slots,
    }
}
