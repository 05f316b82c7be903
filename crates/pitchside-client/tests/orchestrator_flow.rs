//! Orchestrator flow against the in-memory store and a stub scheduler.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use pitchside_client::{
    ClientError, Orchestrator, OrchestratorError, RunOptions, ScheduleTransport,
};
use pitchside_core::TimeWindow;
use pitchside_proto::scheduling::{self as proto, ScheduledInput, ScheduledOutput};
use pitchside_store::{
    CreateField, CreateRegion, CreateReservationType, CreateTeam, CreateTimeSlot, EntityStore,
    MembershipOp, MemoryStore, TargetGroupOp,
};

/// Books pairings greedily into the payload's slots, stopping after
/// `limit` reservations per input. `usize::MAX` books everything the
/// slots allow.
struct GreedyBooker {
    limit: usize,
}

#[async_trait]
impl ScheduleTransport for GreedyBooker {
    async fn schedule(
        &self,
        inputs: Vec<ScheduledInput>,
        _authorization_token: &str,
    ) -> Result<Vec<ScheduledOutput>, ClientError> {
        Ok(inputs
            .iter()
            .map(|input| {
                let mut lanes = input
                    .fields
                    .iter()
                    .flat_map(|field| {
                        field
                            .time_slots
                            .iter()
                            .map(move |slot| (field.clone(), slot.clone()))
                    })
                    .collect::<Vec<_>>()
                    .into_iter();

                let mut time_slots = Vec::new();
                'booking: for collection in &input.team_groups {
                    for i in 0..collection.teams.len() {
                        for j in (i + 1)..collection.teams.len() {
                            if time_slots.len() >= self.limit {
                                break 'booking;
                            }
                            let Some((field, slot)) = lanes.next() else {
                                break 'booking;
                            };
                            time_slots.push(proto::Reservation {
                                field: Some(field),
                                start: slot.start,
                                end: slot.end,
                                booking: Some(proto::reservation::Booked {
                                    home_team: Some(collection.teams[i].clone()),
                                    away_team: Some(collection.teams[j].clone()),
                                }),
                            });
                        }
                    }
                }

                ScheduledOutput {
                    unique_id: input.unique_id,
                    time_slots,
                }
            })
            .collect())
    }
}

/// Seeds one region, four teams in one group, and `slot_count` slots.
async fn seeded_store(slot_count: i64) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());

    let region = store
        .create_region(CreateRegion {
            title: "North".into(),
        })
        .await
        .unwrap();
    let field = store
        .create_field(CreateField {
            name: "Memorial Park".into(),
            region_id: region.id,
        })
        .await
        .unwrap();
    let reservation_type = store
        .create_reservation_type(CreateReservationType {
            name: "u10".into(),
            color: "#336699".into(),
            description: None,
            default_concurrency: 1,
            is_practice: false,
        })
        .await
        .unwrap();
    let group = store.create_group("u10".into()).await.unwrap();

    for i in 0..4 {
        store
            .create_team(CreateTeam {
                name: format!("team {i}"),
                region_id: region.id,
                group_ids: vec![group.id],
            })
            .await
            .unwrap();
    }

    for i in 0..slot_count {
        let start = Utc.with_ymd_and_hms(2025, 4, 5, 8, 0, 0).unwrap()
            + chrono::TimeDelta::hours(i * 2);
        store
            .create_time_slot(CreateTimeSlot {
                field_id: field.id,
                reservation_type_id: reservation_type.id,
                window: TimeWindow::new(start, start + chrono::TimeDelta::hours(2)).unwrap(),
            })
            .await
            .unwrap();
    }

    let target = store.create_target().await.unwrap();
    store
        .target_group_op(TargetGroupOp {
            target_id: target.id,
            group_id: group.id,
            op: MembershipOp::Add,
        })
        .await
        .unwrap();
    store
        .set_target_reservation_type(target.id, Some(reservation_type.id))
        .await
        .unwrap();

    store
}

fn options() -> RunOptions {
    RunOptions {
        matches_to_play: 1,
        interregional: false,
        include_post_phase: false,
    }
}

#[tokio::test]
async fn full_run_persists_a_schedule() {
    let store = seeded_store(6).await;
    let orchestrator = Orchestrator::new(
        store.clone(),
        GreedyBooker { limit: usize::MAX },
        Duration::ZERO,
    );

    let outcome = orchestrator.run("token", options()).await.unwrap();

    assert!(outcome.diagnostics.is_empty());
    assert_eq!(outcome.report.total_matches_required, 6);

    let games = store.list_schedule_games(outcome.schedule.id).await.unwrap();
    assert_eq!(games.len(), 6);
    assert!(games.iter().all(|g| g.home_team.is_some() && g.away_team.is_some()));
}

#[tokio::test]
async fn shortfall_is_surfaced_as_diagnostics() {
    let store = seeded_store(6).await;
    let orchestrator = Orchestrator::new(store.clone(), GreedyBooker { limit: 4 }, Duration::ZERO);

    let outcome = orchestrator.run("token", options()).await.unwrap();

    assert_eq!(outcome.diagnostics.len(), 1);
    let diagnostic = outcome.diagnostics[0];
    assert_eq!(diagnostic.expected, 6);
    assert_eq!(diagnostic.received, 4);
    assert_eq!(diagnostic.unplaced(), 2);

    // The partial schedule is still persisted.
    let games = store.list_schedule_games(outcome.schedule.id).await.unwrap();
    assert_eq!(games.len(), 4);
}

#[tokio::test]
async fn undersupply_aborts_before_streaming() {
    // Two slots cannot host six required matches.
    let store = seeded_store(2).await;
    let orchestrator = Orchestrator::new(
        store.clone(),
        GreedyBooker { limit: usize::MAX },
        Duration::ZERO,
    );

    let err = orchestrator.run("token", options()).await.unwrap_err();
    let OrchestratorError::Preflight(report) = err else {
        panic!("expected a preflight abort, got {err:?}");
    };
    assert_eq!(report.undersupplied_targets().len(), 1);

    // Nothing was persisted.
    assert!(store.list_schedules().await.unwrap().is_empty());
}

#[tokio::test]
async fn post_phase_runs_on_leftover_supply() {
    // The normal season needs all six slots, so the post season starts
    // with nothing: its payload carries no fields and every post pairing
    // surfaces as a diagnostic.
    let store = seeded_store(6).await;
    let orchestrator = Orchestrator::new(
        store.clone(),
        GreedyBooker { limit: usize::MAX },
        Duration::ZERO,
    );

    let outcome = orchestrator
        .run(
            "token",
            RunOptions {
                include_post_phase: true,
                ..options()
            },
        )
        .await
        .unwrap();

    // The normal phase booked everything it asked for.
    let games = store.list_schedule_games(outcome.schedule.id).await.unwrap();
    assert_eq!(games.len(), 6);

    assert_eq!(outcome.diagnostics.len(), 1);
    let diagnostic = outcome.diagnostics[0];
    assert_eq!(diagnostic.phase, pitchside_core::SeasonPhase::Post);
    assert_eq!(diagnostic.expected, 6);
    assert_eq!(diagnostic.received, 0);
}

#[tokio::test]
async fn cooldown_blocks_rapid_reruns() {
    let store = seeded_store(6).await;
    let orchestrator = Orchestrator::new(
        store,
        GreedyBooker { limit: usize::MAX },
        Duration::from_secs(30),
    );

    orchestrator.run("token", options()).await.unwrap();

    let err = orchestrator.run("token", options()).await.unwrap_err();
    assert!(matches!(err, OrchestratorError::CooldownActive { .. }));
}
