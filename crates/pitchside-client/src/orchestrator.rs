//! End-to-end schedule generation.
//!
//! Drives one user action: analyze, build payloads, stream them to the
//! scheduler, persist the result atomically, and surface diagnostics
//! for anything the engine could not place.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use pitchside_core::{Schedule, SeasonPhase, TargetId, TimeWindow};
use pitchside_proto::scheduling::ScheduledOutput;
use pitchside_report::{
    AnalysisContext, Payload, PayloadBuilder, PayloadOptions, PreScheduleReport, ReportInput,
};
use pitchside_store::{EntityStore, NewScheduleGame};
use tracing::{info, warn};

use crate::client::ScheduleTransport;
use crate::error::OrchestratorError;

/// Options for one schedule-generation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunOptions {
    /// How many times each eligible pair meets, `1..=7`.
    pub matches_to_play: u8,
    /// Whether matches may cross region boundaries.
    pub interregional: bool,
    /// Also generate the post-season phase from leftover slots.
    pub include_post_phase: bool,
}

/// A payload whose response booked fewer reservations than requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnplacedDiagnostic {
    pub target_id: TargetId,
    pub phase: SeasonPhase,
    pub expected: usize,
    pub received: usize,
}

impl UnplacedDiagnostic {
    /// The number of pairings that never found a lane.
    #[must_use]
    pub fn unplaced(&self) -> usize {
        self.expected.saturating_sub(self.received)
    }
}

/// The outcome of a successful run.
#[derive(Clone, Debug)]
pub struct RunOutcome {
    pub schedule: Schedule,
    pub report: PreScheduleReport,
    pub diagnostics: Vec<UnplacedDiagnostic>,
}

/// Drives analyzer, builder, stream, and persistence for one request.
pub struct Orchestrator<T> {
    store: Arc<dyn EntityStore>,
    transport: T,
    cooldown: Duration,
    last_run: Mutex<Option<Instant>>,
}

impl<T: ScheduleTransport> Orchestrator<T> {
    #[must_use]
    pub fn new(store: Arc<dyn EntityStore>, transport: T, cooldown: Duration) -> Self {
        Self {
            store,
            transport,
            cooldown,
            last_run: Mutex::new(None),
        }
    }

    fn check_cooldown(&self) -> Result<(), OrchestratorError> {
        let last_run = self.last_run.lock();
        if let Some(last) = *last_run {
            let elapsed = last.elapsed();
            if elapsed < self.cooldown {
                let remaining = self.cooldown - elapsed;
                return Err(OrchestratorError::CooldownActive {
                    remaining_ms: remaining.as_millis() as u64,
                });
            }
        }
        Ok(())
    }

    /// Runs the full pipeline and persists a new schedule.
    pub async fn run(
        &self,
        authorization_token: &str,
        options: RunOptions,
    ) -> Result<RunOutcome, OrchestratorError> {
        self.check_cooldown()?;

        let ctx = AnalysisContext::gather(&*self.store).await?;

        let report = PreScheduleReport::new(
            &ctx,
            &ReportInput {
                matches_to_play: options.matches_to_play,
                interregional: options.interregional,
                total_matches_supplied: None,
            },
        )?;

        if report.has_blocking_findings() {
            warn!(
                duplicates = report.target_has_duplicates.len(),
                impossible = report.impossible_targets.len(),
                undersupplied = report.undersupplied_targets().len(),
                "aborting schedule run on analyzer findings"
            );
            return Err(OrchestratorError::Preflight(Box::new(report)));
        }

        let mut builder = PayloadBuilder::new();
        let mut payloads = builder.build(
            &ctx,
            &report,
            PayloadOptions {
                matches_to_play: options.matches_to_play,
                interregional: options.interregional,
                phase: SeasonPhase::Normal,
            },
        )?;
        if options.include_post_phase {
            // The post season draws on whatever supply the normal season
            // leaves behind, so it gets its own report with the leftover
            // total injected.
            let leftover = report
                .total_matches_supplied
                .saturating_sub(report.total_matches_required);
            let post_report = PreScheduleReport::new(
                &ctx,
                &ReportInput {
                    matches_to_play: options.matches_to_play,
                    interregional: options.interregional,
                    total_matches_supplied: Some(leftover),
                },
            )?;

            if post_report.has_blocking_findings() {
                warn!(
                    duplicates = post_report.target_has_duplicates.len(),
                    impossible = post_report.impossible_targets.len(),
                    undersupplied = post_report.undersupplied_targets().len(),
                    "aborting schedule run on post-season analyzer findings"
                );
                return Err(OrchestratorError::Preflight(Box::new(post_report)));
            }

            payloads.extend(builder.build(
                &ctx,
                &post_report,
                PayloadOptions {
                    matches_to_play: options.matches_to_play,
                    interregional: options.interregional,
                    phase: SeasonPhase::Post,
                },
            )?);
        }

        info!(payloads = payloads.len(), "sending scheduling payloads");

        let inputs = payloads.iter().map(|p| p.input.clone()).collect();
        let outputs = self
            .transport
            .schedule(inputs, authorization_token)
            .await?;

        let outputs_by_id: BTreeMap<u32, &ScheduledOutput> =
            outputs.iter().map(|o| (o.unique_id, o)).collect();

        // Persist everything the stream booked as one schedule.
        let mut games = Vec::new();
        for output in &outputs {
            for reservation in &output.time_slots {
                let field_id = reservation
                    .field
                    .as_ref()
                    .map(|f| f.unique_id)
                    .ok_or_else(|| {
                        OrchestratorError::MalformedReservation("reservation without a field".into())
                    })?;
                let field_id = i32::try_from(field_id).map_err(|_| {
                    OrchestratorError::MalformedReservation(format!(
                        "field id {field_id} out of range"
                    ))
                })?;

                let window = TimeWindow::from_millis(reservation.start, reservation.end)
                    .map_err(|e| OrchestratorError::MalformedReservation(e.to_string()))?;

                let booking = reservation.booking.as_ref().ok_or_else(|| {
                    OrchestratorError::MalformedReservation("reservation without a booking".into())
                })?;

                let team_id = |team: &Option<pitchside_proto::Team>| {
                    team.as_ref().map(|t| t.unique_id as i32)
                };

                // Practices come over the wire with the team on both
                // sides; persist them as single-team rows.
                let away_team = if reservation.is_practice() {
                    None
                } else {
                    team_id(&booking.away_team)
                };

                games.push(NewScheduleGame {
                    field_id,
                    window,
                    home_team: team_id(&booking.home_team),
                    away_team,
                });
            }
        }

        let schedule = self.store.save_schedule(games).await?;

        // Anything the engine dropped shows up as a shortfall between
        // what a payload asked for and what came back.
        let diagnostics = unplaced_diagnostics(&payloads, &outputs_by_id);
        for diagnostic in &diagnostics {
            warn!(
                target = diagnostic.target_id,
                phase = ?diagnostic.phase,
                unplaced = diagnostic.unplaced(),
                "some pairings could not be placed"
            );
        }

        *self.last_run.lock() = Some(Instant::now());

        Ok(RunOutcome {
            schedule,
            report,
            diagnostics,
        })
    }
}

fn unplaced_diagnostics(
    payloads: &[Payload],
    outputs_by_id: &BTreeMap<u32, &ScheduledOutput>,
) -> Vec<UnplacedDiagnostic> {
    payloads
        .iter()
        .filter_map(|payload| {
            let expected = payload.expected_reservations();
            let received = outputs_by_id
                .get(&payload.input.unique_id)
                .map_or(0, |output| output.time_slots.len());

            (received < expected).then_some(UnplacedDiagnostic {
                target_id: payload.target_id,
                phase: payload.phase,
                expected,
                received,
            })
        })
        .collect()
}
