//! Per-tick pipeline
//!
//! Runs after each physics step, in a fixed order: counts, cycle, heat,
//! stale-body pruning. The bar animation and the spawn timer are driven by
//! their own clocks through [`frame`] and [`spawn`].

use super::cycle::{CycleInputs, CycleState, Transition, Trigger};
use super::ledger::TickCounts;
use super::physics::{BodyHandle, BodyKind, PhysicsWorld};
use super::slots::SlotId;
use super::state::SimulationState;
use crate::analytics::AnalyticsRecorder;
use crate::consts::PRUNE_CUTOFF_Y;
use crate::error::SimError;

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub counts: TickCounts,
    pub transition: Option<Transition>,
    /// Slots flagged by the deviation check on this tick
    pub newly_flagged: Vec<SlotId>,
    /// Non-fatal failures from the deviation check
    pub deviation_errors: Vec<SimError>,
    /// Bodies removed for falling off the board
    pub pruned: Vec<BodyHandle>,
}

/// Advance the statistics engine by one physics tick
pub fn tick<W, R>(state: &mut SimulationState, world: &mut W, recorder: &mut R, now_ms: f64) -> TickReport
where
    W: PhysicsWorld + ?Sized,
    R: AnalyticsRecorder + ?Sized,
{
    let mut report = TickReport::default();

    // Counts
    let releasing = state.cycle.state() == CycleState::Releasing;
    report.counts = state.ledger.recount(world, &mut state.registry, releasing);
    recorder.publish_slot_snapshot(&state.registry.snapshot());

    // Cycle
    let inputs = CycleInputs {
        now_ms,
        current_ball_count: report.counts.current_ball_count,
        bar_restored: state.bar.is_restored(),
    };
    if let Some(transition) = state.cycle.evaluate(&inputs) {
        apply_transition(state, world, recorder, &transition, now_ms, &mut report);
        report.transition = Some(transition);
    }

    // Heat
    let balls: Vec<_> = world
        .handles()
        .into_iter()
        .filter_map(|h| world.body(h))
        .filter(|b| b.kind == BodyKind::Ball)
        .map(|b| b.position)
        .collect();
    state.heat.update(balls);

    // Stale bodies
    report.pruned = prune_stale(world);
    for &ball in &report.pruned {
        state.ledger.forget(ball);
    }

    state.ticks += 1;
    report
}

fn apply_transition<W, R>(
    state: &mut SimulationState,
    world: &mut W,
    recorder: &mut R,
    transition: &Transition,
    now_ms: f64,
    report: &mut TickReport,
) where
    W: PhysicsWorld + ?Sized,
    R: AnalyticsRecorder + ?Sized,
{
    let bar_ms = state.tuning.bar_transition_ms;

    match transition.trigger {
        Trigger::BatchCollected => {}
        Trigger::CollectionTimeout { lost_balls } => {
            log::warn!("Collection timed out, {} balls lost", lost_balls);
            recorder.publish_lost_balls(lost_balls);
            state.bar.narrow(bar_ms, now_ms);
        }
        Trigger::HoldElapsed => {
            let deviations = state
                .deviation
                .check(&state.registry, state.ledger.total_counted(), world);
            report.newly_flagged = deviations.newly_flagged;
            report.deviation_errors = deviations.errors;
            state.bar.narrow(bar_ms, now_ms);
        }
        Trigger::Drained => state.bar.widen(bar_ms, now_ms),
        Trigger::BarRestored => state.spawner.refill(state.cycle.batch_size()),
    }

    log::info!(
        "State changed: {} -> {} (after {:.0}ms)",
        transition.from,
        transition.to,
        transition.duration_ms
    );
    recorder.publish_state_transition(transition.from, transition.to, transition.duration_ms);
}

/// Remove every dynamic body below the cutoff line
fn prune_stale<W: PhysicsWorld + ?Sized>(world: &mut W) -> Vec<BodyHandle> {
    let stale: Vec<_> = world
        .handles()
        .into_iter()
        .filter(|&h| {
            world
                .body(h)
                .is_some_and(|b| !b.is_static && b.position.y > PRUNE_CUTOFF_Y)
        })
        .collect();

    for &handle in &stale {
        let _ = world.remove_body(handle);
    }
    if !stale.is_empty() {
        log::debug!("Pruned {} stale bodies", stale.len());
    }
    stale
}

/// Display frame: advance the bar animation. Returns true when it finished.
pub fn frame<W: PhysicsWorld + ?Sized>(state: &mut SimulationState, world: &mut W, now_ms: f64) -> bool {
    state.bar.advance_frame(world, now_ms)
}

/// Spawn timer: release balls while quota remains
pub fn spawn<W: PhysicsWorld + ?Sized>(state: &mut SimulationState, world: &mut W, now_ms: f64) -> Vec<BodyHandle> {
    state.spawner.poll(world, now_ms)
}
