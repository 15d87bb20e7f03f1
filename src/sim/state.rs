//! Simulation state
//!
//! One owned context for everything the tick pipeline mutates. The physics
//! world and the analytics sink are collaborators passed in per call.

use std::collections::BTreeSet;

use glam::Vec2;

use super::bar::Bar;
use super::board::Board;
use super::cycle::{CycleController, CycleState};
use super::deviation::DeviationMonitor;
use super::heat::HeatAccumulator;
use super::ledger::BallLedger;
use super::physics::{BodyHandle, BodyKind, PhysicsWorld};
use super::slots::SlotRegistry;
use super::spawner::Spawner;
use crate::error::SimError;
use crate::tuning::Tuning;

#[derive(Debug, Clone)]
pub struct SimulationState {
    pub tuning: Tuning,
    pub registry: SlotRegistry,
    pub ledger: BallLedger,
    pub cycle: CycleController,
    pub deviation: DeviationMonitor,
    pub heat: HeatAccumulator,
    pub spawner: Spawner,
    pub bar: Bar,
    /// Static pegs, in layout order
    pub pegs: Vec<BodyHandle>,
    /// Pegs whose collision response is switched off
    pub disabled_pegs: BTreeSet<BodyHandle>,
    /// Physics ticks processed
    pub ticks: u64,
}

impl SimulationState {
    /// Build the board in `world` and set up a fresh cycle at `now_ms`
    pub fn new<W: PhysicsWorld + ?Sized>(
        world: &mut W,
        tuning: Tuning,
        seed: u64,
        now_ms: f64,
    ) -> Result<Self, SimError> {
        let board = Board::build(world, &tuning)?;
        Ok(Self {
            registry: board.registry,
            ledger: BallLedger::new(),
            cycle: CycleController::new(
                now_ms,
                tuning.batch_size,
                tuning.holding_time_ms,
                tuning.collection_timeout_ms,
            ),
            deviation: DeviationMonitor::new(tuning.deviation_threshold_pct),
            heat: HeatAccumulator::new(&tuning),
            spawner: Spawner::new(
                tuning.batch_size,
                tuning.spawn_interval_ms,
                tuning.spawn_jitter,
                now_ms,
                seed,
            ),
            bar: board.bar,
            pegs: board.pegs,
            disabled_pegs: BTreeSet::new(),
            ticks: 0,
            tuning,
        })
    }

    pub fn cycle_state(&self) -> CycleState {
        self.cycle.state()
    }

    /// Find the peg under a point (e.g. a click)
    pub fn peg_at<W: PhysicsWorld + ?Sized>(&self, world: &W, point: Vec2) -> Option<BodyHandle> {
        self.pegs.iter().copied().find(|&peg| {
            world
                .body(peg)
                .is_some_and(|b| b.kind == BodyKind::Peg && b.position.distance(point) <= b.shape.half_extents().x)
        })
    }

    /// Toggle a peg's collision response. Returns true if the peg is now disabled.
    pub fn toggle_peg<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W, peg: BodyHandle) -> Result<bool, SimError> {
        let body = world
            .body_mut(peg)
            .filter(|b| b.kind == BodyKind::Peg)
            .ok_or(SimError::UnknownBody { handle: peg })?;

        let disabled = if self.disabled_pegs.remove(&peg) {
            body.collides = true;
            false
        } else {
            let _ = self.disabled_pegs.insert(peg);
            body.collides = false;
            true
        };
        log::debug!("Peg {} {}", peg, if disabled { "disabled" } else { "enabled" });
        Ok(disabled)
    }

    /// Clear heat data and every deviation warning. Counts are untouched.
    pub fn reset_overlays<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W) {
        self.deviation.clear(world);
        self.heat.reset();
        log::info!("Heat map and warnings reset");
    }
}
