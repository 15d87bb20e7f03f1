//! Simulation core
//!
//! Cycle state machine and slot statistics. This module must stay
//! deterministic:
//! - Explicit `now_ms` timestamps only, no wall clock
//! - Seeded RNG only
//! - Stable iteration order (by body handle or slot id)
//! - Physics is reached only through [`PhysicsWorld`]

pub mod bar;
pub mod board;
pub mod collision;
pub mod cycle;
pub mod deviation;
pub mod heat;
pub mod ledger;
pub mod physics;
pub mod probability;
pub mod slots;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod world;

pub use bar::{Bar, BarAnimation, ease_in_out};
pub use board::Board;
pub use collision::{CollisionResult, ball_shape_collision, bounce_velocity, damp_tangent};
pub use cycle::{CycleController, CycleInputs, CycleState, Transition, Trigger};
pub use deviation::{DeviationMonitor, DeviationReport, SlotDeviation, slot_deviations};
pub use heat::{HeatAccumulator, HeatCell, HeatSample};
pub use ledger::{BallLedger, TickCounts};
pub use physics::{Aabb, Body, BodyHandle, BodyKind, BodyOptions, PhysicsWorld, Shape};
pub use probability::{binomial_coefficient, expected_distribution, slot_weight};
pub use slots::{Slot, SlotId, SlotLayout, SlotRegistry, SlotRow, SlotSnapshot};
pub use spawner::Spawner;
pub use state::SimulationState;
pub use tick::{TickReport, frame, spawn, tick};
pub use world::SimpleWorld;
