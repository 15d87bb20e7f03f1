//! Plinko Lab - A ball drop board with live slot statistics
//!
//! Core modules:
//! - `sim`: Tick-driven simulation core (cycle state machine, slot ledger, heat, deviations)
//! - `analytics`: Cycle history and chart series for an external dashboard
//! - `tuning`: Data-driven cycle and heat parameters
//! - `settings`: User-facing view preferences

pub mod analytics;
pub mod error;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use analytics::{AnalyticsRecorder, CycleHistory};
pub use error::{SimError, TuningError};
pub use settings::Settings;
pub use tuning::Tuning;

/// Board configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, matches a typical display refresh)
    pub const SIM_DT_MS: f64 = 1000.0 / 60.0;
    /// Physics substeps per tick (keeps fast balls from tunnelling through the bar)
    pub const PHYSICS_SUBSTEPS: u32 = 4;

    /// Canvas height
    pub const CANVAS_HEIGHT: f32 = 750.0;
    /// Dynamic bodies below this line are pruned
    pub const PRUNE_CUTOFF_Y: f32 = CANVAS_HEIGHT + 100.0;

    /// Gravity (pixels/s², +y points down)
    pub const GRAVITY: f32 = 1000.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 4.0;
    pub const BALL_RESTITUTION: f32 = 0.5;
    /// Spawn point (jitter is added from tuning)
    pub const SPAWN_X: f32 = 200.0;
    pub const SPAWN_Y: f32 = 100.0;

    /// Peg lattice
    pub const PEG_WIDTH: f32 = 17.5;
    pub const PEG_R: f32 = PEG_WIDTH / 2.0;
    /// Hexagon inradius
    pub const PEG_INNER_R: f32 = PEG_R * 0.866_025_4;
    pub const PEG_ROWS: u32 = 11;
    pub const PEG_COLS: u32 = 11;
    pub const PEG_START_X: f32 = 198.0;
    pub const PEG_START_Y: f32 = 202.0;
    pub const PEG_RESTITUTION: f32 = 0.5;

    /// Divider and slot height
    pub const DIVIDER_HEIGHT: f32 = 100.0;

    /// Bottom bar
    pub const BAR_FULL_WIDTH: f32 = 320.0;
    pub const BAR_SLIM_WIDTH: f32 = 5.0;
    pub const BAR_HEIGHT: f32 = 20.0;
    pub const BAR_X: f32 = 200.0;
    pub const BAR_Y: f32 = 575.0;

    /// Funnel frame: a hopper over the top peg and walls along both lattice edges
    pub const FRAME_THICKNESS: f32 = 2.0;
    /// Distance from the outer peg centres to the frame wall centre line
    pub const FRAME_CLEARANCE: f32 = 10.5;
    /// Where the hopper meets the edge walls, measured down the edge from the top peg
    pub const FRAME_JOINT: f32 = 18.0;
    /// How far the edge walls run past the bottom outer pegs
    pub const FRAME_TAIL: f32 = 8.0;
    pub const HOPPER_HALF_WIDTH: f32 = 55.0;
    pub const HOPPER_TOP_Y: f32 = 150.0;

    /// Share of tangential velocity lost on each contact
    pub const CONTACT_FRICTION: f32 = 0.05;

    /// Warning marker size and offset below the slot top
    pub const WARNING_SIZE: f32 = 20.0;
    pub const WARNING_OFFSET_Y: f32 = 50.0;
}

use glam::Vec2;

/// Lattice offsets along the 60° (row) and 120° (column) axes of the peg grid
#[inline]
pub fn lattice_offsets() -> (Vec2, Vec2) {
    use std::f32::consts::PI;
    let step = consts::PEG_INNER_R * 4.0;
    let row = Vec2::new((PI / 3.0).cos(), (PI / 3.0).sin()) * step;
    let col = Vec2::new((2.0 * PI / 3.0).cos(), (2.0 * PI / 3.0).sin()) * step;
    (row, col)
}

/// Percentage of `part` in `whole`, 0.0 when `whole` is zero
#[inline]
pub fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
