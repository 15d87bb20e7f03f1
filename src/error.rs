//! Error types
//!
//! Nothing here is fatal to the tick loop: simulation errors are logged by the
//! caller and the remaining tick stages still run.

use thiserror::Error;

use crate::sim::physics::BodyHandle;
use crate::sim::slots::SlotId;

/// Errors raised while loading or validating [`crate::Tuning`]
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value for `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Errors raised by the simulation core
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SimError {
    /// A slot's sensor body could not be resolved in the physics world
    #[error("no body found for slot {slot}")]
    MissingSlotBody { slot: SlotId },
    /// Board layout produced no slots
    #[error("board layout produced no slots")]
    NoSlots,
    /// A body handle did not resolve
    #[error("unknown body {handle}")]
    UnknownBody { handle: BodyHandle },
}
