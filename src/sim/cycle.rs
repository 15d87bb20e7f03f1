//! Collection cycle state machine
//!
//! WAITING_FOR_COLLECTION -> HOLDING -> RELEASING -> REACTIVATING -> (repeat)
//!
//! The controller is pure: it decides transitions from counts, time and the
//! bar's settle state, and reports the trigger. The tick pipeline applies
//! side effects (deviation check, bar animation, quota refill).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Current phase of the collection cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CycleState {
    /// Bar is full width, balls are spawning and settling into slots
    WaitingForCollection,
    /// Full batch is resting on the bar
    Holding,
    /// Bar has narrowed, balls fall through and are counted
    Releasing,
    /// Bar is widening back to full width
    Reactivating,
}

impl CycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleState::WaitingForCollection => "WAITING_FOR_COLLECTION",
            CycleState::Holding => "HOLDING",
            CycleState::Releasing => "RELEASING",
            CycleState::Reactivating => "REACTIVATING",
        }
    }
}

impl fmt::Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a transition fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Current ball count reached the batch size
    BatchCollected,
    /// Collection took too long; the missing balls are lost
    CollectionTimeout { lost_balls: u32 },
    /// Hold time elapsed
    HoldElapsed,
    /// No balls left in the slots
    Drained,
    /// Bar is back to full width
    BarRestored,
}

/// A state change reported by [`CycleController::evaluate`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub from: CycleState,
    pub to: CycleState,
    /// Time spent in `from`
    pub duration_ms: f64,
    pub trigger: Trigger,
}

/// Inputs sampled once per tick after counts are refreshed
#[derive(Debug, Clone, Copy)]
pub struct CycleInputs {
    pub now_ms: f64,
    pub current_ball_count: u32,
    /// Bar is at full width with no animation running
    pub bar_restored: bool,
}

#[derive(Debug, Clone)]
pub struct CycleController {
    state: CycleState,
    state_entered_ms: f64,
    batch_size: u32,
    holding_time_ms: f64,
    collection_timeout_ms: f64,
}

impl CycleController {
    pub fn new(now_ms: f64, batch_size: u32, holding_time_ms: f64, collection_timeout_ms: f64) -> Self {
        Self {
            state: CycleState::WaitingForCollection,
            state_entered_ms: now_ms,
            batch_size,
            holding_time_ms,
            collection_timeout_ms,
        }
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn batch_size(&self) -> u32 {
        self.batch_size
    }

    pub fn elapsed_in_state(&self, now_ms: f64) -> f64 {
        now_ms - self.state_entered_ms
    }

    /// Decide the next state. The first true condition wins.
    fn next(&self, inputs: &CycleInputs) -> Option<(CycleState, Trigger)> {
        let elapsed = self.elapsed_in_state(inputs.now_ms);
        match self.state {
            CycleState::WaitingForCollection => {
                if inputs.current_ball_count == self.batch_size {
                    Some((CycleState::Holding, Trigger::BatchCollected))
                } else if elapsed > self.collection_timeout_ms {
                    let lost_balls = self.batch_size.saturating_sub(inputs.current_ball_count);
                    Some((CycleState::Releasing, Trigger::CollectionTimeout { lost_balls }))
                } else {
                    None
                }
            }
            CycleState::Holding => {
                (elapsed > self.holding_time_ms).then_some((CycleState::Releasing, Trigger::HoldElapsed))
            }
            CycleState::Releasing => {
                (inputs.current_ball_count == 0).then_some((CycleState::Reactivating, Trigger::Drained))
            }
            CycleState::Reactivating => inputs
                .bar_restored
                .then_some((CycleState::WaitingForCollection, Trigger::BarRestored)),
        }
    }

    /// Evaluate transition conditions, entering the next state if one fires
    pub fn evaluate(&mut self, inputs: &CycleInputs) -> Option<Transition> {
        let (to, trigger) = self.next(inputs)?;
        let transition = Transition {
            from: self.state,
            to,
            duration_ms: self.elapsed_in_state(inputs.now_ms),
            trigger,
        };
        self.state = to;
        self.state_entered_ms = inputs.now_ms;
        Some(transition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> CycleController {
        CycleController::new(0.0, 100, 1000.0, 15_000.0)
    }

    fn inputs(now_ms: f64, current_ball_count: u32, bar_restored: bool) -> CycleInputs {
        CycleInputs {
            now_ms,
            current_ball_count,
            bar_restored,
        }
    }

    #[test]
    fn test_full_cycle() {
        let mut cycle = controller();
        assert_eq!(cycle.state(), CycleState::WaitingForCollection);

        assert!(cycle.evaluate(&inputs(100.0, 99, true)).is_none());

        let t = cycle.evaluate(&inputs(2000.0, 100, true)).unwrap();
        assert_eq!((t.from, t.to), (CycleState::WaitingForCollection, CycleState::Holding));
        assert_eq!(t.trigger, Trigger::BatchCollected);
        assert_eq!(t.duration_ms, 2000.0);

        // Exactly at the hold time is not enough
        assert!(cycle.evaluate(&inputs(3000.0, 100, true)).is_none());
        let t = cycle.evaluate(&inputs(3000.5, 100, true)).unwrap();
        assert_eq!(t.to, CycleState::Releasing);
        assert_eq!(t.trigger, Trigger::HoldElapsed);

        assert!(cycle.evaluate(&inputs(3100.0, 12, false)).is_none());
        let t = cycle.evaluate(&inputs(3500.0, 0, false)).unwrap();
        assert_eq!(t.to, CycleState::Reactivating);
        assert_eq!(t.trigger, Trigger::Drained);

        assert!(cycle.evaluate(&inputs(3600.0, 0, false)).is_none());
        let t = cycle.evaluate(&inputs(4000.0, 0, true)).unwrap();
        assert_eq!((t.from, t.to), (CycleState::Reactivating, CycleState::WaitingForCollection));
        assert_eq!(t.trigger, Trigger::BarRestored);
        assert_eq!(t.duration_ms, 500.0);
    }

    #[test]
    fn test_collection_timeout_loses_balls() {
        let mut cycle = controller();
        assert!(cycle.evaluate(&inputs(15_000.0, 40, true)).is_none());
        let t = cycle.evaluate(&inputs(15_001.0, 40, true)).unwrap();
        assert_eq!(t.to, CycleState::Releasing);
        assert_eq!(t.trigger, Trigger::CollectionTimeout { lost_balls: 60 });
    }

    #[test]
    fn test_batch_wins_over_timeout() {
        let mut cycle = controller();
        let t = cycle.evaluate(&inputs(20_000.0, 100, true)).unwrap();
        assert_eq!(t.to, CycleState::Holding);
        assert_eq!(t.trigger, Trigger::BatchCollected);
    }

    #[test]
    fn test_overfull_count_times_out_without_underflow() {
        let mut cycle = controller();
        let t = cycle.evaluate(&inputs(16_000.0, 104, true)).unwrap();
        assert_eq!(t.trigger, Trigger::CollectionTimeout { lost_balls: 0 });
    }

    #[test]
    fn test_state_entry_time_resets() {
        let mut cycle = controller();
        let _ = cycle.evaluate(&inputs(14_000.0, 100, true)).unwrap();
        assert_eq!(cycle.elapsed_in_state(14_500.0), 500.0);
        // The old WAITING entry time must not leak into HOLDING
        assert!(cycle.evaluate(&inputs(14_900.0, 100, true)).is_none());
    }

    #[test]
    fn test_state_names() {
        assert_eq!(CycleState::WaitingForCollection.to_string(), "WAITING_FOR_COLLECTION");
        assert_eq!(
            serde_json::to_string(&CycleState::Reactivating).unwrap(),
            "\"REACTIVATING\""
        );
    }
}
