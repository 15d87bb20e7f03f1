//! Cycle analytics
//!
//! The tick pipeline publishes slot snapshots, state transitions and lost
//! balls to an [`AnalyticsRecorder`]. [`CycleHistory`] is the in-memory
//! recorder: it keeps the running cycle, seals completed ones, and derives
//! the series a dashboard charts.

use serde::{Deserialize, Serialize};

use crate::sim::cycle::CycleState;
use crate::sim::slots::SlotSnapshot;

/// Sink for simulation analytics
pub trait AnalyticsRecorder {
    /// Full slot snapshot, published every tick
    fn publish_slot_snapshot(&mut self, slots: &[SlotSnapshot]);

    /// A cycle state change and how long the previous state lasted
    fn publish_state_transition(&mut self, from: CycleState, to: CycleState, duration_ms: f64);

    /// Balls that never arrived before the collection timeout
    fn publish_lost_balls(&mut self, count: u32);
}

/// Recorder that drops everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRecorder;

impl AnalyticsRecorder for NullRecorder {
    fn publish_slot_snapshot(&mut self, _slots: &[SlotSnapshot]) {}
    fn publish_state_transition(&mut self, _from: CycleState, _to: CycleState, _duration_ms: f64) {}
    fn publish_lost_balls(&mut self, _count: u32) {}
}

/// Time spent in one state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateDuration {
    pub state: CycleState,
    pub duration_ms: f64,
}

/// One pass through the cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleRecord {
    pub start_ms: f64,
    pub states: Vec<StateDuration>,
    pub lost_balls: u32,
}

impl CycleRecord {
    fn new(start_ms: f64) -> Self {
        Self {
            start_ms,
            states: Vec::new(),
            lost_balls: 0,
        }
    }

    pub fn total_duration_ms(&self) -> f64 {
        self.states.iter().map(|s| s.duration_ms).sum()
    }

    pub fn duration_of(&self, state: CycleState) -> Option<f64> {
        self.states.iter().find(|s| s.state == state).map(|s| s.duration_ms)
    }
}

/// Share of each slot, sorted by index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DistributionSeries {
    pub labels: Vec<String>,
    /// Fraction of all counted balls (0 - 1)
    pub total: Vec<f64>,
    /// Fraction of balls currently in slots (0 - 1)
    pub current: Vec<f64>,
    pub expected: Vec<f64>,
}

/// A (cycle number, value) point; cycles are numbered from 1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub cycle: usize,
    pub value: f64,
}

/// Per-state durations and lost balls across sealed cycles
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineSeries {
    pub waiting: Vec<TimelinePoint>,
    pub holding: Vec<TimelinePoint>,
    pub releasing: Vec<TimelinePoint>,
    pub reactivating: Vec<TimelinePoint>,
    /// Only cycles that lost balls
    pub lost_balls: Vec<TimelinePoint>,
}

impl TimelineSeries {
    pub fn for_state(&self, state: CycleState) -> &[TimelinePoint] {
        match state {
            CycleState::WaitingForCollection => &self.waiting,
            CycleState::Holding => &self.holding,
            CycleState::Releasing => &self.releasing,
            CycleState::Reactivating => &self.reactivating,
        }
    }

    fn for_state_mut(&mut self, state: CycleState) -> &mut Vec<TimelinePoint> {
        match state {
            CycleState::WaitingForCollection => &mut self.waiting,
            CycleState::Holding => &mut self.holding,
            CycleState::Releasing => &mut self.releasing,
            CycleState::Reactivating => &mut self.reactivating,
        }
    }
}

/// In-memory analytics recorder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleHistory {
    pub cycles: Vec<CycleRecord>,
    pub current: CycleRecord,
    /// Latest slot snapshot
    pub slots: Vec<SlotSnapshot>,
}

impl CycleHistory {
    pub fn new(start_ms: f64) -> Self {
        Self {
            cycles: Vec::new(),
            current: CycleRecord::new(start_ms),
            slots: Vec::new(),
        }
    }

    pub fn completed_cycles(&self) -> usize {
        self.cycles.len()
    }

    /// Sum of every slot's total count
    pub fn total_ball_count(&self) -> u64 {
        self.slots.iter().map(|s| s.total_count).sum()
    }

    pub fn distribution(&self) -> DistributionSeries {
        let mut slots = self.slots.clone();
        slots.sort_by_key(|s| s.index);

        let total = self.total_ball_count();
        let current: u64 = slots.iter().map(|s| u64::from(s.current_count)).sum();
        let share = |part: u64, whole: u64| if whole > 0 { part as f64 / whole as f64 } else { 0.0 };

        DistributionSeries {
            labels: slots.iter().map(|s| format!("Slot {}", s.index)).collect(),
            total: slots.iter().map(|s| share(s.total_count, total)).collect(),
            current: slots.iter().map(|s| share(u64::from(s.current_count), current)).collect(),
            expected: slots.iter().map(|s| s.expected_probability).collect(),
        }
    }

    pub fn timeline(&self) -> TimelineSeries {
        let mut series = TimelineSeries::default();
        for (i, cycle) in self.cycles.iter().enumerate() {
            let number = i + 1;
            for entry in &cycle.states {
                series.for_state_mut(entry.state).push(TimelinePoint {
                    cycle: number,
                    value: entry.duration_ms,
                });
            }
            if cycle.lost_balls > 0 {
                series.lost_balls.push(TimelinePoint {
                    cycle: number,
                    value: f64::from(cycle.lost_balls),
                });
            }
        }
        series
    }
}

impl AnalyticsRecorder for CycleHistory {
    fn publish_slot_snapshot(&mut self, slots: &[SlotSnapshot]) {
        self.slots.clear();
        self.slots.extend_from_slice(slots);
    }

    fn publish_state_transition(&mut self, from: CycleState, to: CycleState, duration_ms: f64) {
        self.current.states.push(StateDuration {
            state: from,
            duration_ms,
        });

        if from == CycleState::Reactivating && to == CycleState::WaitingForCollection {
            let next_start = self.current.start_ms + self.current.total_duration_ms();
            let sealed = std::mem::replace(&mut self.current, CycleRecord::new(next_start));
            log::info!(
                "Cycle {} complete in {:.0}ms (lost {})",
                self.cycles.len() + 1,
                sealed.total_duration_ms(),
                sealed.lost_balls
            );
            self.cycles.push(sealed);
        }
    }

    fn publish_lost_balls(&mut self, count: u32) {
        self.current.lost_balls = count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::slots::SlotId;

    fn snapshot(index: usize, total_count: u64, current_count: u32, expected: f64) -> SlotSnapshot {
        SlotSnapshot {
            id: SlotId(index as u32),
            index,
            total_count,
            current_count,
            expected_probability: expected,
        }
    }

    fn run_cycle(history: &mut CycleHistory, lost: Option<u32>) {
        use CycleState::*;
        if let Some(lost) = lost {
            history.publish_lost_balls(lost);
            history.publish_state_transition(WaitingForCollection, Releasing, 15_001.0);
        } else {
            history.publish_state_transition(WaitingForCollection, Holding, 5000.0);
            history.publish_state_transition(Holding, Releasing, 1000.0);
        }
        history.publish_state_transition(Releasing, Reactivating, 800.0);
        history.publish_state_transition(Reactivating, WaitingForCollection, 500.0);
    }

    #[test]
    fn test_cycle_is_sealed_on_reactivation() {
        let mut history = CycleHistory::new(0.0);
        run_cycle(&mut history, None);

        assert_eq!(history.completed_cycles(), 1);
        let cycle = &history.cycles[0];
        assert_eq!(cycle.states.len(), 4);
        assert_eq!(cycle.total_duration_ms(), 7300.0);
        assert_eq!(cycle.duration_of(CycleState::Holding), Some(1000.0));
        assert_eq!(cycle.lost_balls, 0);

        assert!(history.current.states.is_empty());
        assert_eq!(history.current.start_ms, 7300.0);
    }

    #[test]
    fn test_timeline_series() {
        let mut history = CycleHistory::new(0.0);
        run_cycle(&mut history, None);
        run_cycle(&mut history, Some(60));

        let timeline = history.timeline();
        assert_eq!(timeline.waiting.len(), 2);
        assert_eq!(timeline.holding.len(), 1);
        assert_eq!(timeline.for_state(CycleState::Releasing).len(), 2);
        assert_eq!(timeline.waiting[1], TimelinePoint { cycle: 2, value: 15_001.0 });
        assert_eq!(timeline.lost_balls, vec![TimelinePoint { cycle: 2, value: 60.0 }]);
    }

    #[test]
    fn test_distribution_sorted_and_zero_guarded() {
        let mut history = CycleHistory::new(0.0);
        history.publish_slot_snapshot(&[snapshot(1, 0, 0, 0.5), snapshot(0, 0, 0, 0.5)]);
        let dist = history.distribution();
        assert_eq!(dist.labels, vec!["Slot 0", "Slot 1"]);
        assert_eq!(dist.total, vec![0.0, 0.0]);
        assert_eq!(dist.current, vec![0.0, 0.0]);

        history.publish_slot_snapshot(&[snapshot(0, 3, 1, 0.5), snapshot(1, 1, 3, 0.5)]);
        let dist = history.distribution();
        assert_eq!(dist.total, vec![0.75, 0.25]);
        assert_eq!(dist.current, vec![0.25, 0.75]);
        assert_eq!(dist.expected, vec![0.5, 0.5]);
    }
}
