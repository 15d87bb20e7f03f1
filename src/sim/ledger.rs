//! Ball ledger
//!
//! Recomputes per-slot occupancy every tick and counts each ball into a
//! slot's permanent total exactly once, the first time it overlaps a slot
//! while the bar is releasing.

use std::collections::HashSet;

use super::physics::{BodyHandle, BodyKind, PhysicsWorld};
use super::slots::{SlotId, SlotRegistry};

/// Result of a recount pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickCounts {
    /// Ball/slot overlaps this tick
    pub current_ball_count: u32,
    /// Balls counted for the first time this tick
    pub newly_counted: u32,
}

#[derive(Debug, Clone, Default)]
pub struct BallLedger {
    /// Balls already counted into a slot total
    counted: HashSet<BodyHandle>,
    current_ball_count: u32,
    total_counted: u64,
}

impl BallLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_ball_count(&self) -> u32 {
        self.current_ball_count
    }

    pub fn total_counted(&self) -> u64 {
        self.total_counted
    }

    pub fn is_counted(&self, ball: BodyHandle) -> bool {
        self.counted.contains(&ball)
    }

    /// Zero current counts ahead of re-accumulation
    pub fn begin_tick(&mut self, registry: &mut SlotRegistry) {
        registry.reset_tick_counts();
        self.current_ball_count = 0;
    }

    /// Record one ball/slot overlap. Returns true if the ball was counted now.
    pub fn accumulate(
        &mut self,
        registry: &mut SlotRegistry,
        ball: BodyHandle,
        slot: SlotId,
        releasing: bool,
    ) -> bool {
        let Some(slot) = registry.get_mut(slot) else {
            return false;
        };
        slot.current_count += 1;
        self.current_ball_count += 1;

        if releasing && self.counted.insert(ball) {
            slot.total_count += 1;
            self.total_counted += 1;
            return true;
        }
        false
    }

    /// Drop bookkeeping for a ball that left the world
    pub fn forget(&mut self, ball: BodyHandle) {
        let _ = self.counted.remove(&ball);
    }

    /// Full recount against the world: every ball against every slot
    pub fn recount<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &W,
        registry: &mut SlotRegistry,
        releasing: bool,
    ) -> TickCounts {
        self.begin_tick(registry);

        let balls: Vec<_> = world
            .handles()
            .into_iter()
            .filter_map(|h| world.body(h))
            .filter(|b| b.kind == BodyKind::Ball)
            .map(|b| (b.handle, b.bounds()))
            .collect();
        let slots: Vec<_> = registry.slots().iter().map(|s| (s.id, s.bounds)).collect();

        let mut newly_counted = 0;
        for (ball, ball_bounds) in &balls {
            for (slot, slot_bounds) in &slots {
                if ball_bounds.overlaps(slot_bounds) && self.accumulate(registry, *ball, *slot, releasing) {
                    newly_counted += 1;
                }
            }
        }

        TickCounts {
            current_ball_count: self.current_ball_count,
            newly_counted,
        }
    }

    /// Clear everything (board rebuilt)
    pub fn clear(&mut self) {
        self.counted.clear();
        self.current_ball_count = 0;
        self.total_counted = 0;
    }
}
