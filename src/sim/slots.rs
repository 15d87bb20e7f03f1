//! Slot registry
//!
//! Slots are created once from board geometry and identified by a sequential
//! [`SlotId`]. Index and position never change; counts change every tick.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::physics::{Aabb, BodyHandle};
use super::probability::expected_distribution;
use crate::percent;

/// Slot identifier, assigned left-to-right at layout time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotId(pub u32);

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Geometry of a slot as produced by the board layout
#[derive(Debug, Clone, Copy)]
pub struct SlotLayout {
    /// Sensor body in the physics world
    pub body: BodyHandle,
    pub position_x: f32,
    pub bounds: Aabb,
}

/// A bottom bin
#[derive(Debug, Clone)]
pub struct Slot {
    pub id: SlotId,
    pub index: usize,
    pub position_x: f32,
    pub body: BodyHandle,
    pub bounds: Aabb,
    /// Balls counted into this slot, ever
    pub total_count: u64,
    /// Balls overlapping this slot right now
    pub current_count: u32,
    pub expected_probability: f64,
}

/// Published per-slot view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotSnapshot {
    pub id: SlotId,
    pub index: usize,
    pub total_count: u64,
    pub current_count: u32,
    pub expected_probability: f64,
}

/// One row of the slot table, percentages already zero-guarded
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotRow {
    pub index: usize,
    pub total_count: u64,
    pub current_count: u32,
    pub total_pct: f64,
    pub current_pct: f64,
    pub expected_pct: f64,
}

/// Owns every slot; slots are stored in index order
#[derive(Debug, Clone, Default)]
pub struct SlotRegistry {
    slots: Vec<Slot>,
}

impl SlotRegistry {
    /// Build the registry from left-to-right layouts and normalize expectations
    pub fn new(layouts: Vec<SlotLayout>, rows: u32, p: f64) -> Self {
        let expected = expected_distribution(layouts.len(), rows, p);
        let slots = layouts
            .into_iter()
            .zip(expected)
            .enumerate()
            .map(|(index, (layout, expected_probability))| Slot {
                id: SlotId(index as u32),
                index,
                position_x: layout.position_x,
                body: layout.body,
                bounds: layout.bounds,
                total_count: 0,
                current_count: 0,
                expected_probability,
            })
            .collect();
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn get(&self, id: SlotId) -> Option<&Slot> {
        self.slots.get(id.0 as usize)
    }

    pub(crate) fn get_mut(&mut self, id: SlotId) -> Option<&mut Slot> {
        self.slots.get_mut(id.0 as usize)
    }

    /// Zero every slot's current count (start of a tick)
    pub fn reset_tick_counts(&mut self) {
        for slot in &mut self.slots {
            slot.current_count = 0;
        }
    }

    pub fn total_counted(&self) -> u64 {
        self.slots.iter().map(|s| s.total_count).sum()
    }

    pub fn current_counted(&self) -> u32 {
        self.slots.iter().map(|s| s.current_count).sum()
    }

    /// Per-slot snapshot for the analytics collaborator
    pub fn snapshot(&self) -> Vec<SlotSnapshot> {
        self.slots
            .iter()
            .map(|s| SlotSnapshot {
                id: s.id,
                index: s.index,
                total_count: s.total_count,
                current_count: s.current_count,
                expected_probability: s.expected_probability,
            })
            .collect()
    }

    /// Slot table rows
    pub fn table(&self) -> Vec<SlotRow> {
        let total = self.total_counted();
        let current = u64::from(self.current_counted());
        self.slots
            .iter()
            .map(|s| SlotRow {
                index: s.index,
                total_count: s.total_count,
                current_count: s.current_count,
                total_pct: percent(s.total_count, total),
                current_pct: percent(u64::from(s.current_count), current),
                expected_pct: s.expected_probability * 100.0,
            })
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use glam::Vec2;

    /// Ten 15 px slots side by side, 30 px apart, with fake body handles
    pub(crate) fn sample_registry(count: usize) -> SlotRegistry {
        let layouts = (0..count)
            .map(|i| {
                let x = 60.0 + i as f32 * 30.0;
                SlotLayout {
                    body: BodyHandle(1000 + i as u64),
                    position_x: x,
                    bounds: Aabb::from_center(Vec2::new(x, 514.0), Vec2::new(7.5, 50.0)),
                }
            })
            .collect();
        SlotRegistry::new(layouts, 11, 0.5)
    }

    #[test]
    fn test_ids_follow_index_order() {
        let registry = sample_registry(10);
        for (i, slot) in registry.slots().iter().enumerate() {
            assert_eq!(slot.index, i);
            assert_eq!(slot.id, SlotId(i as u32));
        }
        assert!((registry.slots().iter().map(|s| s.expected_probability).sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_table_is_zero_guarded() {
        let registry = sample_registry(4);
        for row in registry.table() {
            assert_eq!(row.total_pct, 0.0);
            assert_eq!(row.current_pct, 0.0);
            assert!(row.expected_pct > 0.0);
        }
    }

    #[test]
    fn test_table_percentages() {
        let mut registry = sample_registry(2);
        registry.get_mut(SlotId(0)).unwrap().total_count = 3;
        registry.get_mut(SlotId(1)).unwrap().total_count = 1;
        registry.get_mut(SlotId(1)).unwrap().current_count = 2;

        let table = registry.table();
        assert_eq!(table[0].total_pct, 75.0);
        assert_eq!(table[1].total_pct, 25.0);
        assert_eq!(table[0].current_pct, 0.0);
        assert_eq!(table[1].current_pct, 100.0);
        assert_eq!(table[0].expected_pct, 50.0);

        registry.reset_tick_counts();
        assert_eq!(registry.current_counted(), 0);
        assert_eq!(registry.total_counted(), 4);
    }
}
