//! Heat accumulator
//!
//! A sparse grid of ball traffic through the peg field. Every tick all cells
//! decay geometrically and faint cells are dropped, then each ball inside the
//! tracked band adds one unit to its cell (saturating).

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Grid cell key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HeatCell {
    pub x: i32,
    pub y: i32,
}

/// One cell as handed to a renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatSample {
    pub cell: HeatCell,
    pub value: f64,
    /// Value relative to the hottest cell (0 - 1)
    pub intensity: f64,
}

#[derive(Debug, Clone)]
pub struct HeatAccumulator {
    cells: HashMap<HeatCell, f64>,
    cell_size: f32,
    y_min: f32,
    y_max: f32,
    max_value: f64,
    decay: f64,
    epsilon: f64,
}

impl HeatAccumulator {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            cells: HashMap::new(),
            cell_size: tuning.heat_cell_size,
            y_min: tuning.heat_y_min,
            y_max: tuning.heat_y_max,
            max_value: tuning.heat_max,
            decay: tuning.heat_decay,
            epsilon: tuning.heat_epsilon,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn value(&self, cell: HeatCell) -> f64 {
        self.cells.get(&cell).copied().unwrap_or(0.0)
    }

    /// Quantize a position to its grid cell
    pub fn cell_for(&self, position: Vec2) -> HeatCell {
        HeatCell {
            x: (position.x / self.cell_size).floor() as i32,
            y: (position.y / self.cell_size).floor() as i32,
        }
    }

    /// Decay all cells and drop the ones below epsilon
    pub fn decay(&mut self) {
        let (decay, epsilon) = (self.decay, self.epsilon);
        self.cells.retain(|_, value| {
            *value *= decay;
            *value >= epsilon
        });
    }

    /// Add one unit of heat for each position inside the tracked band
    pub fn sample<I>(&mut self, positions: I)
    where
        I: IntoIterator<Item = Vec2>,
    {
        for position in positions {
            if position.y < self.y_min || position.y > self.y_max {
                continue;
            }
            let cell = self.cell_for(position);
            let value = self.cells.entry(cell).or_insert(0.0);
            *value = (*value + 1.0).min(self.max_value);
        }
    }

    /// One tick: decay, then sample
    pub fn update<I>(&mut self, positions: I)
    where
        I: IntoIterator<Item = Vec2>,
    {
        self.decay();
        self.sample(positions);
    }

    pub fn reset(&mut self) {
        self.cells.clear();
    }

    /// Cells sorted by key, intensity normalized by the current maximum
    pub fn snapshot(&self) -> Vec<HeatSample> {
        let peak = self.cells.values().copied().fold(0.1_f64, f64::max);
        let mut samples: Vec<HeatSample> = self
            .cells
            .iter()
            .map(|(&cell, &value)| HeatSample {
                cell,
                value,
                intensity: value / peak,
            })
            .collect();
        samples.sort_by_key(|s| s.cell);
        samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heat() -> HeatAccumulator {
        HeatAccumulator::new(&Tuning::default())
    }

    #[test]
    fn test_decay_one_tick() {
        let mut heat = heat();
        let cell = HeatCell { x: 60, y: 100 };
        let _ = heat.cells.insert(cell, 100.0);
        heat.update(std::iter::empty());
        assert!((heat.value(cell) - 99.95).abs() < 1e-9);
    }

    #[test]
    fn test_decayed_cell_is_pruned() {
        let mut heat = heat();
        let cell = HeatCell { x: 60, y: 100 };
        let _ = heat.cells.insert(cell, 100.0);

        // 100 * 0.9995^n drops below 0.1 after ~13812 ticks
        for _ in 0..13_000 {
            heat.decay();
        }
        assert!(!heat.is_empty());
        for _ in 0..1_000 {
            heat.decay();
        }
        assert!(heat.is_empty());
    }

    #[test]
    fn test_sample_respects_band_and_saturates() {
        let mut heat = heat();
        let inside = Vec2::new(200.0, 300.0);
        let above = Vec2::new(200.0, 150.0);
        let below = Vec2::new(200.0, 500.0);

        for _ in 0..150 {
            heat.sample([inside, above, below]);
        }
        assert_eq!(heat.len(), 1);
        assert_eq!(heat.value(heat.cell_for(inside)), 100.0);
    }

    #[test]
    fn test_cell_quantization() {
        let heat = heat();
        assert_eq!(heat.cell_for(Vec2::new(5.9, 6.0)), HeatCell { x: 1, y: 2 });
        assert_eq!(heat.cell_for(Vec2::new(-0.5, 8.99)), HeatCell { x: -1, y: 2 });
    }

    #[test]
    fn test_snapshot_and_reset() {
        let mut heat = heat();
        heat.sample([Vec2::new(10.0, 300.0), Vec2::new(10.0, 300.0), Vec2::new(100.0, 300.0)]);
        let snapshot = heat.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].intensity, 1.0);
        assert_eq!(snapshot[1].intensity, 0.5);

        heat.reset();
        assert!(heat.snapshot().is_empty());
    }
}
