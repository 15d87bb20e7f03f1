//! Deviation monitor
//!
//! Compares each slot's empirical share with its expected share once per
//! cycle, at the end of the hold. Slots past the threshold get a warning
//! marker. Flags only accumulate; [`DeviationMonitor::clear`] is the sole way
//! to drop them.

use std::collections::BTreeMap;

use glam::Vec2;

use super::physics::{BodyHandle, BodyKind, BodyOptions, PhysicsWorld, Shape};
use super::slots::{SlotId, SlotRegistry};
use crate::consts::{WARNING_OFFSET_Y, WARNING_SIZE};
use crate::error::SimError;
use crate::percent;

/// Empirical vs. expected share of one slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotDeviation {
    pub slot: SlotId,
    pub index: usize,
    pub total_pct: f64,
    pub expected_pct: f64,
    /// Absolute gap in percentage points
    pub deviation_pct: f64,
}

/// Outcome of a deviation check
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviationReport {
    /// Slots flagged by this check
    pub newly_flagged: Vec<SlotId>,
    /// Slots over threshold whose marker could not be placed
    pub errors: Vec<SimError>,
}

/// Compute the deviation of every slot. Shares are 0% while nothing is counted.
pub fn slot_deviations(registry: &SlotRegistry, total_counted: u64) -> Vec<SlotDeviation> {
    registry
        .slots()
        .iter()
        .map(|slot| {
            let total_pct = percent(slot.total_count, total_counted);
            let expected_pct = slot.expected_probability * 100.0;
            SlotDeviation {
                slot: slot.id,
                index: slot.index,
                total_pct,
                expected_pct,
                deviation_pct: (total_pct - expected_pct).abs(),
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct DeviationMonitor {
    threshold_pct: f64,
    /// Flagged slots and their marker bodies
    markers: BTreeMap<SlotId, BodyHandle>,
}

impl DeviationMonitor {
    pub fn new(threshold_pct: f64) -> Self {
        Self {
            threshold_pct,
            markers: BTreeMap::new(),
        }
    }

    pub fn threshold_pct(&self) -> f64 {
        self.threshold_pct
    }

    pub fn is_flagged(&self, slot: SlotId) -> bool {
        self.markers.contains_key(&slot)
    }

    pub fn flagged(&self) -> impl Iterator<Item = SlotId> + '_ {
        self.markers.keys().copied()
    }

    pub fn marker(&self, slot: SlotId) -> Option<BodyHandle> {
        self.markers.get(&slot).copied()
    }

    /// Flag every slot over threshold that is not flagged yet
    pub fn check<W: PhysicsWorld + ?Sized>(
        &mut self,
        registry: &SlotRegistry,
        total_counted: u64,
        world: &mut W,
    ) -> DeviationReport {
        log::debug!("Checking slot deviations...");
        let mut report = DeviationReport::default();

        for dev in slot_deviations(registry, total_counted) {
            log::debug!(
                "Slot {}: total {:.1}%, expected {:.1}%, deviation {:.1}%",
                dev.index,
                dev.total_pct,
                dev.expected_pct,
                dev.deviation_pct
            );

            if dev.deviation_pct <= self.threshold_pct || self.is_flagged(dev.slot) {
                continue;
            }

            match place_marker(registry, dev.slot, world) {
                Ok(marker) => {
                    log::info!(
                        "Warning added for slot {} ({:.1}% vs {:.1}% expected)",
                        dev.index,
                        dev.total_pct,
                        dev.expected_pct
                    );
                    let _ = self.markers.insert(dev.slot, marker);
                    report.newly_flagged.push(dev.slot);
                }
                Err(e) => {
                    log::warn!("Skipping warning for slot {}: {}", dev.index, e);
                    report.errors.push(e);
                }
            }
        }

        report
    }

    /// Remove every marker from the world and drop all flags
    pub fn clear<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W) {
        for (_, marker) in std::mem::take(&mut self.markers) {
            let _ = world.remove_body(marker);
        }
    }
}

/// Create a marker sensor above the slot, resolved through the slot's own body
fn place_marker<W: PhysicsWorld + ?Sized>(
    registry: &SlotRegistry,
    slot: SlotId,
    world: &mut W,
) -> Result<BodyHandle, SimError> {
    let body = registry
        .get(slot)
        .and_then(|s| world.body(s.body))
        .ok_or(SimError::MissingSlotBody { slot })?;
    let bounds = body.bounds();
    let position = Vec2::new(body.position.x, bounds.min.y + WARNING_OFFSET_Y);

    Ok(world.create_body(
        Shape::Circle {
            radius: WARNING_SIZE / 2.0,
        },
        BodyOptions::sensor(BodyKind::Warning(slot), position),
    ))
}
