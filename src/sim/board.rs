//! Board layout
//!
//! Pegs sit on a hexagonal lattice spanned by 60° and 120° offsets from the
//! top peg. The lattice's bottom diagonal (row + col == PEG_ROWS) holds the
//! dividers, and a slot sensor fills the gap between each pair of adjacent
//! dividers. Slots are created left to right, so creation order is index order.
//!
//! A funnel frame closes the board: a hopper guides spawned balls onto the top
//! peg, and a wall runs just outside each lattice edge down to the dividers,
//! leaving less than a ball's width between the wall and any outer peg.

use glam::Vec2;

use super::bar::Bar;
use super::physics::{Aabb, BodyHandle, BodyKind, BodyOptions, PhysicsWorld, Shape};
use super::slots::{SlotId, SlotLayout, SlotRegistry};
use crate::consts::*;
use crate::error::SimError;
use crate::lattice_offsets;
use crate::tuning::Tuning;

/// Static board bodies and the slot registry built from them
#[derive(Debug, Clone)]
pub struct Board {
    pub pegs: Vec<BodyHandle>,
    pub dividers: Vec<BodyHandle>,
    pub walls: Vec<BodyHandle>,
    pub bar: Bar,
    pub registry: SlotRegistry,
}

impl Board {
    /// Create every static body in `world`
    pub fn build<W: PhysicsWorld + ?Sized>(world: &mut W, tuning: &Tuning) -> Result<Self, SimError> {
        let (row_offset, col_offset) = lattice_offsets();
        let origin = Vec2::new(PEG_START_X, PEG_START_Y);

        let mut pegs = Vec::new();
        let mut dividers = Vec::new();
        let mut layouts = Vec::new();
        let mut last_divider_x: Option<f32> = None;

        for row in 0..=PEG_ROWS {
            for col in 0..=PEG_COLS {
                let peg_pos = origin + row_offset * row as f32 + col_offset * col as f32;

                if row + col == PEG_ROWS && row != 0 {
                    let divider_x = peg_pos.x - PEG_INNER_R * 2.0;
                    let center_y = peg_pos.y + DIVIDER_HEIGHT / 2.0 - PEG_R * 3.0;

                    dividers.push(world.create_body(
                        Shape::rect(PEG_INNER_R * 2.0, DIVIDER_HEIGHT),
                        BodyOptions::fixed(BodyKind::Divider, Vec2::new(divider_x, center_y), PEG_RESTITUTION),
                    ));

                    if let Some(last_x) = last_divider_x {
                        let slot_width = divider_x - last_x;
                        let center = Vec2::new(last_x + slot_width / 2.0, center_y);
                        let shape = Shape::rect(slot_width - PEG_INNER_R * 2.0, DIVIDER_HEIGHT);
                        let id = SlotId(layouts.len() as u32);
                        let body = world.create_body(shape, BodyOptions::sensor(BodyKind::Slot(id), center));
                        layouts.push(SlotLayout {
                            body,
                            position_x: center.x,
                            bounds: Aabb::from_center(center, shape.half_extents()),
                        });
                    }
                    last_divider_x = Some(divider_x);
                    continue;
                } else if row + col >= PEG_ROWS {
                    continue;
                }

                pegs.push(world.create_body(
                    Shape::Hexagon { radius: PEG_R },
                    BodyOptions::fixed(BodyKind::Peg, peg_pos, PEG_RESTITUTION),
                ));
            }
        }

        if layouts.is_empty() {
            return Err(SimError::NoSlots);
        }

        let bar_center = Vec2::new(BAR_X, BAR_Y);
        let bar_body = world.create_body(
            Shape::rect(BAR_FULL_WIDTH, BAR_HEIGHT),
            BodyOptions::fixed(BodyKind::Bar, bar_center, PEG_RESTITUTION),
        );
        let bar = Bar::new(bar_body, bar_center, BAR_FULL_WIDTH, BAR_SLIM_WIDTH, BAR_HEIGHT);

        let walls = frame_segments(origin, row_offset, col_offset)
            .into_iter()
            .map(|(from, to)| {
                let (shape, center) = Shape::segment(from, to, FRAME_THICKNESS);
                world.create_body(shape, BodyOptions::fixed(BodyKind::Wall, center, PEG_RESTITUTION))
            })
            .collect();

        let registry = SlotRegistry::new(layouts, PEG_ROWS, tuning.peg_right_probability);
        log::info!(
            "Board built: {} pegs, {} dividers, {} slots",
            pegs.len(),
            dividers.len(),
            registry.len()
        );

        Ok(Self {
            pegs,
            dividers,
            walls,
            bar,
            registry,
        })
    }
}

/// Hopper and edge wall end points, left side first
fn frame_segments(origin: Vec2, row_offset: Vec2, col_offset: Vec2) -> Vec<(Vec2, Vec2)> {
    let levels = (PEG_ROWS - 1) as f32;
    [(-1.0f32, col_offset), (1.0, row_offset)]
        .into_iter()
        .flat_map(|(side, edge_step)| {
            let along = edge_step.normalize();
            // Perpendicular to the edge, pointing away from the lattice
            let outward = Vec2::new(side * along.y, -along.x.abs());
            let joint = origin + along * FRAME_JOINT + outward * FRAME_CLEARANCE;
            let hopper_top = Vec2::new(origin.x + side * HOPPER_HALF_WIDTH, HOPPER_TOP_Y);
            let bottom = origin + edge_step * levels + outward * FRAME_CLEARANCE + along * FRAME_TAIL;
            [(hopper_top, joint), (joint, bottom)]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::world::SimpleWorld;

    #[test]
    fn test_stock_board_layout() {
        let mut world = SimpleWorld::without_gravity();
        let board = Board::build(&mut world, &Tuning::default()).unwrap();

        // Triangle of pegs with row + col < 11
        assert_eq!(board.pegs.len(), 66);
        assert_eq!(board.dividers.len(), 11);
        assert_eq!(board.registry.len(), 10);
        assert_eq!(board.walls.len(), 4);
    }

    /// Clear space between a wall segment and a peg or divider
    fn gap(world: &SimpleWorld, wall: BodyHandle, other: BodyHandle) -> f32 {
        let wall = world.body(wall).unwrap();
        let Shape::Segment { half, radius } = wall.shape else {
            panic!("wall is not a segment");
        };
        let other = world.body(other).unwrap();
        let (a, ab) = (wall.position - half, half * 2.0);
        let t = ((other.position - a).dot(ab) / ab.length_squared()).clamp(0.0, 1.0);
        let nearest = a + ab * t;
        match other.shape {
            Shape::Hexagon { radius: peg_r } => (nearest - other.position).length() - peg_r - radius,
            _ => {
                let bounds = other.bounds();
                (nearest - nearest.clamp(bounds.min, bounds.max)).length() - radius
            }
        }
    }

    #[test]
    fn test_frame_seals_the_lattice_edges() {
        let mut world = SimpleWorld::without_gravity();
        let board = Board::build(&mut world, &Tuning::default()).unwrap();
        let ball = 2.0 * BALL_RADIUS;
        let edge_walls = [board.walls[1], board.walls[3]];
        let tightest = |h: BodyHandle| {
            edge_walls
                .iter()
                .map(|&wall| gap(&world, wall, h))
                .fold(f32::INFINITY, f32::min)
        };

        // Outer pegs of levels 1 to 10
        let outer: Vec<_> = board
            .pegs
            .iter()
            .copied()
            .filter(|&h| {
                let position = world.body(h).unwrap().position;
                let level = ((position.y - PEG_START_Y) / (PEG_INNER_R * 4.0 * 0.866_025_4)).round();
                let half_span = level * PEG_INNER_R * 2.0;
                level > 0.0 && ((position.x - PEG_START_X).abs() - half_span).abs() < 0.5
            })
            .collect();
        assert_eq!(outer.len(), 20);

        let end_dividers = [board.dividers[0], board.dividers[board.dividers.len() - 1]];
        for h in outer.into_iter().chain(end_dividers) {
            let clear = tightest(h);
            assert!(clear < ball, "{clear} px open next to {}", world.body(h).unwrap().position);
        }

        // Balls still get past the top peg on both sides
        for &wall in &edge_walls {
            assert!(gap(&world, wall, board.pegs[0]) > ball);
        }
    }

    #[test]
    fn test_balls_stay_inside_the_frame() {
        let mut world = SimpleWorld::new();
        let board = Board::build(&mut world, &Tuning::default()).unwrap();
        // Never dead centre on the top peg
        let balls: Vec<_> = (0..20)
            .map(|i| {
                let x = SPAWN_X - 9.5 + i as f32;
                world.create_body(
                    Shape::Circle { radius: BALL_RADIUS },
                    BodyOptions::dynamic(BodyKind::Ball, Vec2::new(x, SPAWN_Y), BALL_RESTITUTION),
                )
            })
            .collect();

        for _ in 0..600 {
            world.step(SIM_DT_MS);
        }

        let bar_top = BAR_Y - BAR_HEIGHT / 2.0;
        for ball in balls {
            let position = world.body(ball).unwrap().position;
            let in_slot = board.registry.slots().iter().any(|s| {
                position.x > s.bounds.min.x - BALL_RADIUS && position.x < s.bounds.max.x + BALL_RADIUS
            });
            assert!(in_slot, "ball escaped to {position}");
            assert!(position.y < bar_top && position.y > PEG_START_Y, "ball at {position}");
        }
    }

    #[test]
    fn test_slots_are_left_to_right_between_dividers() {
        let mut world = SimpleWorld::without_gravity();
        let board = Board::build(&mut world, &Tuning::default()).unwrap();

        let slots = board.registry.slots();
        for pair in slots.windows(2) {
            assert!(pair[0].position_x < pair[1].position_x);
            assert!(!pair[0].bounds.overlaps(&pair[1].bounds));
        }
        for slot in slots {
            let body = world.body(slot.body).unwrap();
            assert_eq!(body.kind, BodyKind::Slot(slot.id));
            assert!(body.is_sensor);
            // Slots sit directly on top of the bar
            assert!(slot.bounds.max.y <= BAR_Y - BAR_HEIGHT / 2.0);
            assert!(slot.bounds.min.x > board.bar.left_x);
        }
        let expected: f64 = slots.iter().map(|s| s.expected_probability).sum();
        assert!((expected - 1.0).abs() < 1e-9);
        assert_eq!(slots[0].expected_probability, slots[9].expected_probability);
    }
}
