//! Projectile motion and collision detection
//!
//! Straight-line motion at a fixed per-tick step. The only velocity change is
//! an elastic reflection off the side walls.

use glam::Vec2;

use super::grid::Grid;
use super::state::{Cell, Projectile};

/// Where a projectile came to rest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    /// Top edge crossed y = 0 without touching a piece first
    Ceiling,
    /// Overlapped the placed piece at this cell
    Piece(Cell),
    /// Overlapped a stray piece (no grid address to anchor on)
    Stray,
}

/// Result of advancing one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Flying { bounced: bool },
    Landed { landing: Landing, bounced: bool },
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Inward wall normal if a circle pokes past either side wall
pub fn side_wall_contact(pos: Vec2, radius: f32, arena_width: f32) -> Option<Vec2> {
    if pos.x - radius < 0.0 {
        Some(Vec2::X)
    } else if pos.x + radius > arena_width {
        Some(Vec2::NEG_X)
    } else {
        None
    }
}

/// Check if a circle's top edge crossed the ceiling
#[inline]
pub fn ceiling_contact(pos: Vec2, radius: f32) -> bool {
    pos.y - radius < 0.0
}

#[inline]
fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance(b) < ra + rb
}

/// First placed piece overlapping the circle, in grid iteration order
///
/// Deliberately not the nearest: when several pieces overlap in the same
/// tick, the first one scanned wins.
pub fn first_overlap(grid: &Grid, pos: Vec2, radius: f32) -> Option<Landing> {
    grid.pieces()
        .find(|p| circles_overlap(pos, radius, p.pos, grid.radius()))
        .map(|p| match p.cell {
            Some(cell) => Landing::Piece(cell),
            None => Landing::Stray,
        })
}

impl Projectile {
    /// Move one tick, bounce off side walls, then test ceiling and pieces
    pub fn advance(&mut self, grid: &Grid, arena_width: f32) -> Advance {
        self.piece.pos += self.vel;
        let pos = self.piece.pos;

        let bounced = match side_wall_contact(pos, self.radius, arena_width) {
            Some(normal) => {
                self.vel = reflect_velocity(self.vel, normal);
                true
            }
            None => false,
        };

        if ceiling_contact(pos, self.radius) {
            return Advance::Landed {
                landing: Landing::Ceiling,
                bounced,
            };
        }

        match first_overlap(grid, pos, self.radius) {
            Some(landing) => Advance::Landed { landing, bounced },
            None => Advance::Flying { bounced },
        }
    }
}
