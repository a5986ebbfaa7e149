//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (one tick = one frame)
//! - Injected, seedable RNG only
//! - Stable iteration order (grid cells in row-major order)
//! - No rendering, audio or platform dependencies

pub mod cluster;
pub mod collision;
pub mod grid;
pub mod state;
pub mod tick;

pub use cluster::{MatchResult, activate_power, find_floating_pieces, find_same_color_cluster, resolve_match};
pub use collision::{Advance, Landing, reflect_velocity};
pub use grid::Grid;
pub use state::{
    Cell, GameEvent, GamePhase, GameState, MAX_QUEUED_EVENTS, Piece, PieceColor, Projectile, Snapshot,
};
pub use tick::{TickInput, generate_level, launch, quit, restart, tick, toggle_pause};
