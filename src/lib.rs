//! Hex Popper - simulation core for a hex-grid projectile-matching puzzle
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, clusters, projectile, round control)
//! - `settings`: Data-driven game configuration
//! - `error`: Error types for grid placement and config loading

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{ConfigError, GridError};
pub use settings::GameConfig;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Score per piece removed as part of a matched cluster
    pub const SCORE_PER_MATCHED: u64 = 10;
    /// Score per piece removed by a power effect
    pub const SCORE_PER_POWERED: u64 = 15;
    /// Score per piece dropped for losing its ceiling connection
    pub const SCORE_PER_FLOATING: u64 = 20;

    /// Row pitch as a multiple of the piece radius
    pub const ROW_PITCH: f32 = 1.8;

    /// Aim angle limit in degrees (both directions)
    pub const AIM_LIMIT_DEGREES: f32 = 180.0;
}

/// Clamp an aim angle to [-180°, 180°]
#[inline]
pub fn clamp_aim(degrees: f32) -> f32 {
    if degrees.is_nan() {
        return 0.0;
    }
    degrees.clamp(-consts::AIM_LIMIT_DEGREES, consts::AIM_LIMIT_DEGREES)
}

/// Unit direction for an aim angle in degrees (screen space, +y down)
#[inline]
pub fn aim_direction(degrees: f32) -> Vec2 {
    let rad = clamp_aim(degrees).to_radians();
    Vec2::new(rad.cos(), rad.sin())
}

/// Angle in degrees from `from` toward `to` (screen space, +y down)
#[inline]
pub fn aim_toward(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x).to_degrees()
}
