//! Game configuration
//!
//! Every tunable the simulation reads lives here. Loaded from JSON on native
//! builds; any field missing from the file falls back to its default.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sim::PieceColor;

/// Simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Grid ===
    /// Columns per row
    pub grid_width: u32,
    /// Maximum number of rows
    pub grid_height: u32,
    /// Piece radius in pixels (column pitch is 2r, row pitch 1.8r)
    pub piece_radius: f32,

    // === Arena ===
    /// Playfield width in pixels (side walls at 0 and this)
    pub arena_width: f32,
    /// Playfield height in pixels
    pub arena_height: f32,
    /// Distance from the arena bottom to the shooter centre and loss line
    pub shooter_margin: f32,

    // === Projectile ===
    /// Projectile speed in pixels per tick
    pub projectile_speed: f32,

    // === Rules ===
    /// Number of palette colours in play (1..=6)
    pub palette_size: usize,
    /// Chance a populated piece is a power piece (rows > 1 only)
    pub power_chance: f64,
    /// Minimum cluster size that gets removed
    pub match_threshold: usize,
    /// Last level; clearing it wins the game
    pub max_level: u32,
    /// Starting rows before the per-level increment
    pub base_rows: u32,
    /// Cap on populated rows
    pub max_rows: u32,
    /// Extra ticks spent in LevelCleared before play resumes
    pub breather_ticks: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 15,
            grid_height: 12,
            piece_radius: 20.0,

            arena_width: 800.0,
            arena_height: 600.0,
            shooter_margin: 50.0,

            projectile_speed: 17.0,

            palette_size: PieceColor::PALETTE.len(),
            power_chance: 0.1,
            match_threshold: 3,
            max_level: 5,
            base_rows: 3,
            max_rows: 8,
            breather_ticks: 0,
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Reject configs the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.grid_width == 0 || self.grid_height == 0 {
            return invalid("grid dimensions must be non-zero");
        }
        if !(self.piece_radius > 0.0) {
            return invalid("piece_radius must be positive");
        }
        if !(self.arena_width > 2.0 * self.piece_radius) || !(self.arena_height > 0.0) {
            return invalid("arena must be wider than one piece");
        }
        if !(self.projectile_speed > 0.0) {
            return invalid("projectile_speed must be positive");
        }
        if self.palette_size == 0 || self.palette_size > PieceColor::PALETTE.len() {
            return invalid("palette_size must be between 1 and 6");
        }
        if !(0.0..=1.0).contains(&self.power_chance) {
            return invalid("power_chance must be within [0, 1]");
        }
        if self.match_threshold == 0 {
            return invalid("match_threshold must be at least 1");
        }
        if self.max_level == 0 {
            return invalid("max_level must be at least 1");
        }
        if self.base_rows > self.grid_height || self.max_rows > self.grid_height {
            return invalid("base_rows and max_rows must not exceed grid_height");
        }
        if !(0.0..self.arena_height).contains(&self.shooter_margin) {
            return invalid("shooter_margin must be within [0, arena_height)");
        }
        Ok(())
    }

    /// Colours the shooter and level generator draw from
    pub fn palette(&self) -> &'static [PieceColor] {
        let n = self.palette_size.clamp(1, PieceColor::PALETTE.len());
        &PieceColor::PALETTE[..n]
    }

    /// Shooter centre (projectiles launch from here)
    pub fn shooter_position(&self) -> Vec2 {
        Vec2::new(self.arena_width / 2.0, self.arena_height - self.shooter_margin)
    }

    /// A placed piece whose lower edge passes this y ends the game
    pub fn loss_line(&self) -> f32 {
        self.arena_height - self.shooter_margin
    }

    /// Rows populated at the start of `level`
    pub fn rows_for_level(&self, level: u32) -> u32 {
        self.base_rows.saturating_add(level).min(self.max_rows).min(self.grid_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.shooter_position(), Vec2::new(400.0, 550.0));
        assert_eq!(config.loss_line(), 550.0);
    }

    #[test]
    fn test_rows_for_level() {
        let config = GameConfig::default();
        assert_eq!(config.rows_for_level(1), 4);
        assert_eq!(config.rows_for_level(5), 8);
        assert_eq!(config.rows_for_level(9), 8);
        assert_eq!(config.rows_for_level(u32::MAX), 8);
    }

    #[test]
    fn test_row_counts_beyond_grid_rejected() {
        let err = GameConfig::from_json_str(r#"{ "base_rows": 4294967295 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = GameConfig::from_json_str(r#"{ "max_rows": 13 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        // Unvalidated configs still saturate instead of overflowing
        let config = GameConfig {
            base_rows: u32::MAX,
            ..Default::default()
        };
        assert_eq!(config.rows_for_level(1), 8);
    }

    #[test]
    fn test_shooter_margin_must_sit_inside_arena() {
        for json in [
            r#"{ "shooter_margin": -1000.0 }"#,
            r#"{ "shooter_margin": 600.0 }"#,
        ] {
            let err = GameConfig::from_json_str(json).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{json}");
        }

        let nan = GameConfig {
            shooter_margin: f32::NAN,
            ..Default::default()
        };
        assert!(nan.validate().is_err());

        let zero = GameConfig::from_json_str(r#"{ "shooter_margin": 0.0 }"#).unwrap();
        assert_eq!(zero.loss_line(), 600.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = GameConfig::from_json_str(r#"{ "grid_width": 10, "max_level": 2 }"#).unwrap();
        assert_eq!(config.grid_width, 10);
        assert_eq!(config.max_level, 2);
        assert_eq!(config.piece_radius, 20.0);
        assert_eq!(config.match_threshold, 3);
    }

    #[test]
    fn test_invalid_palette_rejected() {
        let err = GameConfig::from_json_str(r#"{ "palette_size": 9 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = GameConfig::from_json_str("{ grid_width: ").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_palette_slice() {
        let config = GameConfig {
            palette_size: 3,
            ..Default::default()
        };
        assert_eq!(config.palette().len(), 3);
        assert!(!config.palette().contains(&PieceColor::Amber));
    }
}
