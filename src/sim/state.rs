//! Game state and core simulation types
//!
//! Everything the round controller mutates lives here. Presentation layers
//! read it through [`GameState::snapshot`] and [`GameState::drain_events`].

use std::collections::VecDeque;

use glam::Vec2;
use rand::SeedableRng;
use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::grid::Grid;
use crate::settings::GameConfig;

/// Piece colours
///
/// The first six form the shooter palette. `Amber` is reserved for power
/// pieces and never drawn for the shooter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PieceColor {
    Red,
    Green,
    Blue,
    Yellow,
    Purple,
    Cyan,
    Amber,
}

impl PieceColor {
    pub const PALETTE: [Self; 6] = [
        Self::Red,
        Self::Green,
        Self::Blue,
        Self::Yellow,
        Self::Purple,
        Self::Cyan,
    ];

    /// Colour carried by power pieces
    pub const POWER: Self = Self::Amber;
}

/// A grid address. Rows grow downward from the ceiling (row 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

impl Cell {
    #[inline]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Odd rows sit half a cell to the right
    #[inline]
    pub const fn is_odd_row(&self) -> bool {
        self.row.rem_euclid(2) == 1
    }
}

/// A coloured piece, either placed in the grid or in flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    pub pos: Vec2,
    pub color: PieceColor,
    pub is_power: bool,
    /// Grid address, `None` while in flight or when placed as a stray
    pub cell: Option<Cell>,
}

impl Piece {
    /// An unplaced piece
    pub fn new(pos: Vec2, color: PieceColor) -> Self {
        Self {
            pos,
            color,
            is_power: false,
            cell: None,
        }
    }

    /// An unplaced power piece
    pub fn power(pos: Vec2) -> Self {
        Self {
            pos,
            color: PieceColor::POWER,
            is_power: true,
            cell: None,
        }
    }
}

/// The single in-flight shot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub piece: Piece,
    /// Pixels per tick
    pub vel: Vec2,
    pub radius: f32,
}

impl Projectile {
    /// Fire a piece from `origin` along `aim_degrees`
    pub fn launch(origin: Vec2, color: PieceColor, aim_degrees: f32, speed: f32, radius: f32) -> Self {
        Self {
            piece: Piece::new(origin, color),
            vel: crate::aim_direction(aim_degrees) * speed,
            radius,
        }
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        self.piece.pos
    }
}

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay, launches accepted
    Playing,
    /// Simulation frozen
    Paused,
    /// Grid emptied; next level already generated, resuming shortly
    LevelCleared,
    /// A piece crossed the loss line
    GameLost,
    /// Final level cleared
    GameWon,
}

/// Things that happened during a tick, for sound/effects/UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Launched { color: PieceColor, aim_degrees: f32 },
    Bounced { pos: Vec2 },
    Landed { cell: Option<Cell>, color: PieceColor },
    ClusterPopped { count: usize, score: u64 },
    PowerActivated { color: Option<PieceColor>, count: usize, score: u64 },
    PiecesDropped { count: usize, score: u64 },
    LevelCleared { level: u32 },
    GameWon { score: u64 },
    GameLost { score: u64 },
}

/// Read-only view of everything a presentation layer draws
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub pieces: Vec<Piece>,
    pub projectile: Option<Piece>,
    pub shooter_color: PieceColor,
    pub next_color: PieceColor,
    pub aim_degrees: f32,
    pub score: u64,
    pub level: u32,
    pub phase: GamePhase,
}

/// Events kept before the oldest are discarded
pub const MAX_QUEUED_EVENTS: usize = 1024;

/// Complete round state
///
/// Events accumulate across ticks until [`GameState::drain_events`] is
/// called. Callers that never drain only see the newest
/// [`MAX_QUEUED_EVENTS`].
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: GameConfig,
    /// Injected random source (level layout, shooter colours, power effect)
    pub(crate) rng: Pcg32,
    pub grid: Grid,
    pub projectile: Option<Projectile>,
    pub shooter_color: PieceColor,
    pub next_color: PieceColor,
    /// Last aim used for a launch
    pub aim_degrees: f32,
    pub score: u64,
    /// Current level (1-based)
    pub level: u32,
    pub phase: GamePhase,
    /// Ticks left in LevelCleared
    pub breather_ticks: u32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Cleared by `quit`
    pub running: bool,
    events: VecDeque<GameEvent>,
}

impl GameState {
    /// Create a new game with an RNG seeded from `seed`
    pub fn new(config: GameConfig, seed: u64) -> Self {
        Self::with_rng(config, Pcg32::seed_from_u64(seed))
    }

    /// Create a new game drawing randomness from `rng`
    pub fn with_rng(config: GameConfig, rng: Pcg32) -> Self {
        let grid = Grid::new(config.grid_width, config.grid_height, config.piece_radius);
        let mut state = Self {
            config,
            rng,
            grid,
            projectile: None,
            shooter_color: PieceColor::Red,
            next_color: PieceColor::Red,
            aim_degrees: -90.0,
            score: 0,
            level: 1,
            phase: GamePhase::Playing,
            breather_ticks: 0,
            time_ticks: 0,
            running: true,
            events: VecDeque::new(),
        };
        state.reset();
        state
    }

    /// Fresh score, level 1, new grid and shooter colours
    pub fn reset(&mut self) {
        self.score = 0;
        self.level = 1;
        self.projectile = None;
        self.phase = GamePhase::Playing;
        self.breather_ticks = 0;
        self.events.clear();
        super::tick::generate_level(self);
        self.shooter_color = self.random_color();
        self.next_color = self.random_color();
    }

    /// Draw a palette colour
    pub(crate) fn random_color(&mut self) -> PieceColor {
        self.config
            .palette()
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(PieceColor::Red)
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        if self.events.len() == MAX_QUEUED_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    /// Events queued since the last drain, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain(..).collect()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            pieces: self.grid.pieces().cloned().collect(),
            projectile: self.projectile.as_ref().map(|p| p.piece.clone()),
            shooter_color: self.shooter_color,
            next_color: self.next_color,
            aim_degrees: self.aim_degrees,
            score: self.score,
            level: self.level,
            phase: self.phase,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_parity_handles_negatives() {
        assert!(!Cell::new(0, 3).is_odd_row());
        assert!(Cell::new(1, 3).is_odd_row());
        assert!(Cell::new(-1, 0).is_odd_row());
    }

    #[test]
    fn test_new_game_populates_level_one() {
        let state = GameState::new(GameConfig::default(), 7);
        assert_eq!(state.level, 1);
        assert_eq!(state.score, 0);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.projectile.is_none());
        // 4 rows: two even rows of 15, two odd rows of 14
        assert_eq!(state.grid.len(), 58);
        assert!(state.config.palette().contains(&state.shooter_color));
        assert!(state.config.palette().contains(&state.next_color));
    }

    #[test]
    fn test_same_seed_same_layout() {
        let a = GameState::new(GameConfig::default(), 42);
        let b = GameState::new(GameConfig::default(), 42);
        assert_eq!(a.snapshot().pieces, b.snapshot().pieces);
        assert_eq!(a.shooter_color, b.shooter_color);
    }

    #[test]
    fn test_undrained_events_are_bounded() {
        let mut state = GameState::new(GameConfig::default(), 3);
        for level in 0..(MAX_QUEUED_EVENTS as u32 + 10) {
            state.push_event(GameEvent::LevelCleared { level });
        }
        let events = state.drain_events();
        assert_eq!(events.len(), MAX_QUEUED_EVENTS);
        assert_eq!(events[0], GameEvent::LevelCleared { level: 10 });
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_launch_direction() {
        let p = Projectile::launch(Vec2::new(400.0, 550.0), PieceColor::Blue, -90.0, 17.0, 20.0);
        assert!(p.vel.x.abs() < 1e-4);
        assert!((p.vel.y + 17.0).abs() < 1e-4);
        assert_eq!(p.piece.cell, None);
    }

    #[test]
    fn test_snapshot_serializes() {
        let state = GameState::new(GameConfig::default(), 1);
        let json = serde_json::to_string(&state.snapshot()).unwrap();
        assert!(json.contains("\"phase\":\"Playing\""));
    }
}
