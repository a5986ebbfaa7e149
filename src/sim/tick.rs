//! Fixed timestep simulation tick
//!
//! Round controller: applies commands, advances the projectile one frame,
//! places it on landing, resolves matches and checks for level clear or loss.

use glam::Vec2;
use rand::Rng;

use super::cluster::{MatchResult, resolve_match};
use super::collision::{Advance, Landing};
use super::state::{Cell, GameEvent, GamePhase, GameState, Piece, Projectile};
use crate::consts::{SCORE_PER_FLOATING, SCORE_PER_MATCHED, SCORE_PER_POWERED};
use crate::{aim_toward, clamp_aim};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Aim angle in degrees (screen space, -90 is straight up)
    pub aim_degrees: Option<f32>,
    /// Fire the shooter piece
    pub launch: bool,
    /// Pause toggle
    pub pause: bool,
    /// Start over after a win or loss
    pub restart: bool,
    /// Stop the simulation for good
    pub quit: bool,
    /// Idle/demo mode - AI aims and fires
    pub autoplay: bool,
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, input: &TickInput) {
    if !state.running {
        return;
    }
    if input.quit {
        quit(state);
        return;
    }
    if input.restart {
        restart(state);
    }
    if input.pause {
        toggle_pause(state);
    }

    match state.phase {
        GamePhase::Playing => {}
        GamePhase::LevelCleared => {
            if state.breather_ticks == 0 {
                state.phase = GamePhase::Playing;
            } else {
                state.breather_ticks -= 1;
            }
            return;
        }
        GamePhase::Paused | GamePhase::GameLost | GamePhase::GameWon => return,
    }

    state.time_ticks += 1;

    let mut input = input.clone();
    if input.autoplay && state.projectile.is_none() {
        input.aim_degrees = Some(autoplay_aim(state));
        input.launch = true;
    }

    if let Some(aim) = input.aim_degrees {
        state.aim_degrees = clamp_aim(aim);
    }
    if input.launch {
        let aim = state.aim_degrees;
        launch(state, aim);
    }

    advance_projectile(state);
}

/// Fire the shooter piece
///
/// Ignored unless playing with no projectile in flight. Returns whether a
/// projectile was launched.
pub fn launch(state: &mut GameState, aim_degrees: f32) -> bool {
    if state.phase != GamePhase::Playing || state.projectile.is_some() {
        return false;
    }

    let aim = clamp_aim(aim_degrees);
    state.aim_degrees = aim;
    let color = state.shooter_color;
    state.projectile = Some(Projectile::launch(
        state.config.shooter_position(),
        color,
        aim,
        state.config.projectile_speed,
        state.config.piece_radius,
    ));

    state.shooter_color = state.next_color;
    state.next_color = state.random_color();
    state.push_event(GameEvent::Launched {
        color,
        aim_degrees: aim,
    });
    true
}

/// Playing <-> Paused; ignored in any other phase
pub fn toggle_pause(state: &mut GameState) {
    state.phase = match state.phase {
        GamePhase::Playing => GamePhase::Paused,
        GamePhase::Paused => GamePhase::Playing,
        other => other,
    };
}

/// Start a fresh game after a win or loss; ignored otherwise
pub fn restart(state: &mut GameState) {
    if matches!(state.phase, GamePhase::GameLost | GamePhase::GameWon) {
        state.reset();
        log::info!("Game restarted");
    }
}

/// Stop the simulation; later ticks do nothing
pub fn quit(state: &mut GameState) {
    state.running = false;
    log::info!("Quit at level {} with score {}", state.level, state.score);
}

fn advance_projectile(state: &mut GameState) {
    let Some(mut projectile) = state.projectile.take() else {
        return;
    };

    match projectile.advance(&state.grid, state.config.arena_width) {
        Advance::Flying { bounced } => {
            if bounced {
                state.push_event(GameEvent::Bounced {
                    pos: projectile.pos(),
                });
            }
            state.projectile = Some(projectile);
        }
        Advance::Landed { landing, bounced } => {
            if bounced {
                state.push_event(GameEvent::Bounced {
                    pos: projectile.pos(),
                });
            }
            land_projectile(state, projectile, landing);
        }
    }
}

/// Turn a landed projectile into a placed piece and resolve the landing
pub(crate) fn land_projectile(state: &mut GameState, projectile: Projectile, landing: Landing) {
    let target = projectile.pos();
    let piece = projectile.piece;
    let color = piece.color;

    let cell = landing_cell(state, landing, target);
    let placed = match cell {
        Some(cell) => match state.grid.place(cell, piece.clone()) {
            Ok(()) => Some(cell),
            Err(e) => {
                log::warn!("Placement failed ({e}), keeping piece as a stray");
                state.grid.place_stray(piece);
                None
            }
        },
        None => {
            state.grid.place_stray(piece);
            None
        }
    };
    state.push_event(GameEvent::Landed {
        cell: placed,
        color,
    });

    if let Some(cell) = placed {
        let threshold = state.config.match_threshold;
        let result = resolve_match(&mut state.grid, cell, threshold, &mut state.rng);
        apply_match(state, &result);
    }

    check_round_end(state);
}

/// Grid address for a landing, or `None` to keep the piece as a stray
fn landing_cell(state: &GameState, landing: Landing, target: Vec2) -> Option<Cell> {
    let grid = &state.grid;
    let anchor = match landing {
        Landing::Ceiling => {
            let top = grid.place_at_top_nearest(target.x);
            if grid.in_bounds(top) && !grid.is_occupied(top) {
                return Some(top);
            }
            log::warn!("Ceiling cell ({}, {}) taken, trying its neighbours", top.row, top.col);
            top
        }
        Landing::Piece(anchor) => anchor,
        Landing::Stray => return None,
    };

    match grid.nearest_free_neighbor(anchor, target) {
        Ok(cell) => Some(cell),
        Err(e) => {
            log::warn!("{e}, placing at ({:.1}, {:.1})", target.x, target.y);
            None
        }
    }
}

fn apply_match(state: &mut GameState, result: &MatchResult) {
    if result.is_empty() {
        return;
    }
    state.score += result.score;

    state.push_event(GameEvent::ClusterPopped {
        count: result.matched.len(),
        score: result.matched.len() as u64 * SCORE_PER_MATCHED,
    });
    if result.power_activated {
        state.push_event(GameEvent::PowerActivated {
            color: result.power_color,
            count: result.powered.len(),
            score: result.powered.len() as u64 * SCORE_PER_POWERED,
        });
    }
    if !result.floating.is_empty() {
        state.push_event(GameEvent::PiecesDropped {
            count: result.floating.len(),
            score: result.floating.len() as u64 * SCORE_PER_FLOATING,
        });
    }
}

fn check_round_end(state: &mut GameState) {
    if state.grid.is_empty() {
        level_cleared(state);
        return;
    }

    let loss_line = state.config.loss_line();
    let radius = state.grid.radius();
    if state.grid.pieces().any(|p| p.pos.y + radius > loss_line) {
        state.phase = GamePhase::GameLost;
        state.projectile = None;
        state.push_event(GameEvent::GameLost { score: state.score });
        log::info!("Game lost at level {} with score {}", state.level, state.score);
    }
}

fn level_cleared(state: &mut GameState) {
    state.push_event(GameEvent::LevelCleared { level: state.level });

    if state.level < state.config.max_level {
        state.level += 1;
        generate_level(state);
        state.breather_ticks = state.config.breather_ticks;
        state.phase = GamePhase::LevelCleared;
    } else {
        state.phase = GamePhase::GameWon;
        state.push_event(GameEvent::GameWon { score: state.score });
        log::info!("Game won with score {}", state.score);
    }
}

/// Fill the grid for the current level
///
/// Even rows are full; odd rows skip their last column so the staggered
/// row stays inside the arena. Rows past the second may hold power pieces.
pub fn generate_level(state: &mut GameState) {
    state.grid.clear();
    let rows = state.config.rows_for_level(state.level) as i32;
    let width = state.grid.width();
    let power_chance = state.config.power_chance;

    let mut powers = 0u32;
    for row in 0..rows {
        for col in 0..width {
            let cell = Cell::new(row, col);
            if cell.is_odd_row() && col == width - 1 {
                continue;
            }

            let is_power = state.rng.random::<f64>() < power_chance && row > 1;
            let piece = if is_power {
                powers += 1;
                Piece::power(Vec2::ZERO)
            } else {
                Piece::new(Vec2::ZERO, state.random_color())
            };
            if let Err(e) = state.grid.place(cell, piece) {
                log::warn!("Level generation skipped a cell: {e}");
            }
        }
    }

    log::info!(
        "Level {}: rows={}, pieces={}, power={}",
        state.level,
        rows,
        state.grid.len(),
        powers
    );
}

/// Aim for idle/demo mode
///
/// Targets the lowest piece matching the shooter colour, with a small
/// time-based wobble so repeated shots don't retrace the same path.
fn autoplay_aim(state: &GameState) -> f32 {
    let shooter = state.config.shooter_position();
    let target = state
        .grid
        .pieces()
        .filter(|p| p.color == state.shooter_color)
        .max_by(|a, b| {
            a.pos
                .y
                .partial_cmp(&b.pos.y)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|p| p.pos);

    let wobble = (state.time_ticks as f32 * 0.37).sin() * 4.0;
    let aim = match target {
        Some(pos) => aim_toward(shooter, pos),
        None => -90.0,
    };
    (aim + wobble).clamp(-170.0, -10.0)
}
