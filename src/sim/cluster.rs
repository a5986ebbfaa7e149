//! Cluster resolution
//!
//! Graph searches over the grid's occupancy: same-colour components, ceiling
//! connectivity, and the power effect. Each traversal keeps its own visited
//! set and an explicit stack, so nothing is marked on the pieces themselves.

use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::IndexedRandom;

use super::grid::Grid;
use super::state::{Cell, Piece, PieceColor};
use crate::consts::{SCORE_PER_FLOATING, SCORE_PER_MATCHED, SCORE_PER_POWERED};

/// What a landing removed and what it scored
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchResult {
    /// Pieces of the matched cluster
    pub matched: Vec<Piece>,
    /// Whether a power piece was part of the cluster
    pub power_activated: bool,
    /// Colour the power effect picked (`None` if the grid was already empty)
    pub power_color: Option<PieceColor>,
    /// Pieces removed by the power effect
    pub powered: Vec<Piece>,
    /// Pieces dropped for losing their ceiling connection
    pub floating: Vec<Piece>,
    /// Total score awarded
    pub score: u64,
}

impl MatchResult {
    /// True when nothing was removed
    pub fn is_empty(&self) -> bool {
        self.matched.is_empty()
    }

    pub fn removed_count(&self) -> usize {
        self.matched.len() + self.powered.len() + self.floating.len()
    }
}

/// Same-colour connected component containing `seed`
///
/// Returns an empty set if `seed` is unoccupied.
pub fn find_same_color_cluster(grid: &Grid, seed: Cell) -> BTreeSet<Cell> {
    let mut cluster = BTreeSet::new();
    let Some(color) = grid.get(seed).map(|p| p.color) else {
        return cluster;
    };

    let mut stack = vec![seed];
    cluster.insert(seed);
    while let Some(cell) = stack.pop() {
        for next in grid.neighbors_in_bounds(cell) {
            if cluster.contains(&next) {
                continue;
            }
            if grid.get(next).is_some_and(|p| p.color == color) {
                cluster.insert(next);
                stack.push(next);
            }
        }
    }
    cluster
}

/// Occupied cells with no path to row 0
pub fn find_floating_pieces(grid: &Grid) -> BTreeSet<Cell> {
    let mut anchored: BTreeSet<Cell> = grid.occupied_cells().filter(|c| c.row == 0).collect();
    let mut stack: Vec<Cell> = anchored.iter().copied().collect();

    while let Some(cell) = stack.pop() {
        for next in grid.neighbors_in_bounds(cell) {
            if grid.is_occupied(next) && anchored.insert(next) {
                stack.push(next);
            }
        }
    }

    grid.occupied_cells()
        .filter(|c| !anchored.contains(c))
        .collect()
}

/// Remove every piece of one colour picked uniformly among those present
///
/// The pick is independent of the colour that triggered it.
pub fn activate_power<R: Rng + ?Sized>(grid: &mut Grid, rng: &mut R) -> (Option<PieceColor>, Vec<Piece>) {
    let colors = grid.colors_present();
    match colors.choose(rng).copied() {
        Some(color) => (Some(color), grid.remove_color(color)),
        None => (None, Vec::new()),
    }
}

/// Resolve a landing at `seed`
///
/// Clusters smaller than `threshold` change nothing. Otherwise the cluster is
/// removed, the power effect runs if a power piece was in it, and then every
/// piece cut off from the ceiling (strays included) is dropped.
pub fn resolve_match<R: Rng + ?Sized>(
    grid: &mut Grid,
    seed: Cell,
    threshold: usize,
    rng: &mut R,
) -> MatchResult {
    let cluster = find_same_color_cluster(grid, seed);
    if cluster.is_empty() || cluster.len() < threshold {
        return MatchResult::default();
    }

    let matched = grid.remove_all(&cluster);
    let mut result = MatchResult {
        score: matched.len() as u64 * SCORE_PER_MATCHED,
        power_activated: matched.iter().any(|p| p.is_power),
        matched,
        ..Default::default()
    };

    if result.power_activated {
        let (color, powered) = activate_power(grid, rng);
        result.score += powered.len() as u64 * SCORE_PER_POWERED;
        result.power_color = color;
        result.powered = powered;
    }

    let floating = find_floating_pieces(grid);
    let mut dropped = grid.remove_all(&floating);
    dropped.extend(grid.take_strays());
    result.score += dropped.len() as u64 * SCORE_PER_FLOATING;
    result.floating = dropped;

    log::debug!(
        "Cluster at ({}, {}): matched={} powered={} floating={} score=+{}",
        seed.row,
        seed.col,
        result.matched.len(),
        result.powered.len(),
        result.floating.len(),
        result.score
    );

    result
}
