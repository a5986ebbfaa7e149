//! Staggered hex-like grid
//!
//! Odd rows are shifted right by one radius. Column pitch is `2r`, row pitch
//! `1.8r`, so each cell touches six others: two on its own row and two on
//! each adjacent row. Which columns those diagonal neighbours sit in depends
//! on the parity of the row.

use std::collections::BTreeMap;

use glam::Vec2;

use super::state::{Cell, Piece, PieceColor};
use crate::consts::ROW_PITCH;
use crate::error::GridError;

/// Owns every placed piece
#[derive(Debug, Clone)]
pub struct Grid {
    width: i32,
    height: i32,
    radius: f32,
    /// Indexed pieces, iterated in (row, col) order
    cells: BTreeMap<Cell, Piece>,
    /// Fallback placements with no grid address
    strays: Vec<Piece>,
}

impl Grid {
    pub fn new(width: u32, height: u32, radius: f32) -> Self {
        Self {
            width: width.min(i32::MAX as u32) as i32,
            height: height.min(i32::MAX as u32) as i32,
            radius,
            cells: BTreeMap::new(),
            strays: Vec::new(),
        }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[inline]
    pub fn in_bounds(&self, cell: Cell) -> bool {
        (0..self.height).contains(&cell.row) && (0..self.width).contains(&cell.col)
    }

    fn check_bounds(&self, cell: Cell) -> Result<(), GridError> {
        if self.in_bounds(cell) {
            Ok(())
        } else {
            Err(GridError::OutOfBounds {
                row: cell.row,
                col: cell.col,
            })
        }
    }

    /// Pixel centre of a cell
    pub fn cell_to_pixel(&self, cell: Cell) -> Vec2 {
        let r = self.radius;
        let mut x = cell.col as f32 * r * 2.0 + r;
        if cell.is_odd_row() {
            x += r;
        }
        let y = cell.row as f32 * r * ROW_PITCH + r;
        Vec2::new(x, y)
    }

    /// The six adjacent addresses, unfiltered
    ///
    /// Even rows take their diagonals from `col - 1`, odd rows from `col + 1`.
    pub fn neighbors_of(cell: Cell) -> [Cell; 6] {
        let Cell { row, col } = cell;
        let diag = if cell.is_odd_row() { col + 1 } else { col - 1 };
        [
            Cell::new(row, col - 1),
            Cell::new(row, col + 1),
            Cell::new(row - 1, col),
            Cell::new(row + 1, col),
            Cell::new(row - 1, diag),
            Cell::new(row + 1, diag),
        ]
    }

    /// Adjacent addresses that lie inside the grid
    pub fn neighbors_in_bounds(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        Self::neighbors_of(cell)
            .into_iter()
            .filter(move |c| self.in_bounds(*c))
    }

    #[inline]
    pub fn get(&self, cell: Cell) -> Option<&Piece> {
        self.cells.get(&cell)
    }

    #[inline]
    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.cells.contains_key(&cell)
    }

    /// Free in-bounds neighbour of `anchor` closest to `target`
    ///
    /// Ties keep the earlier candidate in [`Grid::neighbors_of`] order.
    pub fn nearest_free_neighbor(&self, anchor: Cell, target: Vec2) -> Result<Cell, GridError> {
        let mut best: Option<(Cell, f32)> = None;
        for cell in self.neighbors_in_bounds(anchor) {
            if self.is_occupied(cell) {
                continue;
            }
            let dist = self.cell_to_pixel(cell).distance_squared(target);
            if best.is_none_or(|(_, d)| dist < d) {
                best = Some((cell, dist));
            }
        }
        best.map(|(cell, _)| cell).ok_or(GridError::NoFreeNeighbor {
            row: anchor.row,
            col: anchor.col,
        })
    }

    /// Row-0 cell under a ceiling landing at horizontal position `x`
    pub fn place_at_top_nearest(&self, x: f32) -> Cell {
        let r = self.radius;
        let col = ((x - r) / (2.0 * r)).round_ties_even();
        let max_col = (self.width - 1).max(0);
        let col = if col.is_nan() { 0 } else { (col as i32).clamp(0, max_col) };
        Cell::new(0, col)
    }

    /// Put `piece` at `cell`, snapping its position to the cell centre
    pub fn place(&mut self, cell: Cell, mut piece: Piece) -> Result<(), GridError> {
        self.check_bounds(cell)?;
        if self.is_occupied(cell) {
            return Err(GridError::OccupiedCell {
                row: cell.row,
                col: cell.col,
            });
        }
        piece.cell = Some(cell);
        piece.pos = self.cell_to_pixel(cell);
        self.cells.insert(cell, piece);
        Ok(())
    }

    /// Keep `piece` at its literal position with no grid address
    pub fn place_stray(&mut self, mut piece: Piece) {
        piece.cell = None;
        self.strays.push(piece);
    }

    /// Remove the pieces at `cells`, returning those that existed
    pub fn remove_all<'a>(&mut self, cells: impl IntoIterator<Item = &'a Cell>) -> Vec<Piece> {
        cells
            .into_iter()
            .filter_map(|cell| self.cells.remove(cell))
            .collect()
    }

    /// Remove every piece of `color`, strays included
    pub fn remove_color(&mut self, color: PieceColor) -> Vec<Piece> {
        let cells: Vec<Cell> = self
            .cells
            .iter()
            .filter(|(_, p)| p.color == color)
            .map(|(c, _)| *c)
            .collect();
        let mut removed = self.remove_all(&cells);
        let (gone, kept): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.strays).into_iter().partition(|p| p.color == color);
        self.strays = kept;
        removed.extend(gone);
        removed
    }

    /// Remove and return all strays
    pub fn take_strays(&mut self) -> Vec<Piece> {
        std::mem::take(&mut self.strays)
    }

    /// Distinct colours present, in palette order
    pub fn colors_present(&self) -> Vec<PieceColor> {
        let mut colors: Vec<PieceColor> = self.pieces().map(|p| p.color).collect();
        colors.sort_unstable();
        colors.dedup();
        colors
    }

    /// Occupied addresses in (row, col) order
    pub fn occupied_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells.keys().copied()
    }

    /// Every placed piece: indexed ones in (row, col) order, then strays
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.cells.values().chain(self.strays.iter())
    }

    /// Number of placed pieces, strays included
    pub fn len(&self) -> usize {
        self.cells.len() + self.strays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() && self.strays.is_empty()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.strays.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn grid() -> Grid {
        Grid::new(15, 12, 20.0)
    }

    fn piece(color: PieceColor) -> Piece {
        Piece::new(Vec2::ZERO, color)
    }

    #[test]
    fn test_cell_to_pixel_stagger() {
        let g = grid();
        assert_eq!(g.cell_to_pixel(Cell::new(0, 0)), Vec2::new(20.0, 20.0));
        assert_eq!(g.cell_to_pixel(Cell::new(0, 10)), Vec2::new(420.0, 20.0));
        assert_eq!(g.cell_to_pixel(Cell::new(1, 0)), Vec2::new(40.0, 56.0));
        assert_eq!(g.cell_to_pixel(Cell::new(2, 1)), Vec2::new(60.0, 92.0));
    }

    #[test]
    fn test_neighbors_even_row() {
        let n = Grid::neighbors_of(Cell::new(2, 5));
        assert!(n.contains(&Cell::new(1, 4)));
        assert!(n.contains(&Cell::new(3, 4)));
        assert!(!n.contains(&Cell::new(1, 6)));
    }

    #[test]
    fn test_neighbors_odd_row() {
        let n = Grid::neighbors_of(Cell::new(1, 1));
        let expected = [
            Cell::new(1, 0),
            Cell::new(1, 2),
            Cell::new(0, 1),
            Cell::new(2, 1),
            Cell::new(0, 2),
            Cell::new(2, 2),
        ];
        assert_eq!(n, expected);
    }

    #[test]
    fn test_neighbors_are_geometrically_adjacent() {
        // Every listed neighbour is within about one diameter of the cell
        let g = grid();
        for row in 0..4 {
            for col in 1..5 {
                let cell = Cell::new(row, col);
                let here = g.cell_to_pixel(cell);
                for n in Grid::neighbors_of(cell) {
                    let d = here.distance(g.cell_to_pixel(n));
                    assert!(d < 2.1 * g.radius(), "{cell:?} -> {n:?} is {d}");
                }
            }
        }
    }

    #[test]
    fn test_place_at_top_nearest() {
        let g = grid();
        assert_eq!(g.place_at_top_nearest(410.0), Cell::new(0, 10));
        assert_eq!(g.place_at_top_nearest(-50.0), Cell::new(0, 0));
        assert_eq!(g.place_at_top_nearest(5000.0), Cell::new(0, 14));
        // (x - r) / 2r = 0.5 rounds to even
        assert_eq!(g.place_at_top_nearest(40.0), Cell::new(0, 0));
        assert_eq!(g.place_at_top_nearest(120.0), Cell::new(0, 2));
    }

    #[test]
    fn test_place_snaps_position_and_rejects_double_occupancy() {
        let mut g = grid();
        let cell = Cell::new(3, 4);
        g.place(cell, piece(PieceColor::Red)).unwrap();
        let placed = g.get(cell).unwrap();
        assert_eq!(placed.cell, Some(cell));
        assert_eq!(placed.pos, g.cell_to_pixel(cell));

        let err = g.place(cell, piece(PieceColor::Blue)).unwrap_err();
        assert_eq!(err, GridError::OccupiedCell { row: 3, col: 4 });
        assert_eq!(g.get(cell).unwrap().color, PieceColor::Red);
    }

    #[test]
    fn test_place_out_of_bounds() {
        let mut g = grid();
        assert_eq!(
            g.place(Cell::new(-1, 0), piece(PieceColor::Red)),
            Err(GridError::OutOfBounds { row: -1, col: 0 })
        );
        assert_eq!(
            g.place(Cell::new(0, 15), piece(PieceColor::Red)),
            Err(GridError::OutOfBounds { row: 0, col: 15 })
        );
        assert!(g.is_empty());
    }

    #[test]
    fn test_nearest_free_neighbor_prefers_closest() {
        let mut g = grid();
        let anchor = Cell::new(0, 5);
        g.place(anchor, piece(PieceColor::Red)).unwrap();
        // Target just below and right of the anchor: the odd-row cell (1, 5)
        let target = g.cell_to_pixel(anchor) + Vec2::new(15.0, 30.0);
        assert_eq!(g.nearest_free_neighbor(anchor, target), Ok(Cell::new(1, 5)));
        // Target to the left lands in the same row
        let target = g.cell_to_pixel(anchor) + Vec2::new(-35.0, 0.0);
        assert_eq!(g.nearest_free_neighbor(anchor, target), Ok(Cell::new(0, 4)));
    }

    #[test]
    fn test_nearest_free_neighbor_none_left() {
        let mut g = Grid::new(2, 1, 20.0);
        g.place(Cell::new(0, 0), piece(PieceColor::Red)).unwrap();
        g.place(Cell::new(0, 1), piece(PieceColor::Red)).unwrap();
        assert_eq!(
            g.nearest_free_neighbor(Cell::new(0, 0), Vec2::ZERO),
            Err(GridError::NoFreeNeighbor { row: 0, col: 0 })
        );
    }

    #[test]
    fn test_remove_all_and_color() {
        let mut g = grid();
        g.place(Cell::new(0, 0), piece(PieceColor::Red)).unwrap();
        g.place(Cell::new(0, 1), piece(PieceColor::Blue)).unwrap();
        g.place(Cell::new(0, 2), piece(PieceColor::Red)).unwrap();
        g.place_stray(Piece::new(Vec2::new(300.0, 300.0), PieceColor::Red));
        assert_eq!(g.len(), 4);
        assert_eq!(g.colors_present(), vec![PieceColor::Red, PieceColor::Blue]);

        let removed = g.remove_all(&[Cell::new(0, 1), Cell::new(5, 5)]);
        assert_eq!(removed.len(), 1);

        let removed = g.remove_color(PieceColor::Red);
        assert_eq!(removed.len(), 3);
        assert!(g.is_empty());
    }

    proptest! {
        #[test]
        fn prop_cell_to_pixel_is_deterministic(row in 0i32..64, col in 0i32..64) {
            let g = grid();
            let cell = Cell::new(row, col);
            prop_assert_eq!(g.cell_to_pixel(cell), g.cell_to_pixel(cell));
        }

        #[test]
        fn prop_six_neighbors_by_parity(row in -64i32..64, col in -64i32..64) {
            let n = Grid::neighbors_of(Cell::new(row, col));
            prop_assert_eq!(n.len(), 6);
            let diag = if row.rem_euclid(2) == 1 { col + 1 } else { col - 1 };
            prop_assert!(n.contains(&Cell::new(row - 1, diag)));
            prop_assert!(n.contains(&Cell::new(row + 1, diag)));
            // Adjacency is symmetric
            for m in n {
                prop_assert!(Grid::neighbors_of(m).contains(&Cell::new(row, col)));
            }
        }
    }
}
