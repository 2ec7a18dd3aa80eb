// THEORY:
// The `Mask` is the boolean twin of the pixel grid. A `true` cell is foreground
// that no cluster has claimed yet; a `false` cell is either background or already
// owned by a cluster.
//
// Key architectural principles:
// 1.  **Destructive visitation**: The mask doubles as the visited set. Claiming a
//     cell flips it from `true` to `false`, so it can never be claimed twice. After a
//     complete labeling run every cell is `false`.
// 2.  **Forgiving bounds**: `claim` takes signed coordinates and treats anything off
//     the grid as "nothing to claim". The flood fill pushes neighbors unconditionally
//     and relies on this.
// 3.  **Exclusive ownership**: The cluster stage borrows the mask mutably for the whole
//     run, so no other code can observe or race a half-claimed mask.

use crate::core_modules::cluster::Coord;

/// A rectangular boolean grid, `true` meaning unclaimed foreground.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl Mask {
    /// An all-background mask.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    /// Builds a mask by evaluating `f(row, col)` for every cell.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut cells = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                cells.push(f(row, col));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    /// Builds a mask from text rows, `#` marking foreground. Handy for fixtures.
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.chars().count());
        Self::from_fn(width, height, |row, col| rows[row].chars().nth(col) == Some('#'))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Reads a cell. Out of bounds reads as background.
    pub fn get(&self, row: usize, col: usize) -> bool {
        row < self.height && col < self.width && self.cells[row * self.width + col]
    }

    pub fn set(&mut self, coord: Coord, value: bool) {
        if coord.row < self.height && coord.col < self.width {
            self.cells[coord.row * self.width + coord.col] = value;
        }
    }

    /// Transitions a cell from `true` to `false`.
    /// Returns `true` only if this call performed the transition; off-grid
    /// coordinates and already-`false` cells return `false`.
    pub fn claim(&mut self, row: isize, col: isize) -> bool {
        if row < 0 || col < 0 {
            return false;
        }
        let (row, col) = (row as usize, col as usize);
        if row >= self.height || col >= self.width {
            return false;
        }

        let cell = &mut self.cells[row * self.width + col];
        let was_set = *cell;
        *cell = false;
        was_set
    }

    /// Number of `true` cells.
    pub fn count_foreground(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell).count()
    }

    /// Whether every cell is `false`.
    pub fn is_exhausted(&self) -> bool {
        !self.cells.iter().any(|&cell| cell)
    }

    /// Coordinates of every `true` cell in row-major order.
    pub fn foreground(&self) -> Vec<Coord> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell)
            .map(|(index, _)| Coord::new(index / self.width, index % self.width))
            .collect()
    }
}
