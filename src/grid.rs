//! Toroidal grid storage shared by all automata.
//!
//! Every coordinate is valid: columns and rows wrap around, so `x` and
//! `x + k * width` address the same cell for any integer `k`, negative
//! values included.

use crate::error::{ensure_dimension, SimError};
use std::fmt;

/// A normalized cell position `(x, y)`.
pub type Coord = (usize, usize);

/// Unit offsets in the fixed order North, East, South, West.
pub const NEIGHBOUR_OFFSETS: [(i64, i64); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// Reduce `value` into `0..extent`, wrapping negative values around.
#[inline]
pub fn wrap(value: i64, extent: usize) -> usize {
    let extent = extent as i64;
    ((extent + value % extent) % extent) as usize
}

/// Fixed-size 2-D storage of optional entities with wraparound addressing.
///
/// A single-lane road is a grid of height 1; a two-lane road uses one row
/// per lane.
#[derive(Clone, PartialEq, Eq)]
pub struct ToroidalGrid<T> {
    width: usize,
    height: usize,
    /// cells[y * width + x]
    cells: Vec<Option<T>>,
}

impl<T> ToroidalGrid<T> {
    /// Create an empty grid. Both extents must be at least 1.
    pub fn new(width: usize, height: usize) -> Result<Self, SimError> {
        ensure_dimension("width", width, 1)?;
        ensure_dimension("height", height, 1)?;

        let mut cells = Vec::with_capacity(width * height);
        cells.resize_with(width * height, || None);

        Ok(Self {
            width,
            height,
            cells,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Wrap an arbitrary coordinate onto the grid.
    #[inline]
    pub fn normalize(&self, x: i64, y: i64) -> Coord {
        (wrap(x, self.width), wrap(y, self.height))
    }

    #[inline]
    fn index(&self, x: i64, y: i64) -> usize {
        let (x, y) = self.normalize(x, y);
        y * self.width + x
    }

    /// Occupant of a cell, if any.
    #[inline]
    pub fn get(&self, x: i64, y: i64) -> Option<&T> {
        self.cells[self.index(x, y)].as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, x: i64, y: i64) -> Option<&mut T> {
        let idx = self.index(x, y);
        self.cells[idx].as_mut()
    }

    /// Overwrite a cell, returning its previous occupant.
    #[inline]
    pub fn set(&mut self, x: i64, y: i64, value: Option<T>) -> Option<T> {
        let idx = self.index(x, y);
        std::mem::replace(&mut self.cells[idx], value)
    }

    /// Remove and return the occupant of a cell.
    #[inline]
    pub fn take(&mut self, x: i64, y: i64) -> Option<T> {
        let idx = self.index(x, y);
        self.cells[idx].take()
    }

    #[inline]
    pub fn is_free(&self, x: i64, y: i64) -> bool {
        self.get(x, y).is_none()
    }

    /// The four neighbours of a cell, North, East, South, West.
    pub fn neighbours(&self, x: i64, y: i64) -> [Coord; 4] {
        NEIGHBOUR_OFFSETS.map(|(dx, dy)| self.normalize(x + dx, y + dy))
    }

    /// Empty neighbours, in neighbour order.
    ///
    /// On grids narrower than three cells the same cell can appear more
    /// than once, and a cell can be its own neighbour.
    pub fn free_neighbours(&self, x: i64, y: i64) -> Vec<Coord> {
        self.neighbours(x, y)
            .into_iter()
            .filter(|&(nx, ny)| self.is_free(nx as i64, ny as i64))
            .collect()
    }

    /// Occupied neighbours whose occupant satisfies `predicate`, in
    /// neighbour order.
    pub fn neighbours_matching<F>(&self, x: i64, y: i64, predicate: F) -> Vec<Coord>
    where
        F: Fn(&T) -> bool,
    {
        self.neighbours(x, y)
            .into_iter()
            .filter(|&(nx, ny)| self.get(nx as i64, ny as i64).is_some_and(&predicate))
            .collect()
    }

    /// An empty grid with the same extents.
    pub fn blank(&self) -> Self {
        let mut cells = Vec::with_capacity(self.cells.len());
        cells.resize_with(self.cells.len(), || None);

        Self {
            width: self.width,
            height: self.height,
            cells,
        }
    }

    /// Remove every occupant.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = None;
        }
    }

    /// Occupied cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &T)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(idx, cell)| cell.as_ref().map(|v| ((idx % width, idx / width), v)))
    }

    /// Occupied cells of one row, ascending by column.
    pub fn row(&self, y: i64) -> impl Iterator<Item = (usize, &T)> + '_ {
        let start = wrap(y, self.height) * self.width;
        self.cells[start..start + self.width]
            .iter()
            .enumerate()
            .filter_map(|(x, cell)| cell.as_ref().map(|v| (x, v)))
    }

    /// Number of occupied cells.
    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

impl<T: fmt::Debug> fmt::Debug for ToroidalGrid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToroidalGrid")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("occupied", &self.occupied())
            .finish()
    }
}
