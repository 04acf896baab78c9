//! Grid store - fixed-size tile matrix with copy-on-write rows

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::buildings::BuildingKind;

pub const BASE_LAND_VALUE: u8 = 5;
pub const MAX_LAND_VALUE: u8 = 10;

pub const DEFAULT_WIDTH: u32 = 20;
pub const DEFAULT_HEIGHT: u32 = 15;
/// Largest accepted width or height. Keeps the full-grid recompute bounded.
pub const MAX_SIDE: u32 = 1024;

/// Tile position in the grid. Signed so untrusted input can be represented
/// before it is bounds-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance: influence zones are squares, not circles.
    pub fn distance(self, other: Position) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        dx.max(dy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "kind", rename_all = "snake_case")]
pub enum Occupancy {
    Empty,
    Occupied(BuildingKind),
}

impl Occupancy {
    pub fn building(self) -> Option<BuildingKind> {
        match self {
            Occupancy::Empty => None,
            Occupancy::Occupied(kind) => Some(kind),
        }
    }

    pub fn is_empty(self) -> bool {
        matches!(self, Occupancy::Empty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub position: Position,
    pub occupancy: Occupancy,
    pub land_value: u8,
}

/// Immutable grid value. Cloning is cheap and every update returns a new grid
/// that shares all untouched rows with its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: u32,
    height: u32,
    rows: Vector<Vector<GridCell>>,
}

impl Grid {
    pub fn create(width: u32, height: u32) -> Self {
        let rows = (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| GridCell {
                        position: Position::new(x as i32, y as i32),
                        occupancy: Occupancy::Empty,
                        land_value: BASE_LAND_VALUE,
                    })
                    .collect::<Vector<_>>()
            })
            .collect();
        Self {
            width,
            height,
            rows,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some()
    }

    /// Cell at `(x, y)`, or `None` outside `[0, width) x [0, height)`.
    pub fn get(&self, x: i32, y: i32) -> Option<&GridCell> {
        let (col, row) = self.index(x, y)?;
        self.rows.get(row).and_then(|cells| cells.get(col))
    }

    /// Returns a new grid with the cell at `(x, y)` rewritten by `edit`.
    /// Only the touched row is rebuilt; `self` is left as it was.
    pub fn update<F>(&self, x: i32, y: i32, edit: F) -> Option<Grid>
    where
        F: FnOnce(&mut GridCell),
    {
        let (col, row) = self.index(x, y)?;
        let mut cells = self.rows.get(row)?.clone();
        let mut cell = *cells.get(col)?;
        edit(&mut cell);
        // Position is owned by the grid, not the editor.
        cell.position = Position::new(x, y);
        cells.set(col, cell);
        let mut rows = self.rows.clone();
        rows.set(row, cells);
        Some(Grid {
            width: self.width,
            height: self.height,
            rows,
        })
    }

    pub fn with_occupancy(&self, x: i32, y: i32, occupancy: Occupancy) -> Option<Grid> {
        self.update(x, y, |cell| cell.occupancy = occupancy)
    }

    /// Row-major iteration over every cell.
    pub fn cells(&self) -> impl Iterator<Item = &GridCell> + '_ {
        self.rows.iter().flat_map(|row| row.iter())
    }

    pub fn occupied(&self) -> impl Iterator<Item = (Position, BuildingKind)> + '_ {
        self.cells()
            .filter_map(|cell| cell.occupancy.building().map(|kind| (cell.position, kind)))
    }

    fn index(&self, x: i32, y: i32) -> Option<(usize, usize)> {
        let col = u32::try_from(x).ok().filter(|col| *col < self.width)?;
        let row = u32::try_from(y).ok().filter(|row| *row < self.height)?;
        Some((col as usize, row as usize))
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::create(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}
