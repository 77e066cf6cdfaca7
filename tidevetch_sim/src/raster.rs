// Competition raster: per-cell habitat classes on a 1.0-unit grid.
//
// Each cell carries an integer competition class used to look up vital rates
// (see `vitals.rs`). Channel cells carry the `OPEN_WATER` sentinel, which
// maps to zero survival and zero fecundity and marks drop points where a
// seed is already in the water.
//
// Out of bounds is `None`, not a default class: a seed implanting off the
// mapped area is lost (and counted in the run diagnostics), never silently
// placed.

use crate::types::{GridCell, Point};
use serde::{Deserialize, Serialize};

/// Raster class for open water (the river channel itself).
pub const OPEN_WATER: i32 = -9999;

/// A row-major grid of competition classes. Cells are 1.0 x 1.0 map units,
/// anchored at `origin` (the lower-left corner of cell (0, 0)).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompetitionRaster {
    width: u32,
    height: u32,
    origin: Point,
    classes: Vec<i32>,
}

impl CompetitionRaster {
    pub fn new(width: u32, height: u32, origin: Point, classes: Vec<i32>) -> Self {
        assert_eq!(
            classes.len(),
            (width as usize) * (height as usize),
            "class vector must cover the whole grid"
        );
        Self {
            width,
            height,
            origin,
            classes,
        }
    }

    /// A raster with every cell set to `class`.
    pub fn filled(width: u32, height: u32, origin: Point, class: i32) -> Self {
        Self::new(
            width,
            height,
            origin,
            vec![class; (width as usize) * (height as usize)],
        )
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    /// The cell containing `p`, or None if `p` lies off the grid.
    pub fn cell_of(&self, p: Point) -> Option<GridCell> {
        let dx = p.x - self.origin.x;
        let dy = p.y - self.origin.y;
        if dx < 0.0 || dy < 0.0 {
            return None;
        }
        let x = dx.floor() as u32;
        let y = dy.floor() as u32;
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(GridCell::new(x, y))
    }

    /// The competition class of a cell. Panics if the cell is off the grid;
    /// callers obtain cells from `cell_of`, which already bounds-checks.
    pub fn class_at(&self, cell: GridCell) -> i32 {
        assert!(
            cell.x < self.width && cell.y < self.height,
            "cell {cell} outside {}x{} raster",
            self.width,
            self.height
        );
        self.classes[cell.y as usize * self.width as usize + cell.x as usize]
    }

    /// Overwrite one cell's class (landscape builders only).
    pub fn set_class(&mut self, cell: GridCell, class: i32) {
        assert!(
            cell.x < self.width && cell.y < self.height,
            "cell {cell} outside {}x{} raster",
            self.width,
            self.height
        );
        self.classes[cell.y as usize * self.width as usize + cell.x as usize] = class;
    }
}
