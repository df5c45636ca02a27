//! An owned, generic 2D grid.
//!
//! [`Grid`] stores one value per cell of a fixed `[0,width) × [0,height)`
//! rectangle in row-major order. Reads through [`Grid::at`] are total;
//! writes and indexing treat an out-of-range point as a caller bug and
//! panic.

use std::ops::{Index, IndexMut};

use crate::geom::{Point, Range};

/// A fixed-size 2D grid of `T` values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid<T> {
    cells: Vec<T>,
    bounds: Range,
}

impl<T: Clone> Grid<T> {
    /// Create a new `width × height` grid with every cell set to `fill`.
    ///
    /// Negative dimensions are treated as zero.
    pub fn new(width: i32, height: i32, fill: T) -> Self {
        let (w, h) = (width.max(0), height.max(0));
        Self {
            cells: vec![fill; (w as usize) * (h as usize)],
            bounds: Range::new(0, 0, w, h),
        }
    }

    /// Get a copy of the value at `p`, or `None` if out of bounds.
    pub fn at(&self, p: Point) -> Option<T> {
        self.get(p).cloned()
    }

    /// Overwrite every cell with `value`.
    pub fn fill(&mut self, value: T) {
        self.cells.fill(value);
    }
}

impl<T> Grid<T> {
    /// Build a grid by evaluating `f` at every point.
    pub fn from_fn(width: i32, height: i32, mut f: impl FnMut(Point) -> T) -> Self {
        let bounds = Range::new(0, 0, width.max(0), height.max(0));
        Self {
            cells: bounds.iter().map(&mut f).collect(),
            bounds,
        }
    }

    /// The bounding range `[0,width) × [0,height)`.
    pub fn bounds(&self) -> Range {
        self.bounds
    }

    /// Size as a Point (width = x, height = y).
    pub fn size(&self) -> Point {
        self.bounds.size()
    }

    pub fn width(&self) -> i32 {
        self.bounds.width()
    }

    pub fn height(&self) -> i32 {
        self.bounds.height()
    }

    /// Whether the cell storage matches the bounds. Always true for grids
    /// built through this API; deserialized grids should be checked before
    /// they are indexed.
    pub fn is_well_formed(&self) -> bool {
        self.bounds.min == Point::ZERO && self.cells.len() == self.bounds.len()
    }

    /// Whether the grid contains the given point.
    pub fn contains(&self, p: Point) -> bool {
        self.bounds.contains(p)
    }

    fn index_of(&self, p: Point) -> Option<usize> {
        if !self.bounds.contains(p) {
            return None;
        }
        Some((p.y * self.bounds.width() + p.x) as usize)
    }

    /// Borrow the value at `p`, or `None` if out of bounds.
    pub fn get(&self, p: Point) -> Option<&T> {
        self.index_of(p).map(|i| &self.cells[i])
    }

    /// Mutably borrow the value at `p`, or `None` if out of bounds.
    pub fn get_mut(&mut self, p: Point) -> Option<&mut T> {
        self.index_of(p).map(|i| &mut self.cells[i])
    }

    /// Set the value at `p`.
    ///
    /// # Panics
    ///
    /// Panics if `p` is outside the grid.
    pub fn set(&mut self, p: Point, value: T) {
        self[p] = value;
    }

    /// Count how many cells equal `value`.
    pub fn count(&self, value: &T) -> usize
    where
        T: PartialEq,
    {
        self.cells.iter().filter(|c| *c == value).count()
    }

    /// Count how many cells satisfy a predicate.
    pub fn count_fn(&self, mut f: impl FnMut(Point, &T) -> bool) -> usize {
        self.iter().filter(|(p, c)| f(*p, c)).count()
    }

    /// Iterate over `(Point, &T)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Point, &T)> + '_ {
        self.bounds.iter().zip(self.cells.iter())
    }

    /// A new grid of the same size with `f` applied to every cell.
    pub fn map<U>(&self, mut f: impl FnMut(Point, &T) -> U) -> Grid<U> {
        Grid {
            cells: self.iter().map(|(p, c)| f(p, c)).collect(),
            bounds: self.bounds,
        }
    }

    /// Rows as slices, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> + '_ {
        self.cells.chunks(self.bounds.width().max(1) as usize)
    }
}

impl<T> Index<Point> for Grid<T> {
    type Output = T;

    fn index(&self, p: Point) -> &T {
        match self.index_of(p) {
            Some(i) => &self.cells[i],
            None => panic!("point {p} outside grid {}", self.bounds),
        }
    }
}

impl<T> IndexMut<Point> for Grid<T> {
    fn index_mut(&mut self, p: Point) -> &mut T {
        match self.index_of(p) {
            Some(i) => &mut self.cells[i],
            None => panic!("point {p} outside grid {}", self.bounds),
        }
    }
}
