//! Fixed-size per-sensor pixel grids.

use std::ops::{Index, IndexMut};

/// Number of sensors on the focal plane.
pub const SENSOR_COUNT: usize = 12;

/// Grid dimensions. `x` indexes rows, `y` indexes columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridShape {
    pub rows: usize,
    pub cols: usize,
}

impl GridShape {
    /// One sensor: 64 rows (raw x) by 200 columns (raw y).
    pub const SENSOR: GridShape = GridShape::new(64, 200);

    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    pub const fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.rows && (y as usize) < self.cols
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.rows && y < self.cols);
        x * self.cols + y
    }
}

impl std::fmt::Display for GridShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// Row-major 2D buffer addressed by `(x, y)`.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelGrid<T> {
    shape: GridShape,
    pixels: Vec<T>,
}

/// Per-pixel variability of one sensor.
pub type VariabilityGrid = PixelGrid<f64>;

impl<T: Copy> PixelGrid<T> {
    pub fn new_filled(shape: GridShape, value: T) -> Self {
        Self {
            shape,
            pixels: vec![value; shape.len()],
        }
    }

    pub fn from_vec(shape: GridShape, pixels: Vec<T>) -> Self {
        assert_eq!(
            pixels.len(),
            shape.len(),
            "pixel count does not match grid shape {shape}"
        );
        Self { shape, pixels }
    }

    /// Builds a grid by evaluating `f(x, y)` for every cell.
    pub fn from_fn(shape: GridShape, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut pixels = Vec::with_capacity(shape.len());
        for x in 0..shape.rows {
            for y in 0..shape.cols {
                pixels.push(f(x, y));
            }
        }
        Self { shape, pixels }
    }

    #[inline]
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.shape.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.shape.cols
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<T> {
        (x < self.shape.rows && y < self.shape.cols).then(|| self.pixels[self.shape.index(x, y)])
    }

    pub fn pixels(&self) -> &[T] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [T] {
        &mut self.pixels
    }

    pub fn row(&self, x: usize) -> &[T] {
        let start = x * self.shape.cols;
        &self.pixels[start..start + self.shape.cols]
    }

    /// Iterates `((x, y), value)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = ((usize, usize), T)> + '_ {
        let cols = self.shape.cols;
        self.pixels
            .iter()
            .enumerate()
            .map(move |(i, &v)| ((i / cols, i % cols), v))
    }

    pub fn into_vec(self) -> Vec<T> {
        self.pixels
    }
}

impl<T: Copy> Index<(usize, usize)> for PixelGrid<T> {
    type Output = T;

    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &T {
        &self.pixels[self.shape.index(x, y)]
    }
}

impl<T: Copy> IndexMut<(usize, usize)> for PixelGrid<T> {
    #[inline]
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut T {
        let i = self.shape.index(x, y);
        &mut self.pixels[i]
    }
}
