use std::ops::Range;

/// Half-open rectangle `[row_start, row_end) x [col_start, col_end)` of lattice
/// coordinates. A rectangle with no rows or no columns is valid and empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub row_start: usize,
    pub row_end: usize,
    pub col_start: usize,
    pub col_end: usize,
}

impl Region {
    pub fn new(rows: Range<usize>, cols: Range<usize>) -> Self {
        Self {
            row_start: rows.start,
            row_end: rows.end,
            col_start: cols.start,
            col_end: cols.end,
        }
    }

    /// The full `size x size` lattice.
    pub fn whole(size: usize) -> Self {
        Self::new(0..size, 0..size)
    }

    /// Central quarter-area square `[size/4, 3*size/4)` on both axes.
    pub fn centered(size: usize) -> Self {
        let lo = size / 4;
        let hi = 3 * size / 4;
        Self::new(lo..hi, lo..hi)
    }

    pub fn rows(&self) -> Range<usize> {
        self.row_start..self.row_end
    }

    pub fn cols(&self) -> Range<usize> {
        self.col_start..self.col_end
    }

    pub fn area(&self) -> usize {
        self.rows().len() * self.cols().len()
    }

    pub fn is_empty(&self) -> bool {
        self.area() == 0
    }

    /// Coordinates are compared as given; callers pass in-range coordinates.
    #[inline]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.rows().contains(&row) && self.cols().contains(&col)
    }

    /// Whether the bounds are ordered and lie inside a `size x size` lattice.
    pub fn fits(&self, size: usize) -> bool {
        self.row_start <= self.row_end
            && self.col_start <= self.col_end
            && self.row_end <= size
            && self.col_end <= size
    }
}
