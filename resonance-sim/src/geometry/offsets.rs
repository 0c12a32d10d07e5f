/// Forward neighbor offsets of the square lattice: one unit vector per axis.
///
/// Returns `[[1, 0], [0, 1]]` (down one row, right one column). Backward
/// neighbors are the negated offsets, giving coordination number 4.
pub fn square() -> [[isize; 2]; 2] {
    [[1, 0], [0, 1]]
}
