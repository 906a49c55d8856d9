use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoordinate {
    pub row: i32,
    pub column: i32,
}

impl GridCoordinate {
    pub const fn new(row: i32, column: i32) -> Self {
        GridCoordinate { row, column }
    }

    /// `None` when either component overflows.
    pub fn offset(self, d_row: i32, d_column: i32) -> Option<Self> {
        Some(GridCoordinate {
            row: self.row.checked_add(d_row)?,
            column: self.column.checked_add(d_column)?,
        })
    }

    // Differences are taken in i64 so extreme coordinates cannot overflow.
    fn deltas(self, other: GridCoordinate) -> (u64, u64) {
        (
            (i64::from(self.row) - i64::from(other.row)).unsigned_abs(),
            (i64::from(self.column) - i64::from(other.column)).unsigned_abs(),
        )
    }

    pub fn manhattan(self, other: GridCoordinate) -> usize {
        let (d_row, d_column) = self.deltas(other);
        (d_row + d_column) as usize
    }

    pub fn chebyshev(self, other: GridCoordinate) -> usize {
        let (d_row, d_column) = self.deltas(other);
        d_row.max(d_column) as usize
    }
}

impl From<(i32, i32)> for GridCoordinate {
    fn from((row, column): (i32, i32)) -> Self {
        GridCoordinate { row, column }
    }
}

impl fmt::Display for GridCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}
