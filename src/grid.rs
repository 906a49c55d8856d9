use crate::coordinate::GridCoordinate;
use crate::error::{Error, Result};

use rand::Rng;
use std::collections::HashMap;
use std::sync::mpsc::{channel, Receiver, Sender};
use tracing::{debug, trace};

pub const DEFAULT_ROW_COUNT: i32 = 16;
pub const DEFAULT_COLUMN_COUNT: i32 = 16;

// Top, top-left, top-right, bottom, bottom-left, bottom-right, left, right.
const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, 0),
    (-1, -1),
    (-1, 1),
    (1, 0),
    (1, -1),
    (1, 1),
    (0, -1),
    (0, 1),
];

/// Field of a [`Grid`] that changed, delivered to every subscriber after the
/// mutation has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridChange {
    RowCount,
    ColumnCount,
    BlockedCells,
    Start,
    Goal,
}

/// Occupancy model: dimensions, impassable cells with an auxiliary cost, and
/// the start/goal pair. Start and goal are never blocked.
#[derive(Debug)]
pub struct Grid {
    row_count: i32,
    column_count: i32,
    blocked_cells: HashMap<GridCoordinate, f64>,
    start: GridCoordinate,
    goal: GridCoordinate,
    observers: Vec<Sender<GridChange>>,
}

impl Default for Grid {
    fn default() -> Self {
        Grid {
            row_count: DEFAULT_ROW_COUNT,
            column_count: DEFAULT_COLUMN_COUNT,
            blocked_cells: HashMap::new(),
            start: GridCoordinate::new(0, 0),
            goal: GridCoordinate::new(DEFAULT_ROW_COUNT - 1, DEFAULT_COLUMN_COUNT - 1),
            observers: Vec::new(),
        }
    }
}

impl Grid {
    pub fn new(row_count: i32, column_count: i32) -> Result<Self> {
        check_dimension("row count", row_count)?;
        check_dimension("column count", column_count)?;
        Ok(Grid {
            row_count,
            column_count,
            goal: GridCoordinate::new((row_count - 1).max(0), (column_count - 1).max(0)),
            ..Grid::default()
        })
    }

    /// Builds a grid from raw fields, validating every invariant.
    pub fn from_parts(
        row_count: i32,
        column_count: i32,
        blocked_cells: impl IntoIterator<Item = (GridCoordinate, f64)>,
        start: GridCoordinate,
        goal: GridCoordinate,
    ) -> Result<Self> {
        let mut grid = Grid::new(row_count, column_count)?;
        grid.check_in_bounds("start", start)?;
        grid.check_in_bounds("goal", goal)?;
        for (cell, cost) in blocked_cells {
            grid.check_in_bounds("blocked cell", cell)?;
            check_cost(cell, cost)?;
            if cell == start || cell == goal {
                return Err(Error::invalid_argument(format!(
                    "start/goal cell {cell} cannot be blocked"
                )));
            }
            grid.blocked_cells.insert(cell, cost);
        }
        grid.start = start;
        grid.goal = goal;
        Ok(grid)
    }

    /// Registers an observer. Disconnected receivers are pruned on the next
    /// notification.
    pub fn subscribe(&mut self) -> Receiver<GridChange> {
        let (tx, rx) = channel();
        self.observers.push(tx);
        rx
    }

    fn notify(&mut self, change: GridChange) {
        trace!("grid change: {change:?}");
        self.observers.retain(|tx| tx.send(change).is_ok());
    }

    pub fn row_count(&self) -> i32 {
        self.row_count
    }

    pub fn column_count(&self) -> i32 {
        self.column_count
    }

    pub fn start(&self) -> GridCoordinate {
        self.start
    }

    pub fn goal(&self) -> GridCoordinate {
        self.goal
    }

    pub fn set_row_count(&mut self, row_count: i32) -> Result<()> {
        check_dimension("row count", row_count)?;
        self.row_count = row_count;
        self.notify(GridChange::RowCount);
        Ok(())
    }

    pub fn set_column_count(&mut self, column_count: i32) -> Result<()> {
        check_dimension("column count", column_count)?;
        self.column_count = column_count;
        self.notify(GridChange::ColumnCount);
        Ok(())
    }

    pub fn set_start(&mut self, start: GridCoordinate) -> Result<()> {
        self.check_in_bounds("start", start)?;
        if self.is_blocked(start) {
            return Err(Error::invalid_argument(format!(
                "start cell {start} is blocked"
            )));
        }
        self.start = start;
        self.notify(GridChange::Start);
        Ok(())
    }

    pub fn set_goal(&mut self, goal: GridCoordinate) -> Result<()> {
        self.check_in_bounds("goal", goal)?;
        if self.is_blocked(goal) {
            return Err(Error::invalid_argument(format!("goal cell {goal} is blocked")));
        }
        self.goal = goal;
        self.notify(GridChange::Goal);
        Ok(())
    }

    pub fn in_bounds(&self, cell: GridCoordinate) -> bool {
        cell.row >= 0
            && cell.column >= 0
            && cell.row < self.row_count
            && cell.column < self.column_count
    }

    fn check_in_bounds(&self, name: &str, cell: GridCoordinate) -> Result<()> {
        if !self.in_bounds(cell) {
            return Err(Error::invalid_argument(format!(
                "{name} {cell} is outside the {}x{} grid",
                self.row_count, self.column_count
            )));
        }
        Ok(())
    }

    pub fn is_blocked(&self, cell: GridCoordinate) -> bool {
        self.blocked_cells.contains_key(&cell)
    }

    pub fn cost_of(&self, cell: GridCoordinate) -> Option<f64> {
        self.blocked_cells.get(&cell).copied()
    }

    pub fn blocked_cells(&self) -> impl Iterator<Item = (GridCoordinate, f64)> + '_ {
        self.blocked_cells.iter().map(|(cell, cost)| (*cell, *cost))
    }

    pub fn blocked_count(&self) -> usize {
        self.blocked_cells.len()
    }

    /// Marks `cell` impassable with the given auxiliary cost. Re-blocking a
    /// cell replaces its cost.
    pub fn block(&mut self, cell: GridCoordinate, cost: f64) -> Result<()> {
        self.check_in_bounds("blocked cell", cell)?;
        if cell == self.start || cell == self.goal {
            return Err(Error::invalid_argument(format!(
                "start/goal cell {cell} cannot be blocked"
            )));
        }
        check_cost(cell, cost)?;
        self.blocked_cells.insert(cell, cost);
        self.notify(GridChange::BlockedCells);
        Ok(())
    }

    pub fn unblock(&mut self, cell: GridCoordinate) -> bool {
        let removed = self.blocked_cells.remove(&cell).is_some();
        if removed {
            self.notify(GridChange::BlockedCells);
        }
        removed
    }

    pub fn clear_blocked(&mut self) {
        self.blocked_cells.clear();
        self.notify(GridChange::BlockedCells);
    }

    /// Blocks each free cell with probability `density`, leaving start and
    /// goal open. Returns how many cells were newly blocked.
    pub fn scatter_obstacles<R: Rng + ?Sized>(
        &mut self,
        density: f64,
        rng: &mut R,
    ) -> Result<usize> {
        if !(0.0..=1.0).contains(&density) {
            return Err(Error::invalid_argument(format!(
                "obstacle density must be within [0, 1], got {density}"
            )));
        }

        let mut added = 0;
        for row in 0..self.row_count {
            for column in 0..self.column_count {
                let cell = GridCoordinate::new(row, column);
                if cell == self.start || cell == self.goal || self.is_blocked(cell) {
                    continue;
                }
                if rng.gen_bool(density) {
                    self.blocked_cells.insert(cell, rng.gen_range(1.0..10.0));
                    added += 1;
                }
            }
        }
        debug!("scattered {added} obstacles with density {density}");
        self.notify(GridChange::BlockedCells);
        Ok(added)
    }

    /// Up to eight in-bounds, unblocked neighbors of `cell`, in a fixed order.
    pub fn neighbors(&self, cell: GridCoordinate) -> Vec<GridCoordinate> {
        NEIGHBOR_OFFSETS
            .iter()
            .filter_map(|&(d_row, d_column)| cell.offset(d_row, d_column))
            .filter(|&neighbor| self.in_bounds(neighbor) && !self.is_blocked(neighbor))
            .collect()
    }

    /// Replaces every field with the contents of `other`. Goal and start are
    /// written after the blocked cells so the invariant holds throughout.
    pub fn assign(&mut self, other: &Grid) {
        self.row_count = other.row_count;
        self.notify(GridChange::RowCount);
        self.column_count = other.column_count;
        self.notify(GridChange::ColumnCount);
        self.blocked_cells = other.blocked_cells.clone();
        self.notify(GridChange::BlockedCells);
        self.goal = other.goal;
        self.notify(GridChange::Goal);
        self.start = other.start;
        self.notify(GridChange::Start);
    }
}

fn check_dimension(name: &str, value: i32) -> Result<()> {
    if value < 0 {
        return Err(Error::invalid_argument(format!(
            "{name} must be non-negative, got {value}"
        )));
    }
    Ok(())
}

fn check_cost(cell: GridCoordinate, cost: f64) -> Result<()> {
    if !cost.is_finite() || cost < 0.0 {
        return Err(Error::invalid_argument(format!(
            "cost of cell {cell} must be a non-negative number, got {cost}"
        )));
    }
    Ok(())
}
