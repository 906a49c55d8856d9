use crate::coordinate::GridCoordinate;

use serde::Serialize;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CellColor {
    /// Discovered, waiting on the open list.
    Open,
    /// Expanded.
    Closed,
    OnPath,
}

/// Receives advisory cell colorings while a search runs. Implementations must
/// not feed anything back into the search.
pub trait CellColorSink {
    fn set_cell_color(&mut self, cell: GridCoordinate, color: CellColor);
}

impl<T: CellColorSink + ?Sized> CellColorSink for &mut T {
    fn set_cell_color(&mut self, cell: GridCoordinate, color: CellColor) {
        (**self).set_cell_color(cell, color);
    }
}

impl<T: CellColorSink + ?Sized> CellColorSink for Box<T> {
    fn set_cell_color(&mut self, cell: GridCoordinate, color: CellColor) {
        (**self).set_cell_color(cell, color);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl CellColorSink for NoopSink {
    fn set_cell_color(&mut self, _: GridCoordinate, _: CellColor) {}
}

/// Emits every coloring as a trace event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl CellColorSink for TracingSink {
    fn set_cell_color(&mut self, cell: GridCoordinate, color: CellColor) {
        trace!("color {cell} {color:?}");
    }
}

/// Keeps every coloring in arrival order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub events: Vec<(GridCoordinate, CellColor)>,
}

impl RecordingSink {
    pub fn last_color(&self, cell: GridCoordinate) -> Option<CellColor> {
        self.events
            .iter()
            .rev()
            .find(|(colored, _)| *colored == cell)
            .map(|(_, color)| *color)
    }

    pub fn count(&self, color: CellColor) -> usize {
        self.events.iter().filter(|(_, c)| *c == color).count()
    }
}

impl CellColorSink for RecordingSink {
    fn set_cell_color(&mut self, cell: GridCoordinate, color: CellColor) {
        self.events.push((cell, color));
    }
}
