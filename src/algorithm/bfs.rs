use super::{PathFinder, SearchCore, SearchResult};
use crate::color::CellColorSink;
use crate::coordinate::GridCoordinate;
use crate::error::Result;
use crate::grid::Grid;
use crate::stat::Stats;

use std::collections::{HashSet, VecDeque};
use tracing::trace;

/// FIFO expansion. Finds a path with the fewest moves.
pub struct BreadthFirstSearch<'a, S> {
    core: SearchCore<'a, S>,
    open_list: VecDeque<GridCoordinate>,
    // Mirrors `open_list` for constant-time membership checks.
    queued: HashSet<GridCoordinate>,
}

impl<'a, S: CellColorSink> BreadthFirstSearch<'a, S> {
    pub fn new(grid: &'a Grid, sink: S) -> Self {
        let mut core = SearchCore::new(grid, sink);
        let start = grid.start();
        core.open(start);
        BreadthFirstSearch {
            core,
            open_list: VecDeque::from([start]),
            queued: HashSet::from([start]),
        }
    }

    pub fn core(&self) -> &SearchCore<'a, S> {
        &self.core
    }

    fn is_unseen(&self, cell: GridCoordinate) -> bool {
        !self.queued.contains(&cell) && !self.core.is_closed(cell)
    }
}

impl<S: CellColorSink> PathFinder for BreadthFirstSearch<'_, S> {
    fn name(&self) -> &'static str {
        "bfs"
    }

    fn step(&mut self) -> Result<Option<SearchResult>> {
        if let Some(result) = self.core.result() {
            return Ok(Some(result));
        }
        self.core.count_step();

        let Some(current) = self.open_list.pop_front() else {
            return Ok(Some(self.core.finish(SearchResult::PathNotFound)));
        };
        self.queued.remove(&current);
        trace!("expand node: {current}");
        self.core.close(current);

        if current == self.core.grid().goal() {
            return self.core.reach_goal();
        }

        for neighbor in self.core.grid().neighbors(current) {
            if self.is_unseen(neighbor) {
                self.core.record_predecessor(neighbor, current);
                self.open_list.push_back(neighbor);
                self.queued.insert(neighbor);
                self.core.open(neighbor);
            }
        }
        Ok(None)
    }

    fn result(&self) -> Option<SearchResult> {
        self.core.result()
    }

    fn path(&self) -> Option<&[GridCoordinate]> {
        self.core.path()
    }

    fn stats(&self) -> &Stats {
        self.core.stats()
    }
}
