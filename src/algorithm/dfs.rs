use super::{PathFinder, SearchCore, SearchResult};
use crate::color::CellColorSink;
use crate::coordinate::GridCoordinate;
use crate::error::Result;
use crate::grid::Grid;
use crate::stat::Stats;

use std::collections::HashSet;
use tracing::trace;

/// LIFO expansion. Finds some path, not necessarily the shortest.
pub struct DepthFirstSearch<'a, S> {
    core: SearchCore<'a, S>,
    stack: Vec<GridCoordinate>,
    // Marked on push so no cell is stacked twice.
    visited: HashSet<GridCoordinate>,
}

impl<'a, S: CellColorSink> DepthFirstSearch<'a, S> {
    pub fn new(grid: &'a Grid, sink: S) -> Self {
        let mut core = SearchCore::new(grid, sink);
        let start = grid.start();
        core.open(start);
        DepthFirstSearch {
            core,
            stack: vec![start],
            visited: HashSet::from([start]),
        }
    }

    pub fn core(&self) -> &SearchCore<'a, S> {
        &self.core
    }
}

impl<S: CellColorSink> PathFinder for DepthFirstSearch<'_, S> {
    fn name(&self) -> &'static str {
        "dfs"
    }

    fn step(&mut self) -> Result<Option<SearchResult>> {
        if let Some(result) = self.core.result() {
            return Ok(Some(result));
        }
        self.core.count_step();

        let Some(current) = self.stack.pop() else {
            return Ok(Some(self.core.finish(SearchResult::PathNotFound)));
        };
        trace!("expand node: {current}");
        self.core.close(current);

        if current == self.core.grid().goal() {
            return self.core.reach_goal();
        }

        for neighbor in self.core.grid().neighbors(current) {
            if self.visited.insert(neighbor) {
                self.stack.push(neighbor);
                self.core.record_predecessor(neighbor, current);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::tests::{assert_valid_path, c, init_tracing, open_grid, walled_grid};
    use crate::color::NoopSink;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_dfs_open_grid_trace() {
        init_tracing();
        let grid = open_grid();
        let mut dfs = DepthFirstSearch::new(&grid, NoopSink);
        assert_eq!(dfs.run(None).unwrap(), Some(SearchResult::PathFound));
        // The last neighbor pushed is explored first.
        assert_eq!(dfs.path().unwrap(), &[c(0, 0), c(0, 1), c(1, 2), c(2, 2)]);
    }

    #[test]
    fn test_dfs_walled_grid() {
        let grid = walled_grid();
        let mut dfs = DepthFirstSearch::new(&grid, NoopSink);
        assert_eq!(dfs.run(None).unwrap(), Some(SearchResult::PathNotFound));
        assert!(dfs.path().is_none());
    }

    #[test]
    fn test_dfs_never_stacks_a_cell_twice() {
        let grid = open_grid();
        let mut dfs = DepthFirstSearch::new(&grid, NoopSink);
        dfs.run(None).unwrap();
        // Every opened cell is distinct, so openings never exceed the cell count.
        assert!(dfs.stats().opened_nodes <= 9);
        assert!(dfs.core().is_closed(c(2, 2)));
    }

    #[test]
    fn test_dfs_random_grids_deterministic_and_valid() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..10 {
            let mut grid = Grid::new(10, 14).unwrap();
            grid.scatter_obstacles(0.25, &mut rng).unwrap();

            let mut first = DepthFirstSearch::new(&grid, NoopSink);
            let result = first.run(None).unwrap();
            let mut second = DepthFirstSearch::new(&grid, NoopSink);
            assert_eq!(second.run(None).unwrap(), result);
            assert_eq!(first.path(), second.path());

            if let Some(path) = first.path() {
                assert_valid_path(&grid, path);
            }
        }
    }
}
