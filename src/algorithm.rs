mod astar;
mod bfs;
mod dfs;

pub use astar::{AStar, Heuristic};
pub use bfs::BreadthFirstSearch;
pub use dfs::DepthFirstSearch;

use crate::color::{CellColor, CellColorSink};
use crate::coordinate::GridCoordinate;
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::stat::Stats;

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, instrument};

pub type Path = Vec<GridCoordinate>;

/// Terminal outcome of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SearchResult {
    PathFound,
    PathNotFound,
}

/// Incremental search over a [`Grid`]. Each call to [`PathFinder::step`]
/// performs one expansion; once a result is reached further calls return it
/// unchanged.
pub trait PathFinder {
    fn name(&self) -> &'static str;

    /// `Ok(None)` while the search is still running.
    fn step(&mut self) -> Result<Option<SearchResult>>;

    fn result(&self) -> Option<SearchResult>;

    /// Start-to-goal coordinates, available once the path was found.
    fn path(&self) -> Option<&[GridCoordinate]>;

    fn stats(&self) -> &Stats;

    fn require_path(&self) -> Result<&[GridCoordinate]> {
        self.path().ok_or_else(|| {
            Error::InvalidOperation(format!(
                "{} has no path (result: {:?})",
                self.name(),
                self.result()
            ))
        })
    }

    /// Steps until a result is reached or `max_steps` calls have been made.
    fn run(&mut self, max_steps: Option<usize>) -> Result<Option<SearchResult>> {
        let mut taken = 0;
        loop {
            if let Some(result) = self.step()? {
                return Ok(Some(result));
            }
            taken += 1;
            if max_steps.is_some_and(|limit| taken >= limit) {
                debug!("{} stopped after {taken} steps", self.name());
                return Ok(None);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Bfs,
    Dfs,
    AStar,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::Bfs, Algorithm::Dfs, Algorithm::AStar];

    pub fn build<'a, S: CellColorSink + 'a>(
        self,
        grid: &'a Grid,
        sink: S,
        heuristic: Heuristic,
    ) -> Box<dyn PathFinder + 'a> {
        match self {
            Algorithm::Bfs => Box::new(BreadthFirstSearch::new(grid, sink)),
            Algorithm::Dfs => Box::new(DepthFirstSearch::new(grid, sink)),
            Algorithm::AStar => Box::new(AStar::with_heuristic(grid, sink, heuristic)),
        }
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "bfs" => Ok(Algorithm::Bfs),
            "dfs" => Ok(Algorithm::Dfs),
            "astar" | "a*" => Ok(Algorithm::AStar),
            _ => Err(Error::invalid_argument(format!("unknown algorithm: {s}"))),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Algorithm::Bfs => "bfs",
            Algorithm::Dfs => "dfs",
            Algorithm::AStar => "astar",
        };
        f.write_str(name)
    }
}

/// State shared by every strategy: predecessor map, closed set, result and
/// reconstructed path.
pub struct SearchCore<'a, S> {
    grid: &'a Grid,
    sink: S,
    result: Option<SearchResult>,
    predecessors: HashMap<GridCoordinate, GridCoordinate>,
    closed: HashSet<GridCoordinate>,
    path: Option<Path>,
    stats: Stats,
    created_at: Instant,
}

impl<'a, S: CellColorSink> SearchCore<'a, S> {
    pub fn new(grid: &'a Grid, sink: S) -> Self {
        SearchCore {
            grid,
            sink,
            result: None,
            predecessors: HashMap::new(),
            closed: HashSet::new(),
            path: None,
            stats: Stats::default(),
            created_at: Instant::now(),
        }
    }

    pub fn grid(&self) -> &'a Grid {
        self.grid
    }

    pub fn result(&self) -> Option<SearchResult> {
        self.result
    }

    pub fn path(&self) -> Option<&[GridCoordinate]> {
        self.path.as_deref()
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn predecessor(&self, cell: GridCoordinate) -> Option<GridCoordinate> {
        self.predecessors.get(&cell).copied()
    }

    pub fn record_predecessor(&mut self, cell: GridCoordinate, predecessor: GridCoordinate) {
        self.predecessors.insert(cell, predecessor);
    }

    pub fn is_closed(&self, cell: GridCoordinate) -> bool {
        self.closed.contains(&cell)
    }

    pub(crate) fn count_step(&mut self) {
        self.stats.steps += 1;
    }

    pub(crate) fn open(&mut self, cell: GridCoordinate) {
        self.stats.opened_nodes += 1;
        self.sink.set_cell_color(cell, CellColor::Open);
    }

    pub(crate) fn close(&mut self, cell: GridCoordinate) {
        self.closed.insert(cell);
        self.stats.expanded_nodes += 1;
        self.sink.set_cell_color(cell, CellColor::Closed);
    }

    pub(crate) fn reopen(&mut self, cell: GridCoordinate) -> bool {
        self.closed.remove(&cell)
    }

    /// Walks the predecessor chain back from the goal. `Ok(false)` when the
    /// chain stops short of the start.
    pub fn build_path(&mut self) -> Result<bool> {
        match construct_path(&self.predecessors, self.grid.start(), self.grid.goal())? {
            Some(path) => {
                for &cell in &path {
                    self.sink.set_cell_color(cell, CellColor::OnPath);
                }
                self.stats.path_length = path.len();
                self.path = Some(path);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Called when the goal is expanded.
    pub(crate) fn reach_goal(&mut self) -> Result<Option<SearchResult>> {
        let result = if self.build_path()? {
            SearchResult::PathFound
        } else {
            SearchResult::PathNotFound
        };
        Ok(Some(self.finish(result)))
    }

    pub(crate) fn finish(&mut self, result: SearchResult) -> SearchResult {
        self.stats.time_us = self.created_at.elapsed().as_micros() as usize;
        debug!(
            "search finished with {result:?} after {} steps",
            self.stats.steps
        );
        self.result = Some(result);
        result
    }
}

#[instrument(
    skip_all,
    name = "construct_path",
    fields(start = %start, goal = %goal),
    level = "trace"
)]
pub(crate) fn construct_path(
    predecessors: &HashMap<GridCoordinate, GridCoordinate>,
    start: GridCoordinate,
    goal: GridCoordinate,
) -> Result<Option<Path>> {
    let mut path = vec![goal];
    let mut seen = HashSet::from([goal]);
    let mut current = goal;
    while current != start {
        let Some(&previous) = predecessors.get(&current) else {
            debug!("predecessor chain broken at {current}");
            return Ok(None);
        };
        if !seen.insert(previous) {
            return Err(Error::CycleDetected { at: previous });
        }
        path.push(previous);
        current = previous;
    }
    path.reverse();
    Ok(Some(path))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::color::NoopSink;

    pub(crate) fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    }

    pub(crate) fn c(row: i32, column: i32) -> GridCoordinate {
        GridCoordinate::new(row, column)
    }

    /// 3x3 grid, start (0, 0), goal (2, 2).
    pub(crate) fn open_grid() -> Grid {
        Grid::new(3, 3).unwrap()
    }

    /// Same grid with the whole middle row blocked.
    pub(crate) fn walled_grid() -> Grid {
        let mut grid = open_grid();
        for column in 0..3 {
            grid.block(c(1, column), 1.0).unwrap();
        }
        grid
    }

    pub(crate) fn assert_valid_path(grid: &Grid, path: &[GridCoordinate]) {
        assert_eq!(path.first(), Some(&grid.start()));
        assert_eq!(path.last(), Some(&grid.goal()));
        for cell in path {
            assert!(grid.in_bounds(*cell));
            assert!(!grid.is_blocked(*cell));
        }
        for pair in path.windows(2) {
            assert_eq!(pair[0].chebyshev(pair[1]), 1, "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_build_path_walks_back_to_start() {
        let grid = open_grid();
        let mut core = SearchCore::new(&grid, NoopSink);
        core.record_predecessor(c(1, 1), c(0, 0));
        core.record_predecessor(c(2, 2), c(1, 1));

        assert!(core.build_path().unwrap());
        assert_eq!(core.path().unwrap(), &[c(0, 0), c(1, 1), c(2, 2)]);
        assert_eq!(core.stats().path_length, 3);
    }

    #[test]
    fn test_build_path_broken_chain_returns_false() {
        let grid = open_grid();
        let mut core = SearchCore::new(&grid, NoopSink);
        core.record_predecessor(c(2, 2), c(1, 2));

        assert!(!core.build_path().unwrap());
        assert!(core.path().is_none());

        let empty = SearchCore::new(&grid, NoopSink);
        assert!(empty.predecessor(c(2, 2)).is_none());
    }

    #[test]
    fn test_build_path_detects_cycle() {
        let grid = open_grid();
        let mut core = SearchCore::new(&grid, NoopSink);
        core.record_predecessor(c(2, 2), c(1, 1));
        core.record_predecessor(c(1, 1), c(1, 2));
        core.record_predecessor(c(1, 2), c(1, 1));

        assert!(matches!(
            core.build_path(),
            Err(Error::CycleDetected { at }) if at == c(1, 1)
        ));
        assert!(core.path().is_none());
    }

    #[test]
    fn test_goal_at_start_is_single_cell_path() {
        let mut grid = open_grid();
        grid.set_goal(c(0, 0)).unwrap();
        let path = construct_path(&HashMap::new(), c(0, 0), grid.goal()).unwrap();
        assert_eq!(path, Some(vec![c(0, 0)]));
    }

    #[test]
    fn test_all_strategies_find_path_on_open_grid() {
        init_tracing();
        let grid = open_grid();
        for algorithm in Algorithm::ALL {
            let mut finder = algorithm.build(&grid, NoopSink, Heuristic::Manhattan);
            assert_eq!(
                finder.run(None).unwrap(),
                Some(SearchResult::PathFound),
                "{algorithm}"
            );
            assert_valid_path(&grid, finder.require_path().unwrap());
        }
    }

    #[test]
    fn test_all_strategies_fail_behind_wall() {
        init_tracing();
        let grid = walled_grid();
        for algorithm in Algorithm::ALL {
            let mut finder = algorithm.build(&grid, NoopSink, Heuristic::Manhattan);
            assert_eq!(
                finder.run(None).unwrap(),
                Some(SearchResult::PathNotFound),
                "{algorithm}"
            );
            assert!(finder.path().is_none());
            assert!(matches!(
                finder.require_path(),
                Err(Error::InvalidOperation(_))
            ));
        }
    }

    #[test]
    fn test_step_after_result_is_noop() {
        let grid = open_grid();
        for algorithm in Algorithm::ALL {
            let mut finder = algorithm.build(&grid, NoopSink, Heuristic::Manhattan);
            let result = finder.run(None).unwrap();
            let steps = finder.stats().steps;
            let path = finder.path().map(|p| p.to_vec());
            assert_eq!(finder.step().unwrap(), result);
            assert_eq!(finder.step().unwrap(), result);
            assert_eq!(finder.stats().steps, steps);
            assert_eq!(finder.path().map(|p| p.to_vec()), path);
        }
    }

    #[test]
    fn test_extreme_start_and_goal_rejected_before_search() {
        let mut grid = open_grid();
        assert!(matches!(
            grid.set_start(c(i32::MAX, 0)),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            grid.set_goal(c(i32::MIN, 0)),
            Err(Error::InvalidArgument(_))
        ));
        for algorithm in Algorithm::ALL {
            let mut finder = algorithm.build(&grid, NoopSink, Heuristic::Manhattan);
            assert_eq!(finder.run(None).unwrap(), Some(SearchResult::PathFound));
            assert_valid_path(&grid, finder.require_path().unwrap());
        }
    }

    #[test]
    fn test_shrunk_grid_search_does_not_panic() {
        let mut grid = Grid::new(5, 5).unwrap();
        grid.set_start(c(4, 4)).unwrap();
        grid.set_goal(c(0, 0)).unwrap();
        grid.set_row_count(2).unwrap();
        grid.set_column_count(2).unwrap();
        // Start now lies outside the grid and has no in-bounds neighbors.
        for algorithm in Algorithm::ALL {
            let mut finder = algorithm.build(&grid, NoopSink, Heuristic::Manhattan);
            assert_eq!(finder.run(None).unwrap(), Some(SearchResult::PathNotFound));
        }
    }

    #[test]
    fn test_run_respects_step_limit() {
        let grid = Grid::new(8, 8).unwrap();
        let mut finder = Algorithm::Bfs.build(&grid, NoopSink, Heuristic::Manhattan);
        assert_eq!(finder.run(Some(2)).unwrap(), None);
        assert_eq!(finder.stats().steps, 2);
        assert!(finder.result().is_none());
        assert!(finder.require_path().is_err());
    }

    #[test]
    fn test_algorithm_names() {
        assert_eq!("BFS".parse::<Algorithm>().unwrap(), Algorithm::Bfs);
        assert_eq!("astar".parse::<Algorithm>().unwrap(), Algorithm::AStar);
        assert!("dijkstra".parse::<Algorithm>().is_err());
        assert_eq!(Algorithm::Dfs.to_string(), "dfs");
    }
}
