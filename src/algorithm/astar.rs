use super::{PathFinder, SearchCore, SearchResult};
use crate::color::CellColorSink;
use crate::coordinate::GridCoordinate;
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::heap::MinHeap;
use crate::stat::Stats;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::trace;

/// Estimate of the remaining moves to the goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Heuristic {
    #[default]
    Manhattan,
    /// Exact move count on an open 8-connected grid, so never overestimates.
    Chebyshev,
}

impl Heuristic {
    pub fn estimate(self, from: GridCoordinate, to: GridCoordinate) -> usize {
        match self {
            Heuristic::Manhattan => from.manhattan(to),
            Heuristic::Chebyshev => from.chebyshev(to),
        }
    }
}

impl FromStr for Heuristic {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "manhattan" => Ok(Heuristic::Manhattan),
            "chebyshev" => Ok(Heuristic::Chebyshev),
            _ => Err(Error::invalid_argument(format!("unknown heuristic: {s}"))),
        }
    }
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Heuristic::Manhattan => f.write_str("manhattan"),
            Heuristic::Chebyshev => f.write_str("chebyshev"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct OpenNode {
    position: GridCoordinate,
    g_cost: usize,
    h_cost: usize,
    // Insertion counter, breaks remaining ties in push order.
    sequence: u64,
}

impl OpenNode {
    fn f_cost(&self) -> usize {
        self.g_cost + self.h_cost
    }
}

// Smaller compares as more urgent in the min-heap.
impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f_cost()
            .cmp(&other.f_cost())
            // Higher g cost has higher priority
            .then_with(|| other.g_cost.cmp(&self.g_cost))
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Best-first expansion on f = g + h with unit move cost. A cell is reopened
/// whenever a cheaper route to it turns up.
pub struct AStar<'a, S> {
    core: SearchCore<'a, S>,
    open_list: MinHeap<OpenNode>,
    g_costs: HashMap<GridCoordinate, usize>,
    heuristic: Heuristic,
    sequence: u64,
}

impl<'a, S: CellColorSink> AStar<'a, S> {
    pub fn new(grid: &'a Grid, sink: S) -> Self {
        Self::with_heuristic(grid, sink, Heuristic::Manhattan)
    }

    pub fn with_heuristic(grid: &'a Grid, sink: S, heuristic: Heuristic) -> Self {
        let mut astar = AStar {
            core: SearchCore::new(grid, sink),
            open_list: MinHeap::new(),
            g_costs: HashMap::new(),
            heuristic,
            sequence: 0,
        };
        astar.push(grid.start(), 0);
        astar
    }

    pub fn core(&self) -> &SearchCore<'a, S> {
        &self.core
    }

    pub fn g_cost(&self, cell: GridCoordinate) -> Option<usize> {
        self.g_costs.get(&cell).copied()
    }

    fn push(&mut self, position: GridCoordinate, g_cost: usize) {
        let h_cost = self.heuristic.estimate(position, self.core.grid().goal());
        self.g_costs.insert(position, g_cost);
        self.open_list.insert(OpenNode {
            position,
            g_cost,
            h_cost,
            sequence: self.sequence,
        });
        self.sequence += 1;
        self.core.open(position);
    }

    // Entries superseded by a cheaper push, or already expanded at their cost.
    fn is_stale(&self, node: &OpenNode) -> bool {
        self.core.is_closed(node.position)
            || self
                .g_costs
                .get(&node.position)
                .is_some_and(|&best| node.g_cost > best)
    }
}

impl<S: CellColorSink> PathFinder for AStar<'_, S> {
    fn name(&self) -> &'static str {
        "astar"
    }

    fn step(&mut self) -> Result<Option<SearchResult>> {
        if let Some(result) = self.core.result() {
            return Ok(Some(result));
        }
        self.core.count_step();

        let current = loop {
            if self.open_list.is_empty() {
                return Ok(Some(self.core.finish(SearchResult::PathNotFound)));
            }
            let node = self.open_list.extract()?;
            if !self.is_stale(&node) {
                break node;
            }
        };
        trace!("expand node: {current:?}");
        self.core.close(current.position);

        if current.position == self.core.grid().goal() {
            return self.core.reach_goal();
        }

        let tentative_g_cost = current.g_cost + 1;
        for neighbor in self.core.grid().neighbors(current.position) {
            let improves = self
                .g_costs
                .get(&neighbor)
                .is_none_or(|&best| tentative_g_cost < best);
            if !improves {
                continue;
            }
            if self.core.reopen(neighbor) {
                trace!("reopen {neighbor} at cost {tentative_g_cost}");
            }
            self.core.record_predecessor(neighbor, current.position);
            self.push(neighbor, tentative_g_cost);
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
