use crate::algorithm::{Algorithm, Heuristic};
use crate::coordinate::GridCoordinate;
use crate::grid::{Grid, DEFAULT_COLUMN_COUNT, DEFAULT_ROW_COUNT};
use crate::snapshot::GridSnapshot;

use anyhow::{anyhow, Context};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use tracing::{debug, info};

#[derive(Parser, Debug, Default)]
#[command(
    name = "Grid Pathfinder",
    about = "Step-wise BFS, DFS and A* search over a 2D occupancy grid.",
    version = "0.1"
)]
pub struct Cli {
    #[arg(long, help = "Path to a YAML config file")]
    pub config: Option<String>,

    #[arg(long, help = "Path to a YAML or JSON map snapshot")]
    pub map_path: Option<String>,

    #[arg(long, help = "Number of grid rows when no map is given")]
    pub rows: Option<i32>,

    #[arg(long, help = "Number of grid columns when no map is given")]
    pub columns: Option<i32>,

    #[arg(long, help = "Start cell as ROW,COLUMN", value_parser = parse_coordinate)]
    pub start: Option<GridCoordinate>,

    #[arg(long, help = "Goal cell as ROW,COLUMN", value_parser = parse_coordinate)]
    pub goal: Option<GridCoordinate>,

    #[arg(long, help = "Probability of blocking each free cell, in [0, 1]")]
    pub obstacle_density: Option<f64>,

    #[arg(long, help = "Seed for the random number generator")]
    pub seed: Option<u64>,

    #[arg(long, help = "Search to run: bfs, dfs, astar or all")]
    pub algorithm: Option<String>,

    #[arg(long, help = "A* heuristic: manhattan or chebyshev")]
    pub heuristic: Option<String>,

    #[arg(long, help = "Give up after this many steps")]
    pub max_steps: Option<usize>,

    #[arg(long, help = "Delay between steps in milliseconds")]
    pub step_delay_ms: Option<u64>,

    #[arg(long, help = "Write a JSON report of every run to this path")]
    pub output_path: Option<String>,

    #[arg(long, help = "Save the grid that was searched to this path")]
    pub save_map_path: Option<String>,

    #[arg(long, help = "Default log filter when RUST_LOG is unset")]
    pub log_level: Option<String>,
}

fn parse_coordinate(s: &str) -> Result<GridCoordinate, String> {
    let (row, column) = s
        .split_once(',')
        .ok_or_else(|| format!("expected ROW,COLUMN, got {s:?}"))?;
    let row = row.trim().parse().map_err(|e| format!("bad row {row:?}: {e}"))?;
    let column = column
        .trim()
        .parse()
        .map_err(|e| format!("bad column {column:?}: {e}"))?;
    Ok(GridCoordinate::new(row, column))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub map_path: Option<String>,
    pub rows: i32,
    pub columns: i32,
    pub start: Option<GridCoordinate>,
    pub goal: Option<GridCoordinate>,
    pub obstacle_density: f64,
    pub seed: u64,
    pub algorithm: String,
    pub heuristic: String,
    pub max_steps: Option<usize>,
    pub step_delay_ms: u64,
    pub output_path: Option<String>,
    pub save_map_path: Option<String>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            map_path: None,
            rows: DEFAULT_ROW_COUNT,
            columns: DEFAULT_COLUMN_COUNT,
            start: None,
            goal: None,
            obstacle_density: 0.0,
            seed: 0,
            algorithm: "all".to_string(),
            heuristic: Heuristic::default().to_string(),
            max_steps: None,
            step_delay_ms: 0,
            output_path: None,
            save_map_path: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    pub fn override_from_command_line(mut self, cli: &Cli) -> anyhow::Result<Self> {
        if let Some(map_path) = &cli.map_path {
            self.map_path = Some(map_path.clone());
        }
        if let Some(rows) = cli.rows {
            self.rows = rows;
        }
        if let Some(columns) = cli.columns {
            self.columns = columns;
        }
        if cli.start.is_some() {
            self.start = cli.start;
        }
        if cli.goal.is_some() {
            self.goal = cli.goal;
        }
        if let Some(density) = cli.obstacle_density {
            self.obstacle_density = density;
        }
        if let Some(seed) = cli.seed {
            self.seed = seed;
        }
        if let Some(algorithm) = &cli.algorithm {
            self.algorithm = algorithm.clone();
        }
        if let Some(heuristic) = &cli.heuristic {
            self.heuristic = heuristic.clone();
        }
        if cli.max_steps.is_some() {
            self.max_steps = cli.max_steps;
        }
        if let Some(delay) = cli.step_delay_ms {
            self.step_delay_ms = delay;
        }
        if let Some(output_path) = &cli.output_path {
            self.output_path = Some(output_path.clone());
        }
        if let Some(save_map_path) = &cli.save_map_path {
            self.save_map_path = Some(save_map_path.clone());
        }
        if let Some(log_level) = &cli.log_level {
            self.log_level = log_level.clone();
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.map_path.is_none() && (self.rows <= 0 || self.columns <= 0) {
            return Err(anyhow!(
                "Grid dimensions must be positive, got {}x{}",
                self.rows,
                self.columns
            ));
        }
        if !(0.0..=1.0).contains(&self.obstacle_density) {
            return Err(anyhow!(
                "Obstacle density must be within [0, 1], got {}",
                self.obstacle_density
            ));
        }
        if self.max_steps == Some(0) {
            return Err(anyhow!("Max steps must be at least 1"));
        }
        self.algorithms()?;
        self.heuristic()?;
        Ok(())
    }

    pub fn algorithms(&self) -> anyhow::Result<Vec<Algorithm>> {
        if self.algorithm.eq_ignore_ascii_case("all") {
            return Ok(Algorithm::ALL.to_vec());
        }
        Ok(vec![self.algorithm.parse()?])
    }

    pub fn heuristic(&self) -> anyhow::Result<Heuristic> {
        Ok(self.heuristic.parse()?)
    }

    /// Loads the configured map, or creates an empty one, then applies the
    /// start/goal overrides and scatters random obstacles.
    pub fn build_grid(&self) -> anyhow::Result<Grid> {
        let mut grid = match &self.map_path {
            Some(path) => GridSnapshot::load(path)
                .and_then(|snapshot| snapshot.to_grid())
                .with_context(|| format!("error loading map: {path}"))?,
            None => Grid::new(self.rows, self.columns)?,
        };

        if let Some(start) = self.start {
            grid.set_start(start)?;
        }
        if let Some(goal) = self.goal {
            grid.set_goal(goal)?;
        }
        for (name, cell) in [("start", grid.start()), ("goal", grid.goal())] {
            if !grid.in_bounds(cell) {
                return Err(anyhow!("{name} {cell} lies outside the grid"));
            }
        }

        if self.obstacle_density > 0.0 {
            let mut rng = StdRng::seed_from_u64(self.seed);
            let added = grid.scatter_obstacles(self.obstacle_density, &mut rng)?;
            debug!("seed {} blocked {added} extra cells", self.seed);
        }

        info!(
            "grid {}x{} start {} goal {} blocked {}",
            grid.row_count(),
            grid.column_count(),
            grid.start(),
            grid.goal(),
            grid.blocked_count()
        );
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.algorithms().unwrap().len(), 3);
        assert_eq!(config.heuristic().unwrap(), Heuristic::Manhattan);
    }

    #[test]
    fn test_yaml_config_and_overrides() {
        let config = Config::from_yaml_str(
            "rows: 8\ncolumns: 10\nalgorithm: bfs\nstart: { row: 1, column: 1 }\n",
        )
        .unwrap();
        assert_eq!(config.rows, 8);
        assert_eq!(config.columns, 10);
        assert_eq!(config.algorithms().unwrap(), vec![Algorithm::Bfs]);

        let cli = Cli::parse_from([
            "grid_pathfinder",
            "--algorithm",
            "astar",
            "--heuristic",
            "chebyshev",
            "--goal",
            "6, 9",
        ]);
        let config = config.override_from_command_line(&cli).unwrap();
        assert_eq!(config.algorithms().unwrap(), vec![Algorithm::AStar]);
        assert_eq!(config.heuristic().unwrap(), Heuristic::Chebyshev);
        assert_eq!(config.goal, Some(GridCoordinate::new(6, 9)));
        assert_eq!(config.start, Some(GridCoordinate::new(1, 1)));
        assert_eq!(config.rows, 8);
    }

    #[test]
    fn test_invalid_values_rejected() {
        for yaml in [
            "algorithm: dijkstra\n",
            "heuristic: euclid\n",
            "obstacle_density: 1.5\n",
            "rows: 0\n",
            "max_steps: 0\n",
        ] {
            let config = Config::from_yaml_str(yaml).unwrap();
            assert!(config.validate().is_err(), "{yaml}");
            let cli = Cli::parse_from(["grid_pathfinder"]);
            assert!(config.override_from_command_line(&cli).is_err(), "{yaml}");
        }
        assert!(Config::from_yaml_str("rows: many\n").is_err());
        assert!(Cli::try_parse_from(["grid_pathfinder", "--start", "3"]).is_err());
    }

    #[test]
    fn test_command_line_repairs_yaml_values() {
        let config = Config::from_yaml_str("rows: 0\nobstacle_density: 1.5\n").unwrap();
        let cli = Cli::parse_from([
            "grid_pathfinder",
            "--map-path",
            "maps/a.yaml",
            "--obstacle-density",
            "0.25",
        ]);
        let config = config.override_from_command_line(&cli).unwrap();
        assert_eq!(config.map_path.as_deref(), Some("maps/a.yaml"));
        assert_eq!(config.obstacle_density, 0.25);

        let config = Config::from_yaml_str("columns: -3\n").unwrap();
        let cli = Cli::parse_from(["grid_pathfinder", "--columns", "12"]);
        assert_eq!(config.override_from_command_line(&cli).unwrap().columns, 12);
    }

    #[test]
    fn test_build_grid() {
        let config = Config {
            rows: 6,
            columns: 6,
            start: Some(GridCoordinate::new(0, 5)),
            goal: Some(GridCoordinate::new(5, 0)),
            obstacle_density: 0.5,
            seed: 1,
            ..Config::default()
        };
        let grid = config.build_grid().unwrap();
        assert_eq!(grid.start(), GridCoordinate::new(0, 5));
        assert_eq!(grid.goal(), GridCoordinate::new(5, 0));
        assert!(!grid.is_blocked(grid.start()));
        assert!(!grid.is_blocked(grid.goal()));

        let again = config.build_grid().unwrap();
        assert_eq!(
            GridSnapshot::from_grid(&grid),
            GridSnapshot::from_grid(&again)
        );

        let outside = Config {
            goal: Some(GridCoordinate::new(9, 9)),
            ..config
        };
        assert!(outside.build_grid().is_err());
    }
}
