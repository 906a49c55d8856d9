use crate::coordinate::GridCoordinate;
use crate::error::Result;
use crate::grid::Grid;

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockedCell {
    pub row: i32,
    pub column: i32,
    #[serde(default = "default_cost")]
    pub cost: f64,
}

fn default_cost() -> f64 {
    1.0
}

/// Persisted form of a [`Grid`]. Observers are not part of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub row_count: i32,
    pub column_count: i32,
    #[serde(default)]
    pub blocked_cells: Vec<BlockedCell>,
    pub start: GridCoordinate,
    pub goal: GridCoordinate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Json,
}

impl Format {
    fn of(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Yaml,
        }
    }
}

impl GridSnapshot {
    pub fn from_grid(grid: &Grid) -> Self {
        let mut blocked_cells: Vec<BlockedCell> = grid
            .blocked_cells()
            .map(|(cell, cost)| BlockedCell {
                row: cell.row,
                column: cell.column,
                cost,
            })
            .collect();
        blocked_cells.sort_by_key(|cell| (cell.row, cell.column));

        GridSnapshot {
            row_count: grid.row_count(),
            column_count: grid.column_count(),
            blocked_cells,
            start: grid.start(),
            goal: grid.goal(),
        }
    }

    pub fn to_grid(&self) -> Result<Grid> {
        Grid::from_parts(
            self.row_count,
            self.column_count,
            self.blocked_cells
                .iter()
                .map(|cell| (GridCoordinate::new(cell.row, cell.column), cell.cost)),
            self.start,
            self.goal,
        )
    }

    /// Reads a snapshot, picking JSON for `.json` files and YAML otherwise.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let snapshot: GridSnapshot = match Format::of(path) {
            Format::Json => serde_json::from_reader(reader)?,
            Format::Yaml => serde_yaml::from_reader(reader)?,
        };
        Ok(snapshot)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        match Format::of(path) {
            Format::Json => serde_json::to_writer_pretty(&mut writer, self)?,
            Format::Yaml => serde_yaml::to_writer(&mut writer, self)?,
        }
        writer.flush()?;
        info!("saved {}x{} map to {}", self.row_count, self.column_count, path.display());
        Ok(())
    }
}

impl Grid {
    /// Loads a snapshot and assigns it onto this grid, notifying observers.
    pub fn load_from(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let loaded = GridSnapshot::load(path)?.to_grid()?;
        self.assign(&loaded);
        Ok(())
    }
}
