use grid_pathfinder::algorithm::{Algorithm, PathFinder, SearchResult};
use grid_pathfinder::color::TracingSink;
use grid_pathfinder::config::{Cli, Config};
use grid_pathfinder::coordinate::GridCoordinate;
use grid_pathfinder::snapshot::GridSnapshot;
use grid_pathfinder::stat::Stats;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use std::io::{BufWriter, Write};
use std::time::Duration;
use tracing::{error, info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Serialize)]
struct RunReport {
    algorithm: Algorithm,
    result: Option<SearchResult>,
    path: Option<Vec<GridCoordinate>>,
    stats: Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = if let Some(config_file) = cli.config.as_ref() {
        let config_str = std::fs::read_to_string(config_file)
            .with_context(|| format!("error reading config file: {config_file}"))?;
        Config::from_yaml_str(&config_str)
            .with_context(|| format!("error with config file: {config_file}"))?
    } else {
        Config::default()
    }
    .override_from_command_line(&cli)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();
    if cli.config.is_none() {
        info!("No config file specified, using default config");
    }

    let grid = config.build_grid()?;
    if let Some(save_map_path) = &config.save_map_path {
        GridSnapshot::from_grid(&grid)
            .save(save_map_path)
            .with_context(|| format!("error saving map: {save_map_path}"))?;
    }

    let heuristic = config.heuristic()?;
    let mut reports = Vec::new();
    for algorithm in config.algorithms()? {
        let mut finder = algorithm.build(&grid, TracingSink, heuristic);
        let result = drive(finder.as_mut(), &config).await?;

        match (result, finder.path()) {
            (Some(SearchResult::PathFound), Some(path)) => {
                let cells: Vec<String> = path.iter().map(ToString::to_string).collect();
                info!("{algorithm} path: {}", cells.join(" -> "));
            }
            (Some(SearchResult::PathNotFound), _) => error!("{algorithm} found no path"),
            _ => warn!("{algorithm} stopped before reaching a result"),
        }
        finder.stats().print(finder.name());

        reports.push(RunReport {
            algorithm,
            result,
            path: finder.path().map(<[GridCoordinate]>::to_vec),
            stats: finder.stats().clone(),
        });
    }

    if let Some(output_path) = &config.output_path {
        write_report(output_path, &reports)?;
        info!("wrote report to {output_path}");
    }

    Ok(())
}

fn write_report(output_path: &str, reports: &[RunReport]) -> anyhow::Result<()> {
    let file = std::fs::File::create(output_path)
        .with_context(|| format!("error creating report: {output_path}"))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, reports)?;
    writer.flush()?;
    Ok(())
}

/// Calls `step` until the search ends, the step budget runs out or the user
/// interrupts. With a delay configured, steps are paced by a timer.
#[instrument(skip_all, name = "drive", fields(algorithm = finder.name()), level = "debug")]
async fn drive(
    finder: &mut dyn PathFinder,
    config: &Config,
) -> anyhow::Result<Option<SearchResult>> {
    if config.step_delay_ms == 0 {
        return Ok(finder.run(config.max_steps)?);
    }

    let mut ticker = tokio::time::interval(Duration::from_millis(config.step_delay_ms));
    let mut taken = 0;
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                warn!("interrupted after {taken} steps");
                return Ok(None);
            }
        }
        if let Some(result) = finder.step()? {
            return Ok(Some(result));
        }
        taken += 1;
        if config.max_steps.is_some_and(|limit| taken >= limit) {
            return Ok(None);
        }
    }
}
