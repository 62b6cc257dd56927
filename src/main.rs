use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::Serialize;

use choir_line::{
    ChartGeometry, ChartRuntime, CliDriver, FileSink, Grid, Highlights, LayoutPolicy,
    LifecycleLoggerPlugin, LogLevel, Logger, MetricsSnapshotPlugin, PartCounts, SeatingState,
    Size, parse_count, parse_row_count, render_chart,
};

const DEFAULT_LOG_MAX_BYTES: u64 = 1024 * 1024;

#[derive(Parser, Debug)]
#[command(name = "choir-line")]
#[command(about = "Arrange a choir into rows and rearrange it by dragging seats")]
#[command(version)]
/// Command-line arguments.
struct Cli {
    /// Number of sopranos
    #[arg(
        long,
        global = true,
        default_value = "10",
        allow_hyphen_values = true,
        value_parser = lenient_count
    )]
    soprano: u32,

    /// Number of altos
    #[arg(
        long,
        global = true,
        default_value = "10",
        allow_hyphen_values = true,
        value_parser = lenient_count
    )]
    alto: u32,

    /// Number of tenors
    #[arg(
        long,
        global = true,
        default_value = "5",
        allow_hyphen_values = true,
        value_parser = lenient_count
    )]
    tenor: u32,

    /// Number of basses
    #[arg(
        long,
        global = true,
        default_value = "5",
        allow_hyphen_values = true,
        value_parser = lenient_count
    )]
    bass: u32,

    /// Number of rows (at least 1)
    #[arg(
        long,
        global = true,
        default_value = "3",
        allow_hyphen_values = true,
        value_parser = lenient_rows
    )]
    rows: NonZeroUsize,

    /// Layout policy: auto, condition1 (3+ rows) or condition2 (4+ rows)
    #[arg(long, global = true, default_value = "auto")]
    policy: LayoutPolicy,

    /// Append JSON-lines diagnostics to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Truncate the log file once it would grow past this many bytes (0 disables)
    #[arg(long, global = true, default_value_t = DEFAULT_LOG_MAX_BYTES)]
    log_max_bytes: u64,

    /// Draw seats without colour
    #[arg(long, global = true)]
    no_colour: bool,

    /// Subcommand to execute; defaults to `edit`.
    #[command(subcommand)]
    command: Option<Mode>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Mode {
    /// Open the interactive editor
    Edit,
    /// Print the generated chart and exit
    Show {
        /// Print the chart as JSON
        #[arg(long, conflicts_with = "plain")]
        json: bool,
        /// Print bracketed text instead of coloured cells
        #[arg(long)]
        plain: bool,
    },
}

fn lenient_count(raw: &str) -> Result<u32, String> {
    Ok(parse_count(raw))
}

fn lenient_rows(raw: &str) -> Result<NonZeroUsize, String> {
    Ok(parse_row_count(raw))
}

#[derive(Serialize)]
struct ChartSummary<'a> {
    counts: &'a PartCounts,
    rows: usize,
    policy: LayoutPolicy,
    seated: usize,
    grid: &'a Grid,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("choir-line: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let counts = PartCounts::new(cli.soprano, cli.alto, cli.tenor, cli.bass);
    let state = SeatingState::new(counts, cli.rows, cli.policy)?;

    match cli.command.unwrap_or(Mode::Edit) {
        Mode::Edit => {
            let logger = match cli.log_file.as_ref() {
                Some(path) => Some(Logger::new(FileSink::new(path, cli.log_max_bytes)?)),
                None => None,
            };
            edit(state, logger, !cli.no_colour)
        }
        Mode::Show { json, plain } => show(&state, json, plain || cli.no_colour),
    }
}

fn edit(
    state: SeatingState,
    logger: Option<Logger>,
    colour: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut runtime = ChartRuntime::new(state, Size::new(80, 24));
    let config = runtime.config_mut();
    config.colour = colour;
    // Snapshots only go to the log file, so without one nothing is collected.
    if logger.is_some() {
        config.enable_metrics();
    } else {
        config.disable_metrics();
    }
    config.logger = logger.clone();
    let metrics = config.metrics_handle();

    if let Some(logger) = logger {
        runtime.register_plugin(
            LifecycleLoggerPlugin::new(logger.clone()).with_level(LogLevel::Debug),
        );
        if let Some(metrics) = metrics {
            runtime.register_plugin(
                MetricsSnapshotPlugin::new(logger, metrics).with_interval(Duration::from_secs(5)),
            );
        }
    }

    let runtime = CliDriver::new(runtime).run()?;
    let state = runtime.state();
    println!(
        "Final layout #{}: {} members in {} rows ({})",
        state.generation(),
        state.grid().seated(),
        state.row_count(),
        state.policy()
    );
    Ok(())
}

fn show(state: &SeatingState, json: bool, plain: bool) -> Result<(), Box<dyn std::error::Error>> {
    let grid = state.grid();
    if json {
        let summary = ChartSummary {
            counts: state.counts(),
            rows: state.row_count().get(),
            policy: state.policy(),
            seated: grid.seated(),
            grid,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let chart = render_chart(grid, &ChartGeometry::fitted(grid), Highlights::default(), !plain);
    println!("{chart}");
    println!(
        "{} members, {} rows, policy {}",
        grid.seated(),
        state.row_count(),
        state.policy()
    );
    Ok(())
}
