use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use ts_app::{
    AppError, AppResult, SimulationOptions, SimulationRequest, build_baseline, build_graph,
    list_reports, load_edits, load_report, load_snapshot, run_simulation, summarize,
};
use ts_core::TsError;
use ts_records::{AnalysisConfig, ModeFilter, SpreadMeasure};
use ts_sim::Comparison;

#[derive(Parser)]
#[command(name = "ts-cli")]
#[command(about = "transit-spread CLI - what-if ridership spread on transit networks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate snapshot syntax, references and ridership records
    Validate {
        /// Path to the snapshot YAML or JSON file
        snapshot_path: PathBuf,
    },
    /// Show vertex, edge and line counts for a snapshot
    Summary {
        /// Path to the snapshot YAML or JSON file
        snapshot_path: PathBuf,
        /// Also print the effective analysis configuration
        #[arg(long)]
        show_config: bool,
    },
    /// Estimate the baseline and report its spread
    Spread {
        /// Path to the snapshot YAML or JSON file
        snapshot_path: PathBuf,
        #[command(flatten)]
        spread: SpreadArgs,
        /// List the N busiest measured stations
        #[arg(long, default_value_t = 0)]
        top: usize,
    },
    /// Simulate the edits in a YAML file against the snapshot
    Simulate {
        /// Path to the snapshot YAML or JSON file
        snapshot_path: PathBuf,
        /// YAML file with one edit command or a list of them
        edit_path: PathBuf,
        #[command(flatten)]
        spread: SpreadArgs,
        /// Compare each edit against the baseline on its own instead of cumulatively
        #[arg(long)]
        independent: bool,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
        /// Do not write the report to the snapshot's report store
        #[arg(long)]
        no_save: bool,
    },
    /// Find the shortest connection between two stations
    Path {
        /// Path to the snapshot YAML or JSON file
        snapshot_path: PathBuf,
        /// Start station key
        from: String,
        /// End station key
        to: String,
    },
    /// List lines, or the stations served by the given lines
    Lines {
        /// Path to the snapshot YAML or JSON file
        snapshot_path: PathBuf,
        /// Line keys to look up
        keys: Vec<String>,
    },
    /// List stored reports for a snapshot, or show one
    Reports {
        /// Path to the snapshot YAML or JSON file
        snapshot_path: PathBuf,
        /// Run ID to display
        #[arg(long)]
        show: Option<String>,
    },
}

#[derive(clap::Args, Debug, Clone, Default)]
struct SpreadArgs {
    /// Measure every station instead of subway stops only
    #[arg(long)]
    all_modes: bool,
    /// Spread measure to use instead of the snapshot's
    #[arg(long, value_enum)]
    measure: Option<MeasureArg>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MeasureArg {
    Variance,
    #[value(name = "stddev")]
    StdDev,
    Gini,
}

impl From<MeasureArg> for SpreadMeasure {
    fn from(arg: MeasureArg) -> Self {
        match arg {
            MeasureArg::Variance => SpreadMeasure::Variance,
            MeasureArg::StdDev => SpreadMeasure::StdDev,
            MeasureArg::Gini => SpreadMeasure::Gini,
        }
    }
}

impl SpreadArgs {
    fn is_override(&self) -> bool {
        self.all_modes || self.measure.is_some()
    }

    fn apply(&self, config: &mut AnalysisConfig) {
        if self.all_modes {
            config.spread.modes = ModeFilter::All;
        }
        if let Some(measure) = self.measure {
            config.spread.measure = measure.into();
        }
    }
}

fn main() -> AppResult<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { snapshot_path } => cmd_validate(&snapshot_path),
        Commands::Summary {
            snapshot_path,
            show_config,
        } => cmd_summary(&snapshot_path, show_config),
        Commands::Spread {
            snapshot_path,
            spread,
            top,
        } => cmd_spread(&snapshot_path, &spread, top),
        Commands::Simulate {
            snapshot_path,
            edit_path,
            spread,
            independent,
            no_cache,
            no_save,
        } => cmd_simulate(
            &snapshot_path,
            &edit_path,
            &spread,
            independent,
            SimulationOptions {
                use_cache: !no_cache,
                persist: !no_save,
                spread: None,
            },
        ),
        Commands::Path {
            snapshot_path,
            from,
            to,
        } => cmd_path(&snapshot_path, &from, &to),
        Commands::Lines {
            snapshot_path,
            keys,
        } => cmd_lines(&snapshot_path, &keys),
        Commands::Reports {
            snapshot_path,
            show,
        } => cmd_reports(&snapshot_path, show.as_deref()),
    }
}

/// Diagnostics go to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_validate(snapshot_path: &Path) -> AppResult<()> {
    println!("Validating snapshot: {}", snapshot_path.display());
    let snapshot = load_snapshot(snapshot_path)?;
    // Building and estimating catches unresolved ridership references too.
    summarize(&snapshot)?;
    println!("✓ Snapshot is valid");
    Ok(())
}

fn cmd_summary(snapshot_path: &Path, show_config: bool) -> AppResult<()> {
    let snapshot = load_snapshot(snapshot_path)?;
    let summary = summarize(&snapshot)?;

    println!("Snapshot: {}", summary.name);
    println!("Vertices:");
    for (kind, count) in &summary.vertices {
        println!("  {:<14} {}", kind.to_string(), count);
    }
    println!("Edges:");
    for (kind, count) in &summary.edges {
        println!("  {:<14} {}", kind.to_string(), count);
    }
    println!("Lines: {}", summary.lines);
    println!(
        "Ridership: {} records, {:.0} total",
        summary.ridership_records, summary.total_ridership
    );

    if show_config {
        let yaml = serde_yaml::to_string(&snapshot.config)
            .map_err(|e| AppError::InvalidInput(format!("failed to render config: {}", e)))?;
        println!("Config:");
        for line in yaml.lines() {
            println!("  {}", line);
        }
    }
    Ok(())
}

fn cmd_spread(snapshot_path: &Path, args: &SpreadArgs, top: usize) -> AppResult<()> {
    let snapshot = load_snapshot(snapshot_path)?;
    let mut config = snapshot.config.clone();
    args.apply(&mut config);

    let (_, baseline) = build_baseline(&snapshot, &config)?;
    println!(
        "Baseline spread ({}): {:.3}",
        measure_label(config.spread.measure),
        baseline.spread
    );

    if top > 0 {
        let mut stations: Vec<_> = baseline
            .graph
            .vertices()
            .filter(|v| config.spread.modes.includes(v.kind))
            .filter_map(|v| v.ridership().map(|r| (v.key.as_str(), r)))
            .collect();
        stations.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        println!("Busiest stations:");
        for (key, ridership) in stations.into_iter().take(top) {
            println!("  {:<20} {:>12.1}", key, ridership);
        }
    }
    Ok(())
}

fn cmd_simulate(
    snapshot_path: &Path,
    edit_path: &Path,
    args: &SpreadArgs,
    independent: bool,
    mut options: SimulationOptions,
) -> AppResult<()> {
    let edits = load_edits(edit_path)?;
    tracing::debug!(count = edits.len(), path = %edit_path.display(), "loaded edits");
    if edits.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "{} contains no edits",
            edit_path.display()
        )));
    }

    if let [edit] = edits.as_slice() {
        if args.is_override() {
            let snapshot = load_snapshot(snapshot_path)?;
            let mut config = snapshot.config.clone();
            args.apply(&mut config);
            options.spread = Some(config.spread);
        }
        println!("Simulating: {}", edit.describe());
        let request = SimulationRequest {
            snapshot_path,
            edit: edit.clone(),
            options,
        };
        let response = run_simulation(&request)?;
        if response.loaded_from_cache {
            println!("✓ Loaded from cache: {}", response.run_id);
        } else {
            println!("✓ Simulation completed: {}", response.run_id);
        }
        print_spreads(
            response.report.baseline_spread,
            response.report.edited_spread,
            response.report.delta,
        );
        if let Some(path) = response.report_path {
            println!("  Report: {}", path.display());
        }
        return Ok(());
    }

    // Several edits are compared in memory only; reports are keyed by a single edit.
    let snapshot = load_snapshot(snapshot_path)?;
    let mut config = snapshot.config.clone();
    args.apply(&mut config);
    let (simulator, baseline) = build_baseline(&snapshot, &config)?;
    println!(
        "Baseline spread ({}): {:.3}",
        measure_label(config.spread.measure),
        baseline.spread
    );

    if independent {
        let results = simulator.simulate_all(&baseline, &edits);
        for (edit, result) in edits.iter().zip(results) {
            match result {
                Ok(comparison) => print_comparison(&comparison),
                Err(e) => println!("✗ {}: {}", edit.describe(), e),
            }
        }
    } else {
        let comparisons = simulator.simulate_sequence(&baseline, &edits)?;
        for comparison in &comparisons {
            print_comparison(comparison);
        }
    }
    Ok(())
}

fn cmd_path(snapshot_path: &Path, from: &str, to: &str) -> AppResult<()> {
    let snapshot = load_snapshot(snapshot_path)?;
    let graph = build_graph(&snapshot)?;

    match graph.connected_path(from, to)? {
        Some(path) => {
            println!("{} stops:", path.len());
            println!("  {}", path.join(" → "));
        }
        None => println!("No connection between {} and {}", from, to),
    }
    Ok(())
}

fn cmd_lines(snapshot_path: &Path, keys: &[String]) -> AppResult<()> {
    let snapshot = load_snapshot(snapshot_path)?;
    let graph = build_graph(&snapshot)?;

    if keys.is_empty() {
        let lines = graph.line_keys();
        if lines.is_empty() {
            println!("No lines found in snapshot");
            return Ok(());
        }
        println!("Lines in snapshot:");
        for key in lines {
            let line = graph.line_by_key(&key).ok_or_else(|| TsError::UnknownLine { id: key.clone() })?;
            println!("  {} - {} ({} stops)", line.key, line.name, line.stops.len());
        }
        return Ok(());
    }

    let stations = graph.vertices_on_lines(keys)?;
    println!("Stations on {}:", keys.join(", "));
    for key in stations {
        println!("  {}", key);
    }
    Ok(())
}

fn cmd_reports(snapshot_path: &Path, show: Option<&str>) -> AppResult<()> {
    if let Some(run_id) = show {
        let report = load_report(snapshot_path, run_id)?;
        println!("Report: {}", report.manifest.run_id);
        println!("  Snapshot: {}", report.manifest.snapshot);
        println!("  Timestamp: {}", report.manifest.timestamp);
        println!("  Edit: {}", report.manifest.edit.describe());
        println!("  Measure: {}", measure_label(report.manifest.measure));
        print_spreads(report.baseline_spread, report.edited_spread, report.delta);
        println!("  Vertices: {}", report.vertices.len());
        println!("  Edges: {}", report.edges.len());
        return Ok(());
    }

    let reports = list_reports(snapshot_path)?;
    if reports.is_empty() {
        println!("No stored reports");
    } else {
        println!("Stored reports:");
        for manifest in reports {
            println!(
                "  {} - {} ({})",
                manifest.run_id,
                manifest.edit.describe(),
                manifest.timestamp
            );
        }
    }
    Ok(())
}

fn print_comparison(comparison: &Comparison) {
    println!("✓ {}", comparison.edit.describe());
    print_spreads(
        comparison.baseline_spread,
        comparison.edited_spread,
        comparison.delta,
    );
}

fn print_spreads(baseline: f64, edited: f64, delta: f64) {
    println!("  Baseline spread: {:.3}", baseline);
    println!("  Edited spread:   {:.3}", edited);
    println!("  Delta:           {:+.3}", delta);
}

fn measure_label(measure: SpreadMeasure) -> &'static str {
    match measure {
        SpreadMeasure::Variance => "variance",
        SpreadMeasure::StdDev => "stddev",
        SpreadMeasure::Gini => "gini",
    }
}
