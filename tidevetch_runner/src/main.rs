// CLI entry point for the Tidevetch population simulation.
//
// Runs one simulation to termination and reports: the per-year rows
// (verbose mode and/or the year stats file), the per-cluster rows, and the
// one-line run summary on stdout. All file I/O lives here — the sim crate
// is pure. Output files are opened before the run starts, so a bad path
// fails in seconds instead of after a long run.
//
// Usage:
//   tidevetch [OPTIONS]
//     --seed <N>              PRNG seed (default: 0)
//     --config <FILE>         SimConfig JSON (default: built-in defaults)
//     --landscape <FILE>      Landscape JSON (default: built-in demo)
//     --year-stats <FILE>     Write per-year rows: year population stochasticity
//     --cluster-stats <FILE>  Write per-cluster rows: year size
//     --print-config          Print the default config JSON and exit
//     --verbose               Print per-year rows to stdout as well

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tidevetch_sim::cluster::cluster;
use tidevetch_sim::config::SimConfig;
use tidevetch_sim::landscape::Landscape;
use tidevetch_sim::report;
use tidevetch_sim::sim::SimState;

struct RunnerConfig {
    seed: u64,
    config_path: Option<PathBuf>,
    landscape_path: Option<PathBuf>,
    year_stats_path: Option<PathBuf>,
    cluster_stats_path: Option<PathBuf>,
    verbose: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            config_path: None,
            landscape_path: None,
            year_stats_path: None,
            cluster_stats_path: None,
            verbose: false,
        }
    }
}

fn main() {
    let runner = parse_args();

    let config = match load_config(&runner) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };
    if let Err(problem) = config.validate() {
        eprintln!("Invalid config: {problem}");
        std::process::exit(1);
    }

    let landscape = match load_landscape(&runner) {
        Ok(landscape) => landscape,
        Err(e) => {
            eprintln!("Failed to load landscape: {e}");
            std::process::exit(1);
        }
    };

    // Open output files up front: a bad path should fail before the run.
    let year_stats = runner.year_stats_path.as_deref().map(open_output);
    let cluster_stats = runner.cluster_stats_path.as_deref().map(open_output);

    let mut state = SimState::with_config(runner.seed, config, landscape);
    let report = state.run();

    let year_rows = year_rows(&state);
    if runner.verbose {
        for row in &year_rows {
            println!("{row}");
        }
    }
    if let Some(mut out) = year_stats {
        if let Err(e) = write_rows(&mut out, &year_rows) {
            eprintln!("Failed to write year stats: {e}");
            std::process::exit(1);
        }
    }
    if let Some(mut out) = cluster_stats {
        let rows = cluster_rows(&state);
        if let Err(e) = write_rows(&mut out, &rows) {
            eprintln!("Failed to write cluster stats: {e}");
            std::process::exit(1);
        }
    }

    println!("{}", report.summary.summary_line());
}

fn load_config(runner: &RunnerConfig) -> std::io::Result<SimConfig> {
    match &runner.config_path {
        Some(path) => {
            let file = File::open(path)?;
            serde_json::from_reader(file).map_err(std::io::Error::other)
        }
        None => Ok(SimConfig::default()),
    }
}

fn load_landscape(runner: &RunnerConfig) -> std::io::Result<Landscape> {
    match &runner.landscape_path {
        Some(path) => {
            let file = File::open(path)?;
            serde_json::from_reader(file).map_err(std::io::Error::other)
        }
        None => Ok(Landscape::demo(runner.seed)),
    }
}

fn open_output(path: &Path) -> BufWriter<File> {
    match File::create(path) {
        Ok(file) => BufWriter::new(file),
        Err(e) => {
            eprintln!("Failed to open {}: {e}", path.display());
            std::process::exit(1);
        }
    }
}

fn write_rows(out: &mut BufWriter<File>, rows: &[String]) -> std::io::Result<()> {
    for row in rows {
        writeln!(out, "{row}")?;
    }
    out.flush()
}

/// One row per completed year: year, reproducing population, the
/// stochasticity in force during that year's growing season.
fn year_rows(state: &SimState) -> Vec<String> {
    let populations = state.environment.population_history();
    let shocks = state.environment.environmental_history();
    populations
        .iter()
        .zip(shocks)
        .enumerate()
        .map(|(i, (&population, &stochasticity))| {
            report::year_row(i as u32 + 1, population, stochasticity)
        })
        .collect()
}

/// One row per final-year cluster. Recomputed here so the stats file can
/// list every cluster, not just the counts the summary keeps.
fn cluster_rows(state: &SimState) -> Vec<String> {
    let points = state.environment.reproducing();
    if points.is_empty() || points.len() > state.config.clustering.dbscan_cutoff {
        return Vec::new();
    }
    let year = state.environment.year();
    cluster(
        points,
        state.config.clustering.epsilon,
        state.config.clustering.min_points,
    )
    .into_iter()
    .map(|members| report::cluster_row(year, members.len()))
    .collect()
}

/// Parse command-line arguments. Uses simple `std::env::args()` matching —
/// no clap dependency.
fn parse_args() -> RunnerConfig {
    let mut runner = RunnerConfig::default();
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                i += 1;
                runner.seed = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--seed requires a valid number");
                    std::process::exit(1);
                });
            }
            "--config" => {
                i += 1;
                runner.config_path = Some(require_path(&args, i, "--config"));
            }
            "--landscape" => {
                i += 1;
                runner.landscape_path = Some(require_path(&args, i, "--landscape"));
            }
            "--year-stats" => {
                i += 1;
                runner.year_stats_path = Some(require_path(&args, i, "--year-stats"));
            }
            "--cluster-stats" => {
                i += 1;
                runner.cluster_stats_path = Some(require_path(&args, i, "--cluster-stats"));
            }
            "--print-config" => {
                // Unwrap is fine: serializing the default config cannot fail.
                println!(
                    "{}",
                    serde_json::to_string_pretty(&SimConfig::default()).unwrap()
                );
                std::process::exit(0);
            }
            "--verbose" => {
                runner.verbose = true;
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    runner
}

fn require_path(args: &[String], i: usize, flag: &str) -> PathBuf {
    args.get(i).map(PathBuf::from).unwrap_or_else(|| {
        eprintln!("{flag} requires a file path");
        std::process::exit(1);
    })
}

fn print_usage() {
    println!("Usage: tidevetch [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --seed <N>              PRNG seed (default: 0)");
    println!("  --config <FILE>         SimConfig JSON (default: built-in defaults)");
    println!("  --landscape <FILE>      Landscape JSON (default: built-in demo)");
    println!("  --year-stats <FILE>     Write per-year rows: year population stochasticity");
    println!("  --cluster-stats <FILE>  Write per-cluster rows: year size");
    println!("  --print-config          Print the default config JSON and exit");
    println!("  --verbose               Print per-year rows to stdout as well");
}
