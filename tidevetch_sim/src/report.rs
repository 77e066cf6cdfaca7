// Run statistics and delimited output formatting.
//
// `RunSummary` is the end-of-run record the environment driver assembles at
// termination: the run's identifying parameters, the plot-kind tallies, the
// cluster diagnostic, and the moments of the yearly population history.
// The formatting functions are pure so the runner can write rows to stdout
// and stats files without the sim knowing about either.
//
// Column order in `summary_line` follows the run-sweep convention:
// parameters first, then year, plot tallies, clusters, population figures.

use crate::types::EndReason;
use serde::{Deserialize, Serialize};

/// Moments of a yearly history. `sd` is the population (not sample)
/// standard deviation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub max: usize,
    pub min: usize,
    pub mean: f64,
    pub sd: f64,
}

/// Max/min/mean/sd of a count history. All zeros for an empty history.
pub fn history_stats(values: &[usize]) -> HistoryStats {
    if values.is_empty() {
        return HistoryStats::default();
    }
    let max = *values.iter().max().unwrap();
    let min = *values.iter().min().unwrap();
    let mean = values.iter().sum::<usize>() as f64 / values.len() as f64;
    let variance = values
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / values.len() as f64;
    HistoryStats {
        max,
        min,
        mean,
        sd: variance.sqrt(),
    }
}

/// The end-of-run record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub stoch_max: f64,
    pub hydrochory_enabled: bool,
    pub implantation_rate: f64,
    pub adjustment_factor: f64,
    pub reason: EndReason,
    pub ending_year: u32,
    pub plots_dead: usize,
    pub plots_transient: usize,
    pub plots_mediocre: usize,
    pub plots_thriving: usize,
    pub plots_unknown: usize,
    pub cluster_count: usize,
    pub mean_cluster_size: f64,
    pub final_population: usize,
    pub population: HistoryStats,
    pub seeds_lost_out_of_bounds: u64,
}

impl RunSummary {
    /// One space-delimited summary row: parameters, ending year, plot
    /// tallies (dead transient mediocre thriving), cluster count and mean
    /// size, final population, then population history max/min/mean/sd.
    pub fn summary_line(&self) -> String {
        format!(
            "{} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {}",
            self.stoch_max,
            self.hydrochory_enabled,
            self.implantation_rate,
            self.adjustment_factor,
            self.ending_year,
            self.plots_dead,
            self.plots_transient,
            self.plots_mediocre,
            self.plots_thriving,
            self.cluster_count,
            self.mean_cluster_size as i64,
            self.final_population,
            self.population.max,
            self.population.min,
            self.population.mean as i64,
            self.population.sd as i64,
        )
    }
}

/// One per-year stats row: year, reproducing population, stochasticity.
pub fn year_row(year: u32, population: usize, stochasticity: f64) -> String {
    format!("{year} {population} {stochasticity}")
}

/// One per-cluster row for the cluster stats file.
pub fn cluster_row(year: u32, cluster_population: usize) -> String {
    format!("{year} {cluster_population}")
}
