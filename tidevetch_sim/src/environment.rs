// The yearly environment driver.
//
// `Environment` owns everything with process-wide, per-year scope: the year
// counter, the shared environmental stochasticity multiplier, the lazy plot
// registry, the set of locations that reproduced this year, and the
// append-only population/stochasticity histories. The year boundary itself
// is a scheduled agent like any other: `process_year_boundary` fires once
// per simulated Dec 31, rolls every plot, checks termination, re-rolls the
// shared multiplier, and re-schedules itself.
//
// The stochasticity draw is log-uniform on [1/stochMax, stochMax] — one
// shared multiplicative shock per year, applied to every plot's survival
// and fecundity, not an independent per-cell draw.
//
// See also: `plot.rs` for what gets rolled, `sim.rs` for the event loop,
// `report.rs` for the summary assembled at termination.
//
// **Critical constraint: the boundary is exact.** The driver asserts it
// fired on the Dec 31 sentinel; anything else is a scheduling bug, not a
// recoverable condition.

use crate::calendar::{self, NEW_YEAR};
use crate::cluster;
use crate::config::SimConfig;
use crate::event::{ScheduledEventKind, SimEvent, SimEventKind};
use crate::plot::Plot;
use crate::raster::CompetitionRaster;
use crate::report::{self, RunSummary};
use crate::sim::{RunOutcome, SimState};
use crate::types::{EndReason, GridCell, Point};
use std::collections::BTreeMap;
use tidevetch_prng::SimRng;

/// Years before the experimental adjustment factor takes hold.
pub const WARM_UP_YEARS: u32 = 3;

/// One shared log-uniform multiplier on [1/stoch_max, stoch_max], symmetric
/// in log-space around 1.
pub fn draw_stochasticity(rng: &mut SimRng, stoch_max: f64) -> f64 {
    let u = rng.next_f64();
    let stoch_min = 1.0 / stoch_max;
    (u * stoch_max.ln() + (1.0 - u) * stoch_min.ln()).exp()
}

/// Per-run environmental state: the year, the shared yearly shock, the plot
/// registry, and the histories.
#[derive(Clone, Debug)]
pub struct Environment {
    year: u32,
    stochasticity: f64,
    plots: BTreeMap<GridCell, Plot>,
    /// Locations of plants that reproduced this year. Cleared at each
    /// boundary; drained into the clustering diagnostic at termination.
    reproducing: Vec<Point>,
    population_history: Vec<usize>,
    environmental_history: Vec<f64>,
    seeds_lost_out_of_bounds: u64,
}

impl Environment {
    /// Start-of-run state. Year 0's stochasticity is drawn here so the
    /// first growing season is already under a shock.
    pub fn new(config: &SimConfig, rng: &mut SimRng) -> Self {
        let stochasticity = draw_stochasticity(rng, config.stoch_max);
        Self {
            year: 0,
            stochasticity,
            plots: BTreeMap::new(),
            reproducing: Vec::new(),
            population_history: Vec::new(),
            environmental_history: vec![stochasticity],
            seeds_lost_out_of_bounds: 0,
        }
    }

    pub fn year(&self) -> u32 {
        self.year
    }

    pub fn stochasticity(&self) -> f64 {
        self.stochasticity
    }

    /// The survival/fecundity adjustment in force this year: 1.0 during
    /// the warm-up, the configured factor afterwards.
    pub fn adjustment(&self, config: &SimConfig) -> f64 {
        if self.year < WARM_UP_YEARS {
            1.0
        } else {
            config.adjustment_factor
        }
    }

    /// The plot for a cell, created on first touch. Creation reads the
    /// raster class once and back-fills history to the current year.
    pub fn plot_mut(&mut self, cell: GridCell, raster: &CompetitionRaster, capacity: u32) -> &mut Plot {
        let year = self.year;
        self.plots
            .entry(cell)
            .or_insert_with(|| Plot::new(raster.class_at(cell), capacity, year))
    }

    pub fn plots(&self) -> impl Iterator<Item = &Plot> {
        self.plots.values()
    }

    pub fn record_reproducer(&mut self, location: Point) {
        self.reproducing.push(location);
    }

    pub fn reproducing(&self) -> &[Point] {
        &self.reproducing
    }

    pub fn population_history(&self) -> &[usize] {
        &self.population_history
    }

    pub fn environmental_history(&self) -> &[f64] {
        &self.environmental_history
    }

    /// A seed implanted outside the raster. Silent death, tallied for the
    /// run diagnostics.
    pub fn record_seed_lost(&mut self) {
        self.seeds_lost_out_of_bounds += 1;
    }

    pub fn seeds_lost_out_of_bounds(&self) -> u64 {
        self.seeds_lost_out_of_bounds
    }
}

impl SimState {
    /// The once-per-year boundary activation.
    pub(crate) fn process_year_boundary(&mut self, events: &mut Vec<SimEvent>) {
        let today = calendar::date_for_clock(self.clock);
        assert_eq!(
            today, NEW_YEAR,
            "year boundary fired off-cycle: {today} at clock {}",
            self.clock
        );

        self.environment.year += 1;
        let year = self.environment.year;
        for plot in self.environment.plots.values_mut() {
            plot.register_year_end(year);
        }

        let population = self.environment.reproducing.len();
        self.environment.population_history.push(population);

        let reason = if population == 0 {
            Some(EndReason::Extinction)
        } else if population > self.config.max_population_count {
            Some(EndReason::PopulationLimit)
        } else if year >= self.config.max_year_count {
            Some(EndReason::YearHorizon)
        } else {
            None
        };

        if let Some(reason) = reason {
            let summary = self.build_summary(reason);
            events.push(SimEvent {
                time: self.clock,
                kind: SimEventKind::SimulationEnded { reason, year },
            });
            self.outcome = Some(RunOutcome {
                reason,
                year,
                summary,
            });
            return;
        }

        self.environment.stochasticity =
            draw_stochasticity(&mut self.rng, self.config.stoch_max);
        self.environment
            .environmental_history
            .push(self.environment.stochasticity);

        events.push(SimEvent {
            time: self.clock,
            kind: SimEventKind::YearCompleted {
                year,
                population,
                stochasticity: self.environment.stochasticity,
            },
        });

        self.environment.reproducing.clear();
        self.queue.schedule(
            calendar::next_clock_time_for(NEW_YEAR, self.clock),
            ScheduledEventKind::YearBoundary,
        );
    }

    /// Assemble the end-of-run statistics: plot-kind tallies, the cluster
    /// diagnostic (skipped above the configured cutoff), history moments.
    fn build_summary(&self, reason: EndReason) -> RunSummary {
        let mut dead = 0;
        let mut transient = 0;
        let mut mediocre = 0;
        let mut thriving = 0;
        let mut unknown = 0;
        for plot in self.environment.plots.values() {
            match plot.classify() {
                crate::plot::PlotKind::Dead => dead += 1,
                crate::plot::PlotKind::Transient => transient += 1,
                crate::plot::PlotKind::Mediocre => mediocre += 1,
                crate::plot::PlotKind::Thriving => thriving += 1,
                crate::plot::PlotKind::Unknown => unknown += 1,
            }
        }

        let points = &self.environment.reproducing;
        let cluster_sizes: Vec<usize> =
            if points.is_empty() || points.len() > self.config.clustering.dbscan_cutoff {
                Vec::new()
            } else {
                cluster::cluster(
                    points,
                    self.config.clustering.epsilon,
                    self.config.clustering.min_points,
                )
                .into_iter()
                .map(|c| c.len())
                .collect()
            };

        RunSummary {
            stoch_max: self.config.stoch_max,
            hydrochory_enabled: self.config.dispersal.hydrochory_enabled,
            implantation_rate: self.config.dispersal.implantation_rate,
            adjustment_factor: self.config.adjustment_factor,
            reason,
            ending_year: self.environment.year,
            plots_dead: dead,
            plots_transient: transient,
            plots_mediocre: mediocre,
            plots_thriving: thriving,
            plots_unknown: unknown,
            cluster_count: cluster_sizes.len(),
            mean_cluster_size: if cluster_sizes.is_empty() {
                0.0
            } else {
                cluster_sizes.iter().sum::<usize>() as f64 / cluster_sizes.len() as f64
            },
            final_population: points.len(),
            population: report::history_stats(&self.environment.population_history),
            seeds_lost_out_of_bounds: self.environment.seeds_lost_out_of_bounds,
        }
    }
}
