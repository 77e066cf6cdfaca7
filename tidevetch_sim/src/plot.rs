// Per-cell population ledger.
//
// A `Plot` is created lazily for a raster cell the first time a plant roots
// there, and from then on tracks that cell's yearly arrivals and losses. It
// owns the cell's vital rates (read once from the class tables at creation)
// and the crowding math: survival and fecundity both shade with the shared
// yearly stochasticity and warm-up adjustment, and fecundity additionally
// with the cell's carrying-capacity crowding.
//
// Call order within a season: `capacity_adjustment` gates an adult's
// reproduction and stores the crowding modifier that a following
// `fecundity` call reads. `register_year_end` closes the season's books.
//
// See also: `vitals.rs` for the base rates, `environment.rs` which rolls
// every plot at the year boundary and tallies `classify` at the end.

use crate::vitals;
use serde::{Deserialize, Serialize};

/// Years after creation before a plot's record is judged at all.
const JUDGEMENT_GRACE_PERIOD: u32 = 3;
/// The judgement looks at up to this many most-recent years.
const JUDGEMENT_WINDOW: usize = 5;
/// A plot averaging above this fraction of capacity is thriving.
const THRIVING_FRACTION: f64 = 0.8;
/// A plot averaging below this fraction of capacity is transient.
const TRANSIENT_FRACTION: f64 = 0.2;

/// End-of-run judgement of one plot's population record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlotKind {
    /// Too young to judge (or the record gives nothing to average).
    Unknown,
    /// Held population, but well below capacity.
    Transient,
    Mediocre,
    /// Sustained population near capacity.
    Thriving,
    /// Empty in the final year.
    Dead,
}

/// One raster cell's ledger.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Plot {
    raster_class: i32,
    survival_rate: f64,
    fecundity_base: u32,
    capacity: u32,

    year: u32,
    creation_year: u32,
    skip_years: u32,
    /// Net plants per year, index 0 = year 1's boundary. Years before the
    /// plot existed are back-filled with zeros so indices line up across
    /// plots.
    history: Vec<u32>,

    population: u32,
    culled: u32,
    /// Crowding modifier stored by the last `capacity_adjustment` call.
    fecundity_competition_modifier: f64,
}

impl Plot {
    pub fn new(raster_class: i32, capacity: u32, creation_year: u32) -> Self {
        Self {
            raster_class,
            survival_rate: vitals::survival_rate(raster_class),
            fecundity_base: vitals::fecundity_base(raster_class),
            capacity,
            year: creation_year,
            creation_year,
            skip_years: creation_year + JUDGEMENT_GRACE_PERIOD,
            history: vec![0; creation_year as usize],
            population: 0,
            culled: 0,
            fecundity_competition_modifier: 1.0,
        }
    }

    pub fn raster_class(&self) -> i32 {
        self.raster_class
    }

    /// Plants that have rooted here this season.
    pub fn population(&self) -> u32 {
        self.population
    }

    pub fn history(&self) -> &[u32] {
        &self.history
    }

    /// A plant rooted in this cell.
    pub fn register_plant(&mut self) {
        self.population += 1;
    }

    /// A rooted plant died before reproducing.
    pub fn deregister_plant(&mut self) {
        debug_assert!(
            self.culled < self.population,
            "more plants culled than registered"
        );
        self.culled += 1;
    }

    /// Close the season: append the net count and reset the counters.
    pub fn register_year_end(&mut self, year: u32) {
        self.history.push(self.population - self.culled);
        self.population = 0;
        self.culled = 0;
        self.year = year;
    }

    /// Crowding adjustment in (0, 1]: the fraction of this season's plants
    /// the cell can actually carry. Exactly 1 at or under capacity, and for
    /// an empty plot (nothing to adjust). Stores the value as the fecundity
    /// competition modifier for the reproduction that may follow.
    pub fn capacity_adjustment(&mut self) -> f64 {
        if self.population == 0 {
            self.fecundity_competition_modifier = 1.0;
            return 1.0;
        }
        let naive = self.population as f64;
        let adjusted = naive.min(self.capacity as f64);
        let modifier = adjusted / naive;
        debug_assert!(modifier > 0.0 && modifier <= 1.0);
        self.fecundity_competition_modifier = modifier;
        modifier
    }

    /// Seedling survival probability this year, capped at 1. Crowding does
    /// not enter here; it acts on the reproduction gate and fecundity.
    pub fn survival_prob(&self, stochasticity: f64, adjustment: f64) -> f64 {
        (self.survival_rate * stochasticity * adjustment.sqrt()).min(1.0)
    }

    /// Seeds a reproducing adult drops here this year, truncated toward
    /// zero. Uses the modifier stored by the last `capacity_adjustment`.
    pub fn fecundity(&self, stochasticity: f64, adjustment: f64) -> u32 {
        (self.fecundity_base as f64
            * stochasticity
            * adjustment.sqrt()
            * self.fecundity_competition_modifier) as u32
    }

    /// Judge the plot's whole record.
    ///
    /// Unknown inside the grace period; Dead if the final year was empty;
    /// otherwise the mean of the judgeable years inside the window, against
    /// thresholds anchored at the cell capacity.
    pub fn classify(&self) -> PlotKind {
        if self.year < self.skip_years || self.year == 0 {
            return PlotKind::Unknown;
        }
        if self.history.last().copied() == Some(0) {
            return PlotKind::Dead;
        }
        let mut sum: u64 = 0;
        let mut count: u32 = 0;
        for (i, &n) in self.history.iter().enumerate() {
            if i >= self.skip_years as usize && i + JUDGEMENT_WINDOW >= self.history.len() {
                sum += n as u64;
                count += 1;
            }
        }
        if count == 0 {
            // The first judged year can have no history past the grace
            // period yet.
            return PlotKind::Unknown;
        }
        let avg = sum as f64 / count as f64;
        let cap = self.capacity as f64;
        if avg > THRIVING_FRACTION * cap {
            PlotKind::Thriving
        } else if avg < TRANSIENT_FRACTION * cap {
            PlotKind::Transient
        } else {
            PlotKind::Mediocre
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A plot on a mid-band class with a round capacity.
    fn plot() -> Plot {
        Plot::new(135, 50, 0)
    }

    /// Run `years` seasons of `net` plants each through the ledger.
    fn run_years(plot: &mut Plot, nets: &[u32]) {
        let mut year = plot.year;
        for &net in nets {
            for _ in 0..net {
                plot.register_plant();
            }
            year += 1;
            plot.register_year_end(year);
        }
    }

    #[test]
    fn new_plot_backfills_history_to_creation_year() {
        let plot = Plot::new(100, 50, 4);
        assert_eq!(plot.history(), &[0, 0, 0, 0]);
        assert_eq!(plot.population(), 0);
    }

    #[test]
    fn adjustment_is_one_at_or_below_capacity() {
        let mut plot = plot();
        for _ in 0..30 {
            plot.register_plant();
        }
        assert_eq!(plot.capacity_adjustment(), 1.0);
        for _ in 0..20 {
            plot.register_plant();
        }
        // Exactly at capacity.
        assert_eq!(plot.capacity_adjustment(), 1.0);
    }

    #[test]
    fn adjustment_halves_at_double_capacity() {
        let mut plot = plot();
        for _ in 0..100 {
            plot.register_plant();
        }
        assert_eq!(plot.capacity_adjustment(), 0.5);
    }

    #[test]
    fn adjustment_on_empty_plot_is_one() {
        let mut plot = plot();
        assert_eq!(plot.capacity_adjustment(), 1.0);
    }

    #[test]
    fn survival_prob_caps_at_one() {
        let plot = plot(); // class 135: base 0.1325
        let p = plot.survival_prob(10.0, 1.0);
        assert_eq!(p, 1.0);
        let p = plot.survival_prob(2.0, 1.0);
        assert!((p - 0.265).abs() < 1e-12);
    }

    #[test]
    fn survival_prob_applies_adjustment_under_square_root() {
        let plot = plot();
        let p = plot.survival_prob(1.0, 0.25);
        assert!((p - 0.1325 * 0.5).abs() < 1e-12);
    }

    #[test]
    fn fecundity_truncates_toward_zero() {
        let mut plot = plot(); // class 135: base 209
        for _ in 0..100 {
            plot.register_plant();
        }
        plot.capacity_adjustment(); // modifier 0.5
        // 209 * 1.0 * 1.0 * 0.5 = 104.5 -> 104.
        assert_eq!(plot.fecundity(1.0, 1.0), 104);
    }

    #[test]
    fn classify_unknown_during_grace_period() {
        let mut plot = plot();
        run_years(&mut plot, &[20, 20]);
        assert_eq!(plot.classify(), PlotKind::Unknown);
    }

    #[test]
    fn classify_unknown_when_window_has_no_judgeable_years() {
        // Exactly at the end of the grace period nothing past it has been
        // recorded yet.
        let mut plot = plot();
        run_years(&mut plot, &[20, 20, 20]);
        assert_eq!(plot.classify(), PlotKind::Unknown);
    }

    #[test]
    fn classify_dead_when_final_year_empty() {
        let mut plot = plot();
        run_years(&mut plot, &[20, 20, 20, 20, 0]);
        assert_eq!(plot.classify(), PlotKind::Dead);
    }

    #[test]
    fn classify_thresholds_anchor_at_capacity() {
        // Capacity 50: thriving above 40, transient below 10.
        let mut thriving = plot();
        run_years(&mut thriving, &[45; 8]);
        assert_eq!(thriving.classify(), PlotKind::Thriving);

        let mut transient = plot();
        run_years(&mut transient, &[5; 8]);
        assert_eq!(transient.classify(), PlotKind::Transient);

        let mut mediocre = plot();
        run_years(&mut mediocre, &[25; 8]);
        assert_eq!(mediocre.classify(), PlotKind::Mediocre);
    }

    #[test]
    fn classify_ignores_years_outside_the_window() {
        // Five strong years followed by five weak ones: only the window
        // counts, so the judgement is transient.
        let mut plot = plot();
        run_years(&mut plot, &[50, 50, 50, 50, 50, 5, 5, 5, 5, 5]);
        assert_eq!(plot.classify(), PlotKind::Transient);
    }

    #[test]
    fn classify_ignores_backfilled_zeros() {
        // A plot created in year 6 is judged only on its own record, not
        // the zero back-fill.
        let mut plot = Plot::new(135, 50, 6);
        run_years(&mut plot, &[45, 45, 45, 45]);
        assert_eq!(plot.classify(), PlotKind::Thriving);
    }

    #[test]
    fn year_end_resets_counters() {
        let mut plot = plot();
        for _ in 0..10 {
            plot.register_plant();
        }
        for _ in 0..3 {
            plot.deregister_plant();
        }
        plot.register_year_end(1);
        assert_eq!(plot.history(), &[7]);
        assert_eq!(plot.population(), 0);
        assert_eq!(plot.capacity_adjustment(), 1.0);
    }
}
