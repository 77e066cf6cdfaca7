// The mobile-seed agent: drop, float, implant.
//
// A dropped seed first decides whether it reaches the water at all
// (Bernoulli on the hydrochory probability, or automatically if it landed
// on open water), then draws its float-time budget from the empirical
// observation array. With hydrochory enabled it rides the river: one
// activation per hour, each either exiting to the marsh
// (Bernoulli(implantationRate)) or walking the river graph by this hour's
// signed tidal displacement, resolving junctions by direction of travel.
// With hydrochory disabled the whole journey collapses to one closed-form
// implantation draw at the drop point.
//
// The float-time draw de-noises the source data: observations were logged
// in nightly batches, so runs of equal values are walked back to their
// first index, and a gap wider than six hours to the previous distinct
// value is resampled uniformly inside the gap instead of taken at face
// value.
//
// A seed whose budget runs out simply leaves the registry — death by
// exhaustion, with no implantation draw. An implantation point outside the
// raster is a silent loss, counted in the run diagnostics.
//
// See also: `river.rs` for the junction rules, `plant.rs` for who drops
// seeds, `banked.rs` for the dormancy variant of implantation.

use crate::event::ScheduledEventKind;
use crate::river::RiverLocation;
use crate::sim::SimState;
use crate::types::{Point, RiverEdgeId, SeedId};
use tidevetch_prng::SimRng;

/// The tidal half-cycle driving the displacement function, in hours.
pub const TIDAL_PERIOD_HOURS: f64 = 13.0;
/// Peak tidal displacement, map units per hour.
const TIDAL_AMPLITUDE: f64 = 769.5;
/// Net downstream drift, map units per hour.
const TIDAL_DRIFT: f64 = 13.5;
/// Fixed-point rounding applied to the hourly budget before the walk.
const ROUNDING_SCALE: f64 = 1.0e7;
/// Float-time gaps wider than this (hours) are nightly-batch artifacts.
const FLOAT_TIME_GAP: u32 = 6;

/// Signed displacement (map units) for the hour starting at clock time `t`.
/// Positive is downstream.
pub fn tidal_displacement(t: f64) -> f64 {
    TIDAL_AMPLITUDE * (t * std::f64::consts::PI / TIDAL_PERIOD_HOURS).sin() + TIDAL_DRIFT
}

/// Probability that a seed floating for `max_float_time` hours implants at
/// least once, given a per-hour implantation rate. The closed-form shortcut
/// used when hydrochory is disabled.
pub fn aggregate_implantation_probability(rate: f64, max_float_time: u32) -> f64 {
    1.0 - (1.0 - rate).powi(max_float_time as i32)
}

/// Draw a float-time budget from the sorted empirical array: uniform index,
/// tie walk-back, gap resampling.
pub(crate) fn draw_float_time(rng: &mut SimRng, times: &[u32]) -> u32 {
    let mut n = rng.range_usize(0, times.len());
    let max = times[n];
    while n != 0 && times[n - 1] == max {
        n -= 1;
    }
    if n != 0 && max - times[n - 1] > FLOAT_TIME_GAP {
        return rng.range_u64(times[n - 1] as u64, times[n] as u64) as u32;
    }
    max
}

/// A seed riding the river, addressed as (edge, arc-length index).
#[derive(Clone, Debug)]
pub struct MobileSeed {
    pub id: SeedId,
    pub position: Point,
    pub edge: RiverEdgeId,
    pub index: f64,
    /// Hours this seed can stay afloat, drawn once at drop time.
    pub max_float_time: u32,
    /// Hours floated so far.
    pub float_timer: u32,
}

impl SimState {
    /// Resolve a freshly dropped seed: implant in place, enter the river,
    /// or (hydrochory disabled) settle the whole float in one draw.
    pub(crate) fn drop_seed(&mut self, drop_point: Point, entry: Option<RiverLocation>) {
        let Some(entry) = entry else {
            self.implant_seed(drop_point);
            return;
        };

        let class = self
            .landscape
            .raster
            .cell_of(drop_point)
            .map(|c| self.landscape.raster.class_at(c));
        let reaches_water = self
            .rng
            .random_bool(self.config.dispersal.hydrochory_probability)
            || class == Some(crate::raster::OPEN_WATER);
        if !reaches_water {
            self.implant_seed(drop_point);
            return;
        }

        let max_float_time =
            draw_float_time(&mut self.rng, &self.config.dispersal.seed_float_times);

        if !self.config.dispersal.hydrochory_enabled {
            let b = aggregate_implantation_probability(
                self.config.dispersal.implantation_rate,
                max_float_time,
            );
            debug_assert!((0.0..=1.0).contains(&b));
            if self.rng.random_bool(b) {
                self.implant_seed(drop_point);
            }
            return;
        }

        let id = self.alloc_seed_id();
        self.seeds.insert(
            id,
            MobileSeed {
                id,
                position: entry.point,
                edge: entry.edge,
                index: entry.index,
                max_float_time,
                float_timer: 0,
            },
        );
        // Desynchronize the brood across the tide: first step anywhere in
        // the next two tidal periods.
        let delay = self.rng.next_f64() * 2.0 * TIDAL_PERIOD_HOURS;
        self.queue.schedule(
            self.clock + delay,
            ScheduledEventKind::SeedActivation { seed_id: id },
        );
    }

    /// One hour of hydrochory.
    pub(crate) fn process_seed_activation(&mut self, seed_id: SeedId) {
        let seed = self
            .seeds
            .get(&seed_id)
            .unwrap_or_else(|| panic!("{seed_id} activated after removal"));
        let within_budget = seed.float_timer <= seed.max_float_time;

        if self.rng.random_bool(self.config.dispersal.implantation_rate) {
            let seed = self.seeds.remove(&seed_id).unwrap();
            self.exit_to_marsh(seed.position);
        } else if within_budget {
            self.tidal_walk(seed_id);
            let seed = self.seeds.get_mut(&seed_id).unwrap();
            seed.float_timer += 1;
            self.queue.schedule(
                self.clock + 1.0,
                ScheduledEventKind::SeedActivation { seed_id },
            );
        } else {
            // Waterlogged: the float budget is spent.
            self.seeds.remove(&seed_id);
        }
    }

    /// Walk the river by this hour's tidal displacement, snapping at edge
    /// ends and resolving junctions until the budget is spent or a dead
    /// end abandons it.
    pub(crate) fn tidal_walk(&mut self, seed_id: SeedId) {
        let seed = &self.seeds[&seed_id];
        let mut edge_id = seed.edge;
        let mut index = seed.index;

        let rate = tidal_displacement(self.clock);
        let downstream = rate > 0.0;
        let budget = (rate.abs() * ROUNDING_SCALE).round() / ROUNDING_SCALE - 1.0;

        let mut traveled = 0.0;
        let mut dead_end = false;
        while traveled < budget && !dead_end {
            let length = self.landscape.river.edge(edge_id).line.length();
            let at_junction = if downstream {
                index >= length
            } else {
                index <= 0.0
            };
            if at_junction {
                let continuations = self.landscape.river.continuations(edge_id, downstream);
                if continuations.is_empty() {
                    dead_end = true;
                } else {
                    let pick = continuations[self.rng.range_usize(0, continuations.len())];
                    let next = RiverEdgeId(pick as u32);
                    index = if downstream {
                        0.0
                    } else {
                        self.landscape.river.edge(next).line.length()
                    };
                    edge_id = next;
                }
            } else {
                let remaining = budget - traveled;
                let target = if downstream {
                    (index + remaining).min(length)
                } else {
                    (index - remaining).max(0.0)
                };
                traveled += (target - index).abs();
                index = target;
            }
        }

        let position = self.landscape.river.edge(edge_id).line.point_at_index(index);
        let seed = self.seeds.get_mut(&seed_id).unwrap();
        seed.edge = edge_id;
        seed.index = index;
        seed.position = position;
    }

    /// Leave the river: hop from the nearest marsh-boundary point a uniform
    /// 0..max distance onward, away from the river side, and implant there.
    fn exit_to_marsh(&mut self, river_position: Point) {
        let Some(marsh) = self.landscape.nearest_point_on_marsh(river_position) else {
            self.implant_seed(river_position);
            return;
        };
        let boundary = marsh.point;
        let slope = (boundary.y - river_position.y) / (boundary.x - river_position.x);
        let angle = if slope.is_nan() {
            // The seed sits exactly on the boundary: no defined outward
            // direction, hop anywhere.
            self.rng.next_f64() * 2.0 * std::f64::consts::PI
        } else {
            slope.atan()
        };
        let hop = self.rng.next_f64() * self.config.dispersal.implantation_max_distance;
        let offset_x = hop * angle.cos();
        let offset_y = hop * angle.sin();
        let target = if river_position.x <= boundary.x {
            Point::new(boundary.x + offset_x, boundary.y + offset_y)
        } else {
            Point::new(boundary.x - offset_x, boundary.y - offset_y)
        };
        self.implant_seed(target);
    }

    /// Settle a seed into the soil at `point`: winter survival, then
    /// germination (or, with the seed bank enabled, the
    /// germinate/bank/die partition).
    pub(crate) fn implant_seed(&mut self, point: Point) {
        let Some(cell) = self.landscape.raster.cell_of(point) else {
            self.environment.record_seed_lost();
            return;
        };
        if !self.rng.random_bool(self.config.dispersal.winter_survival_rate) {
            return;
        }
        if self.config.seed_bank.seed_bank_rate > 0.0 {
            let p = self.rng.next_f64();
            let germination = self.config.seed_bank.germination_rate;
            if p < germination {
                self.spawn_implanted_plant(point, cell);
            } else if p < germination + self.config.seed_bank.seed_bank_rate {
                self.spawn_banked_seed(point, cell);
            }
            // Otherwise the seed dies in place.
        } else {
            self.spawn_implanted_plant(point, cell);
        }
    }
}
