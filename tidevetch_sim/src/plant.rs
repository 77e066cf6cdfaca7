// The plant lifecycle agent.
//
// A plant is Implanted (a germinated seedling waiting out the year) or an
// Adult (registered with its plot, waiting to reproduce). The two lifecycle
// dates are fixed: the seedling survival check on Sep 28, reproduction on
// Oct 1 — the survival check always lands earlier in the same growing
// season. The species is annual: an adult's reproduction activation is
// terminal whether the crowding gate passes or not.
//
// Reproduction drops `fecundity()` seeds around the parent at a
// gamma-distributed radial distance (mean 0.3, sd 0.25, redrawn above 1.5)
// and a uniform angle. The whole brood shares one river entry candidate —
// the nearest river point if the parent stands within 4 units of the
// channel, else the nearest marsh-boundary point projected on to the river
// if that is within 4 units, else none. Each seed decides for itself
// whether to use it.
//
// See also: `seed.rs` for what happens to a dropped seed, `plot.rs` for the
// survival and crowding math.

use crate::calendar::{self, Date, Month};
use crate::event::ScheduledEventKind;
use crate::landscape::Landscape;
use crate::river::RiverLocation;
use crate::sim::SimState;
use crate::types::{GridCell, PlantId, Point};

/// Seedling survival check date.
pub const SEEDLING_SURVIVAL_DATE: Date = Date::new(Month::September, 28);
/// Adult reproduction date.
pub const REPRODUCTION_DATE: Date = Date::new(Month::October, 1);

/// How close (map units) a parent must stand to the channel, or to a marsh
/// edge leading to it, for its seeds to have a river option at all.
const STREAM_ENTRY_THRESHOLD: f64 = 4.0;

const SEED_DROP_DIST_MEAN: f64 = 0.3;
const SEED_DROP_DIST_SD: f64 = 0.25;
/// Radial drop distances above this are redrawn.
const SEED_DROP_DIST_MAX: f64 = 1.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifeStage {
    Implanted,
    Adult,
}

/// One rooted plant. Its plot is addressed by `cell`, resolved once at
/// creation.
#[derive(Clone, Debug)]
pub struct Plant {
    pub id: PlantId,
    pub position: Point,
    pub cell: GridCell,
    pub stage: LifeStage,
}

/// The brood's shared river entry candidate: the nearest channel point if
/// the parent is within the entry threshold, else the nearest marsh-edge
/// point projected on to the channel if that is, else none.
pub(crate) fn river_entry_candidate(landscape: &Landscape, p: Point) -> Option<RiverLocation> {
    let direct = landscape.river.nearest_point(p)?;
    if direct.distance < STREAM_ENTRY_THRESHOLD {
        return Some(direct);
    }
    let edge = landscape.nearest_point_on_marsh(p)?;
    if edge.distance < STREAM_ENTRY_THRESHOLD {
        return landscape.river.nearest_point(edge.point);
    }
    None
}

impl SimState {
    /// Spawn a first-generation adult: registered immediately, reproducing
    /// at the next Oct 1.
    pub(crate) fn spawn_founder_adult(&mut self, position: Point) {
        let Some(cell) = self.landscape.raster.cell_of(position) else {
            self.environment.record_seed_lost();
            return;
        };
        let capacity = self.config.carrying_capacity;
        self.environment
            .plot_mut(cell, &self.landscape.raster, capacity)
            .register_plant();
        let id = self.alloc_plant_id();
        self.plants.insert(
            id,
            Plant {
                id,
                position,
                cell,
                stage: LifeStage::Adult,
            },
        );
        self.queue.schedule(
            calendar::next_clock_time_for(REPRODUCTION_DATE, self.clock),
            ScheduledEventKind::PlantActivation { plant_id: id },
        );
    }

    /// Spawn a germinated seedling: unregistered until it survives the next
    /// Sep 28 check. The caller has already bounds-checked `cell`.
    pub(crate) fn spawn_implanted_plant(&mut self, position: Point, cell: GridCell) {
        let id = self.alloc_plant_id();
        self.plants.insert(
            id,
            Plant {
                id,
                position,
                cell,
                stage: LifeStage::Implanted,
            },
        );
        self.queue.schedule(
            calendar::next_clock_time_for(SEEDLING_SURVIVAL_DATE, self.clock),
            ScheduledEventKind::PlantActivation { plant_id: id },
        );
    }

    pub(crate) fn process_plant_activation(&mut self, plant_id: PlantId) {
        let plant = self
            .plants
            .get(&plant_id)
            .unwrap_or_else(|| panic!("{plant_id} activated after removal"))
            .clone();
        let capacity = self.config.carrying_capacity;

        match plant.stage {
            LifeStage::Implanted => {
                let stochasticity = self.environment.stochasticity();
                let adjustment = self.environment.adjustment(&self.config);
                let p = self
                    .environment
                    .plot_mut(plant.cell, &self.landscape.raster, capacity)
                    .survival_prob(stochasticity, adjustment);
                if self.rng.random_bool(p) {
                    self.environment
                        .plot_mut(plant.cell, &self.landscape.raster, capacity)
                        .register_plant();
                    let entry = self.plants.get_mut(&plant_id).unwrap();
                    entry.stage = LifeStage::Adult;
                    self.queue.schedule(
                        calendar::next_clock_time_for(REPRODUCTION_DATE, self.clock),
                        ScheduledEventKind::PlantActivation { plant_id },
                    );
                } else {
                    self.plants.remove(&plant_id);
                }
            }
            LifeStage::Adult => {
                // Density-dependent gate: do I get to reproduce at all?
                let gate = self
                    .environment
                    .plot_mut(plant.cell, &self.landscape.raster, capacity)
                    .capacity_adjustment();
                if self.rng.random_bool(gate) {
                    self.reproduce(&plant);
                    self.environment.record_reproducer(plant.position);
                } else {
                    self.environment
                        .plot_mut(plant.cell, &self.landscape.raster, capacity)
                        .deregister_plant();
                }
                // Annual species: the adult is done either way.
                self.plants.remove(&plant_id);
            }
        }
    }

    /// Drop this season's seeds around the parent. Each seed resolves its
    /// own fate immediately or enters the river (see `seed.rs`).
    fn reproduce(&mut self, plant: &Plant) {
        let stochasticity = self.environment.stochasticity();
        let adjustment = self.environment.adjustment(&self.config);
        let fecundity = self
            .environment
            .plot_mut(plant.cell, &self.landscape.raster, self.config.carrying_capacity)
            .fecundity(stochasticity, adjustment);

        let entry = river_entry_candidate(&self.landscape, plant.position);

        let variance = SEED_DROP_DIST_SD * SEED_DROP_DIST_SD;
        let shape = SEED_DROP_DIST_MEAN * SEED_DROP_DIST_MEAN / variance;
        let rate = SEED_DROP_DIST_MEAN / variance;
        for _ in 0..fecundity {
            let angle = self.rng.next_f64() * 2.0 * std::f64::consts::PI;
            let mut distance = self.rng.gamma(shape, rate);
            while distance > SEED_DROP_DIST_MAX {
                distance = self.rng.gamma(shape, rate);
            }
            let drop_point = plant.position.offset_by(angle, distance);
            self.drop_seed(drop_point, entry);
        }
    }
}
