// The banked-seed agent: dormancy across winters.
//
// An optional variant, compiled in but inert unless `seed_bank_rate` is
// positive. A banked seed re-tests once a year on Apr 10: a winter-survival
// Bernoulli first, then a single uniform draw partitioned into germinate
// now / stay banked / die. The germination share is discounted by the bank
// rate so the two-way split stays a proper partition.
//
// See also: `seed.rs` for how seeds enter the bank at implantation.

use crate::calendar::{self, Date, Month};
use crate::event::ScheduledEventKind;
use crate::sim::SimState;
use crate::types::{BankedSeedId, GridCell, Point};

/// Yearly germination retest date.
pub const BANK_EXIT_DATE: Date = Date::new(Month::April, 10);

/// A dormant seed waiting in the bank.
#[derive(Clone, Debug)]
pub struct BankedSeed {
    pub id: BankedSeedId,
    pub position: Point,
    pub cell: GridCell,
}

impl SimState {
    pub(crate) fn spawn_banked_seed(&mut self, position: Point, cell: GridCell) {
        let id = self.alloc_banked_seed_id();
        self.banked_seeds.insert(id, BankedSeed { id, position, cell });
        self.queue.schedule(
            calendar::next_clock_time_for(BANK_EXIT_DATE, self.clock),
            ScheduledEventKind::BankedSeedActivation { seed_id: id },
        );
    }

    /// The yearly retest: survive the winter, then germinate, stay, or die.
    pub(crate) fn process_banked_seed_activation(&mut self, seed_id: BankedSeedId) {
        let seed = self
            .banked_seeds
            .get(&seed_id)
            .unwrap_or_else(|| panic!("{seed_id} activated after removal"))
            .clone();

        if !self.rng.random_bool(self.config.dispersal.winter_survival_rate) {
            self.banked_seeds.remove(&seed_id);
            return;
        }

        let p = self.rng.next_f64();
        let bank_rate = self.config.seed_bank.seed_bank_rate;
        let germination = (1.0 - bank_rate) * self.config.seed_bank.germination_rate;
        if p < germination {
            self.banked_seeds.remove(&seed_id);
            self.spawn_implanted_plant(seed.position, seed.cell);
        } else if p < germination + bank_rate {
            // Another year in the bank.
            self.queue.schedule(
                calendar::next_clock_time_for(BANK_EXIT_DATE, self.clock),
                ScheduledEventKind::BankedSeedActivation { seed_id },
            );
        } else {
            self.banked_seeds.remove(&seed_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::landscape::Landscape;

    fn banked_state(winter_survival: f64, bank_rate: f64, germination: f64) -> SimState {
        let mut config = SimConfig::default();
        config.dispersal.winter_survival_rate = winter_survival;
        config.seed_bank.seed_bank_rate = bank_rate;
        config.seed_bank.germination_rate = germination;
        SimState::with_config(7, config, Landscape::demo(1))
    }

    #[test]
    fn spawn_schedules_the_next_april_retest() {
        let mut state = banked_state(1.0, 0.5, 0.5);
        let before = state.queue.len();
        let position = Point::new(30.0, 63.0);
        let cell = state.landscape.raster.cell_of(position).unwrap();
        state.spawn_banked_seed(position, cell);
        assert_eq!(state.queue.len(), before + 1);
        assert_eq!(state.banked_seeds.len(), 1);
    }

    #[test]
    fn certain_germination_spawns_a_seedling() {
        // With survival 1 and germination 1 the discounted partition is
        // germinate-with-certainty only when the bank rate is 0... so use
        // a bank rate of 0.0 with the variant forced through spawn.
        let mut state = banked_state(1.0, 0.0, 1.0);
        let position = Point::new(30.0, 63.0);
        let cell = state.landscape.raster.cell_of(position).unwrap();
        state.spawn_banked_seed(position, cell);
        let id = *state.banked_seeds.keys().next().unwrap();
        let plants_before = state.plants.len();
        state.process_banked_seed_activation(id);
        assert!(!state.banked_seeds.contains_key(&id));
        assert_eq!(state.plants.len(), plants_before + 1);
    }

    #[test]
    fn failed_winter_kills_the_seed() {
        let mut state = banked_state(0.0, 0.5, 0.5);
        let position = Point::new(30.0, 63.0);
        let cell = state.landscape.raster.cell_of(position).unwrap();
        state.spawn_banked_seed(position, cell);
        let id = *state.banked_seeds.keys().next().unwrap();
        let plants_before = state.plants.len();
        state.process_banked_seed_activation(id);
        assert!(state.banked_seeds.is_empty());
        assert_eq!(state.plants.len(), plants_before);
    }

    #[test]
    fn partition_shares_over_many_retests() {
        // bank 0.4, germination 0.5: germinate 0.3, stay 0.4, die 0.3.
        let mut state = banked_state(1.0, 0.4, 0.5);
        let position = Point::new(30.0, 63.0);
        let cell = state.landscape.raster.cell_of(position).unwrap();
        let n = 3_000;
        let plants_before = state.plants.len();
        for _ in 0..n {
            state.spawn_banked_seed(position, cell);
        }
        let ids: Vec<BankedSeedId> = state.banked_seeds.keys().copied().collect();
        for id in ids {
            state.process_banked_seed_activation(id);
        }
        let stayed = state.banked_seeds.len() as f64 / n as f64;
        let germinated = (state.plants.len() - plants_before) as f64 / n as f64;
        assert!((stayed - 0.4).abs() < 0.05, "stayed {stayed}");
        assert!((germinated - 0.3).abs() < 0.05, "germinated {germinated}");
    }
}
