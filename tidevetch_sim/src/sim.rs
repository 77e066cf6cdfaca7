// Core simulation state and event loop.
//
// `SimState` is the single source of truth for a run. It owns the clock,
// the PRNG, the config, the event queue, the environment (year state and
// plot registry), the read-only landscape, and the three agent registries
// (plants, floating seeds, banked seeds). A run is a pure function:
// `(seed, config, landscape) -> histories` — no I/O, no wall clock.
//
// ## Activation model
//
// Every agent schedules its own future activations into the event queue
// and is activated synchronously when the loop pops its entry. An agent
// holds at most one pending activation at a time; terminal outcomes remove
// the agent from its registry instead of re-scheduling, so an activation
// for a missing agent is a scheduling bug and panics. The environment's
// year-boundary activation is scheduled exactly once per simulated Dec 31
// and is the only place the run can end.
//
// Construction spawns the founder populations (each founder's adults
// scattered uniformly within 2 units), draws year 0's stochasticity, and
// schedules the first year boundary. `run()` then drives the queue to
// termination and returns the summary plus the narrative event log.
//
// See also: `event.rs` for the queue, `plant.rs`/`seed.rs`/`banked.rs`/
// `environment.rs` for the per-agent activation logic.
//
// **Critical constraint: determinism.** All state mutations flow through
// scheduled events in `(time, sequence)` order; all randomness comes from
// the one seeded PRNG. Two runs with the same seed, config, and landscape
// produce byte-identical histories.

use crate::banked::BankedSeed;
use crate::calendar::{self, NEW_YEAR};
use crate::config::SimConfig;
use crate::environment::Environment;
use crate::event::{EventQueue, ScheduledEventKind, SimEvent};
use crate::landscape::Landscape;
use crate::plant::Plant;
use crate::report::RunSummary;
use crate::seed::MobileSeed;
use crate::types::*;
use std::collections::BTreeMap;
use tidevetch_prng::SimRng;

/// Founder adults scatter uniformly within this radius of their record.
const FOUNDER_SCATTER: f64 = 2.0;

/// Top-level simulation state.
pub struct SimState {
    /// Current clock, in hours since the start of the run.
    pub clock: f64,

    /// The run's deterministic PRNG — the sole source of randomness.
    pub rng: SimRng,

    /// Run configuration (immutable after construction).
    pub config: SimConfig,

    /// The event priority queue driving the discrete event simulation.
    pub queue: EventQueue,

    /// Year state: stochasticity, plot registry, histories.
    pub environment: Environment,

    /// The read-only spatial inputs.
    pub landscape: Landscape,

    /// Living plant agents, keyed by ID. BTreeMap for deterministic iteration.
    pub plants: BTreeMap<PlantId, Plant>,

    /// Floating seed agents currently on the river.
    pub seeds: BTreeMap<SeedId, MobileSeed>,

    /// Dormant seeds in the bank (empty unless the variant is enabled).
    pub banked_seeds: BTreeMap<BankedSeedId, BankedSeed>,

    /// Set once, at the year boundary that ends the run.
    pub outcome: Option<RunOutcome>,

    next_plant_id: u64,
    next_seed_id: u64,
    next_banked_seed_id: u64,
}

/// How and when a run ended.
#[derive(Clone, Debug)]
pub struct RunOutcome {
    pub reason: EndReason,
    pub year: u32,
    pub summary: RunSummary,
}

/// The narrative events emitted while stepping.
pub struct StepResult {
    pub events: Vec<SimEvent>,
}

/// The product of a completed run.
pub struct RunReport {
    pub summary: RunSummary,
    pub events: Vec<SimEvent>,
}

impl SimState {
    /// A run on the demo landscape with default config.
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, SimConfig::default(), Landscape::demo(seed))
    }

    /// Construct a run: founder spawn, year-0 stochasticity, first boundary.
    ///
    /// Panics on an invalid config — the runner validates before handing
    /// one over, so this is a programming error, not user input.
    pub fn with_config(seed: u64, config: SimConfig, landscape: Landscape) -> Self {
        if let Err(problem) = config.validate() {
            panic!("invalid simulation config: {problem}");
        }
        let mut rng = SimRng::new(seed);
        let environment = Environment::new(&config, &mut rng);

        let mut state = Self {
            clock: 0.0,
            rng,
            config,
            queue: EventQueue::new(),
            environment,
            landscape,
            plants: BTreeMap::new(),
            seeds: BTreeMap::new(),
            banked_seeds: BTreeMap::new(),
            outcome: None,
            next_plant_id: 0,
            next_seed_id: 0,
            next_banked_seed_id: 0,
        };

        let founders = state.landscape.founders.clone();
        for founder in founders {
            for _ in 0..founder.count {
                let angle = state.rng.next_f64() * 2.0 * std::f64::consts::PI;
                let distance = state.rng.next_f64() * FOUNDER_SCATTER;
                state.spawn_founder_adult(founder.position.offset_by(angle, distance));
            }
        }

        state.queue.schedule(
            calendar::next_clock_time_for(NEW_YEAR, 0.0),
            ScheduledEventKind::YearBoundary,
        );
        state
    }

    /// Process every event scheduled up to `target` hours, in order,
    /// stopping early if the run terminates.
    pub fn step_until(&mut self, target: f64) -> StepResult {
        let mut events = Vec::new();
        while self.outcome.is_none() {
            let Some(event) = self.queue.pop_if_ready(target) else {
                break;
            };
            self.clock = event.time;
            self.process_event(event.kind, &mut events);
        }
        if self.outcome.is_none() && target > self.clock {
            self.clock = target;
        }
        StepResult { events }
    }

    /// Drive the run to termination.
    pub fn run(&mut self) -> RunReport {
        let mut events = Vec::new();
        while self.outcome.is_none() {
            let Some(next) = self.queue.peek_time() else {
                unreachable!("event queue drained before a termination condition");
            };
            events.append(&mut self.step_until(next).events);
        }
        let outcome = self.outcome.as_ref().unwrap();
        RunReport {
            summary: outcome.summary.clone(),
            events,
        }
    }

    fn process_event(&mut self, kind: ScheduledEventKind, events: &mut Vec<SimEvent>) {
        match kind {
            ScheduledEventKind::PlantActivation { plant_id } => {
                self.process_plant_activation(plant_id);
            }
            ScheduledEventKind::SeedActivation { seed_id } => {
                self.process_seed_activation(seed_id);
            }
            ScheduledEventKind::BankedSeedActivation { seed_id } => {
                self.process_banked_seed_activation(seed_id);
            }
            ScheduledEventKind::YearBoundary => {
                self.process_year_boundary(events);
            }
        }
    }

    pub(crate) fn alloc_plant_id(&mut self) -> PlantId {
        let id = PlantId(self.next_plant_id);
        self.next_plant_id += 1;
        id
    }

    pub(crate) fn alloc_seed_id(&mut self) -> SeedId {
        let id = SeedId(self.next_seed_id);
        self.next_seed_id += 1;
        id
    }

    pub(crate) fn alloc_banked_seed_id(&mut self) -> BankedSeedId {
        let id = BankedSeedId(self.next_banked_seed_id);
        self.next_banked_seed_id += 1;
        id
    }
}
