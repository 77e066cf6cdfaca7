// tidevetch_sim — pure Rust population-dynamics simulation library.
//
// This crate contains all simulation logic for Tidevetch: a discrete-event
// model of a riverine annual plant in a tidally influenced marsh landscape.
// Seeds disperse by hydrochory (floating on the tide through a river
// network), establishment is throttled by per-cell carrying capacity, and
// every cell shares one log-uniform environmental shock per year. It has
// zero I/O dependencies and can be tested, benchmarked, and run headless.
//
// Module overview:
// - `sim.rs`:         Top-level SimState, event loop, agent dispatch.
// - `calendar.rs`:    Fixed 365-day calendar on a real-valued hour clock.
// - `event.rs`:       EventQueue (priority queue) + narrative SimEvents.
// - `types.rs`:       Point, GridCell, agent and river-graph IDs.
// - `geometry.rs`:    Polyline arc-length indexing and nearest-point queries.
// - `river.rs`:       Directed river network as an arena graph.
// - `raster.rs`:      Competition raster (habitat classes, open-water sentinel).
// - `vitals.rs`:      Survival/fecundity lookup tables by raster class.
// - `plot.rs`:        Per-cell demographic ledger + end-of-run classification.
// - `environment.rs`: Yearly driver — stochasticity, plot registry, termination.
// - `plant.rs`:       Plant lifecycle agent (implanted -> adult -> reproduce).
// - `seed.rs`:        MobileSeed hydrochory agent (the tidal river walk).
// - `banked.rs`:      BankedSeed dormancy agent (optional variant).
// - `cluster.rs`:     DBSCAN spatial diagnostic over reproducing plants.
// - `report.rs`:      Run summary assembly and delimited-row formatting.
// - `landscape.rs`:   Landscape bundle (river, marsh, raster, founders) + demo.
// - `config.rs`:      SimConfig — all tunable parameters.
// - `prng`:           Re-exported from `tidevetch_prng` — xoshiro256++ PRNG.
//
// The companion crate `tidevetch_runner` wraps this library as a CLI binary
// and owns all file I/O. That boundary is enforced at the compiler level —
// this crate cannot open files, print, or read the system clock.
//
// **Critical constraint: determinism.** A run is a pure function:
// `(seed, config, landscape) -> histories`. All randomness comes from one
// seeded xoshiro256++ PRNG. No `HashMap` iteration on any sim path; use
// `BTreeMap` for ordered registries.

pub mod banked;
pub mod calendar;
pub mod cluster;
pub mod config;
pub mod environment;
pub mod event;
pub mod geometry;
pub mod landscape;
pub mod plant;
pub mod plot;
pub mod raster;
pub mod report;
pub mod river;
pub mod seed;
pub mod sim;
pub mod types;
pub mod vitals;
pub use tidevetch_prng as prng;
