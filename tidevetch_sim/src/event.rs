// Simulation events — both the internal scheduling queue and observer-visible
// narrative events.
//
// The sim uses a discrete event simulation model. Agents schedule their own
// future activations into a priority queue ordered by `(time, sequence)`,
// where time is the real-valued hour clock. The sim processes them in order,
// advancing the clock as needed. Quiet stretches of the year cost nothing.
//
// This file defines two related but distinct concepts:
// - `ScheduledEvent`: internal events in the priority queue that drive the sim.
// - `SimEvent`: observer-visible narrative events emitted as output.
//
// See also: `sim.rs` for the loop that processes scheduled events,
// `calendar.rs` for the date-to-clock mapping agents schedule against.
//
// **Critical constraint: determinism.** Event ordering must be identical
// across runs with the same seed. The `(time, sequence)` key provides a total
// order: `f64::total_cmp` on time, then the monotonic sequence number, so
// simultaneous events fire in the order they were scheduled (FIFO).

use crate::types::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

// ---------------------------------------------------------------------------
// Internal scheduled events (priority queue)
// ---------------------------------------------------------------------------

/// An event scheduled for future processing by the simulation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScheduledEvent {
    /// The clock hour at which this event should fire.
    pub time: f64,
    /// Unique ordering key for deterministic tiebreaking at equal times.
    /// Lower values are processed first.
    pub sequence: u64,
    /// What should happen when this event fires.
    pub kind: ScheduledEventKind,
}

/// The types of internal events the sim can schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduledEventKind {
    /// A plant's next lifecycle date (seedling survival check or reproduction).
    PlantActivation { plant_id: PlantId },
    /// A floating seed's next hourly tidal step.
    SeedActivation { seed_id: SeedId },
    /// A banked seed's yearly germination retest.
    BankedSeedActivation { seed_id: BankedSeedId },
    /// The once-per-year environment boundary (Dec 31).
    YearBoundary,
}

// We want a min-heap: lowest (time, sequence) fires first.
// Rust's BinaryHeap is a max-heap, so we reverse the ordering.
impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.time.to_bits() == other.time.to_bits() && self.sequence == other.sequence
    }
}

impl Eq for ScheduledEvent {}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse: smallest (time, sequence) should be "greatest" for the
        // max-heap. total_cmp is a total order, consistent with the
        // bit-equality above.
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Priority queue of scheduled events. Wraps a `BinaryHeap` with reversed
/// ordering to give us a min-heap (earliest time fires first).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventQueue {
    heap: BinaryHeap<ScheduledEvent>,
    /// Monotonic counter for deterministic ordering at equal times.
    next_sequence: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule an event at the given clock hour.
    pub fn schedule(&mut self, time: f64, kind: ScheduledEventKind) {
        debug_assert!(time.is_finite(), "event time must be finite");
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(ScheduledEvent {
            time,
            sequence,
            kind,
        });
    }

    /// Peek at the next event's time without removing it.
    pub fn peek_time(&self) -> Option<f64> {
        self.heap.peek().map(|e| e.time)
    }

    /// Pop the next event if its time is <= `up_to`.
    pub fn pop_if_ready(&mut self, up_to: f64) -> Option<ScheduledEvent> {
        if self.heap.peek().is_some_and(|e| e.time <= up_to) {
            self.heap.pop()
        } else {
            None
        }
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Observer-visible narrative events (output)
// ---------------------------------------------------------------------------

/// A narrative event emitted by the simulation for the runner / logs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimEvent {
    pub time: f64,
    pub kind: SimEventKind,
}

/// Types of narrative events visible to observers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum SimEventKind {
    /// A year boundary was processed and the run continues.
    YearCompleted {
        year: u32,
        population: usize,
        stochasticity: f64,
    },
    /// The run hit a termination condition at a year boundary.
    SimulationEnded { reason: EndReason, year: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_queue_ordering() {
        let mut queue = EventQueue::new();
        // Schedule out of order.
        queue.schedule(
            100.0,
            ScheduledEventKind::PlantActivation {
                plant_id: PlantId(2),
            },
        );
        queue.schedule(
            50.0,
            ScheduledEventKind::PlantActivation {
                plant_id: PlantId(1),
            },
        );
        queue.schedule(
            50.0,
            ScheduledEventKind::PlantActivation {
                plant_id: PlantId(2),
            },
        );

        // Should pop in time order, then sequence order within an instant.
        let first = queue.pop_if_ready(200.0).unwrap();
        assert_eq!(first.time, 50.0);
        assert_eq!(first.sequence, 1); // PlantId(1) was scheduled second but at 50.0

        let second = queue.pop_if_ready(200.0).unwrap();
        assert_eq!(second.time, 50.0);
        assert_eq!(second.sequence, 2);

        let third = queue.pop_if_ready(200.0).unwrap();
        assert_eq!(third.time, 100.0);

        assert!(queue.pop_if_ready(200.0).is_none());
    }

    #[test]
    fn simultaneous_events_fire_in_schedule_order() {
        let mut queue = EventQueue::new();
        for id in 0..10 {
            queue.schedule(
                8736.0,
                ScheduledEventKind::SeedActivation {
                    seed_id: SeedId(id),
                },
            );
        }
        let mut popped = Vec::new();
        while let Some(ev) = queue.pop_if_ready(8736.0) {
            if let ScheduledEventKind::SeedActivation { seed_id } = ev.kind {
                popped.push(seed_id.0);
            }
        }
        assert_eq!(popped, (0..10).collect::<Vec<u64>>());
    }

    #[test]
    fn pop_if_ready_respects_time_limit() {
        let mut queue = EventQueue::new();
        queue.schedule(100.5, ScheduledEventKind::YearBoundary);

        // Not ready yet.
        assert!(queue.pop_if_ready(100.49).is_none());
        // Ready now (boundary is inclusive).
        assert!(queue.pop_if_ready(100.5).is_some());
    }

    #[test]
    fn fractional_times_order_correctly() {
        let mut queue = EventQueue::new();
        queue.schedule(7.25, ScheduledEventKind::YearBoundary);
        queue.schedule(7.125, ScheduledEventKind::YearBoundary);
        queue.schedule(7.5, ScheduledEventKind::YearBoundary);
        assert_eq!(queue.pop_if_ready(f64::MAX).unwrap().time, 7.125);
        assert_eq!(queue.pop_if_ready(f64::MAX).unwrap().time, 7.25);
        assert_eq!(queue.pop_if_ready(f64::MAX).unwrap().time, 7.5);
    }

    #[test]
    fn event_queue_serialization() {
        let mut queue = EventQueue::new();
        queue.schedule(
            10.0,
            ScheduledEventKind::PlantActivation {
                plant_id: PlantId(1),
            },
        );
        queue.schedule(5.0, ScheduledEventKind::YearBoundary);

        let json = serde_json::to_string(&queue).unwrap();
        let mut restored: EventQueue = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.len(), 2);
        let first = restored.pop_if_ready(f64::MAX).unwrap();
        assert_eq!(first.time, 5.0);
        assert!(matches!(first.kind, ScheduledEventKind::YearBoundary));
    }
}
