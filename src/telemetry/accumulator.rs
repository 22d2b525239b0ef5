/**
 * ============================================================================
 * BATCH ACCUMULATOR MODULE
 * ============================================================================
 *
 * PURPOSE: Buffer composed events in the three priority queues and decide
 *          when a flush happens
 *
 * FLUSH RULES:
 * - An append that brings any queue to the flush threshold drains all
 *   three queues before returning, so no queue is ever observed past the
 *   threshold
 * - A forced flush drains whenever at least one queue holds events
 * - Draining always empties every queue; the returned set carries only
 *   the non-empty ones, in queue-index order
 *
 * ============================================================================
 */

use crate::telemetry::types::{Event, QueuePriority};

/**
 * Non-empty queues handed to the encoder, in queue-index order
 */
pub type FlushSet = Vec<(QueuePriority, Vec<Event>)>;

pub struct BatchAccumulator {
    queues: [Vec<Event>; 3],
    threshold: usize,
}

impl BatchAccumulator {
    pub fn new(threshold: usize) -> Self {
        Self {
            queues: [Vec::new(), Vec::new(), Vec::new()],
            threshold,
        }
    }

    /**
     * Append one event, returning the drained queues when this append
     * reached the flush threshold
     */
    pub fn append(&mut self, event: Event, queue: QueuePriority) -> Option<FlushSet> {
        self.queues[queue.index()].push(event);
        if self.should_flush() {
            self.drain()
        } else {
            None
        }
    }

    /**
     * True when any queue has reached the threshold
     * Restored snapshots can arrive oversized, hence >= rather than ==
     */
    pub fn should_flush(&self) -> bool {
        self.queues.iter().any(|queue| queue.len() >= self.threshold)
    }

    /**
     * Empty every queue, returning the non-empty ones
     */
    pub fn drain(&mut self) -> Option<FlushSet> {
        if self.is_empty() {
            return None;
        }
        let mut set = FlushSet::new();
        for priority in QueuePriority::ALL {
            let events = std::mem::take(&mut self.queues[priority.index()]);
            if !events.is_empty() {
                set.push((priority, events));
            }
        }
        Some(set)
    }

    pub fn is_empty(&self) -> bool {
        self.queues.iter().all(|queue| queue.is_empty())
    }

    pub fn total_pending(&self) -> usize {
        self.queues.iter().map(|queue| queue.len()).sum()
    }

    /**
     * Borrow the queues for snapshotting
     */
    pub fn queues(&self) -> &[Vec<Event>; 3] {
        &self.queues
    }

    /**
     * Seed the queues from a snapshot; snapshot events sit in front of
     * anything already buffered
     */
    pub fn restore(&mut self, snapshot: [Vec<Event>; 3]) {
        for (queue, mut loaded) in self.queues.iter_mut().zip(snapshot) {
            loaded.append(queue);
            *queue = loaded;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(name: &str) -> Event {
        let mut event = Event::new();
        event.push("name", json!(name));
        event
    }

    #[test]
    fn test_threshold_triggers_exactly_one_flush() {
        let mut accumulator = BatchAccumulator::new(50);
        for i in 0..49 {
            let result = accumulator.append(event(&format!("e{}", i)), QueuePriority::Default);
            assert!(result.is_none(), "flush fired early at append {}", i);
        }
        assert_eq!(accumulator.total_pending(), 49);

        let set = accumulator
            .append(event("e49"), QueuePriority::Default)
            .expect("50th append must flush");
        assert_eq!(set.len(), 1);
        assert_eq!(set[0].0, QueuePriority::Default);
        assert_eq!(set[0].1.len(), 50);
        assert!(accumulator.is_empty());
    }

    #[test]
    fn test_flush_drains_all_queues() {
        let mut accumulator = BatchAccumulator::new(3);
        accumulator.append(event("low"), QueuePriority::Low);
        accumulator.append(event("a"), QueuePriority::Default);
        accumulator.append(event("b"), QueuePriority::Default);
        let set = accumulator
            .append(event("c"), QueuePriority::Default)
            .expect("threshold reached");

        // Both non-empty queues drain together, in queue-index order
        assert_eq!(set.len(), 2);
        assert_eq!(set[0].0, QueuePriority::Default);
        assert_eq!(set[0].1.len(), 3);
        assert_eq!(set[1].0, QueuePriority::Low);
        assert_eq!(set[1].1.len(), 1);
        assert!(accumulator.is_empty());
    }

    #[test]
    fn test_drain_on_empty_is_none() {
        let mut accumulator = BatchAccumulator::new(10);
        assert!(accumulator.drain().is_none());
    }

    #[test]
    fn test_forced_drain_below_threshold() {
        let mut accumulator = BatchAccumulator::new(10);
        accumulator.append(event("a"), QueuePriority::High);
        let set = accumulator.drain().expect("one queue is non-empty");
        assert_eq!(set.len(), 1);
        assert_eq!(set[0].0, QueuePriority::High);
        assert!(accumulator.is_empty());
    }

    #[test]
    fn test_restore_seeds_in_front() {
        let mut accumulator = BatchAccumulator::new(10);
        accumulator.append(event("fresh"), QueuePriority::Default);
        accumulator.restore([vec![event("old")], Vec::new(), Vec::new()]);

        let set = accumulator.drain().unwrap();
        assert_eq!(set[0].1.len(), 2);
        assert_eq!(set[0].1[0].get("name").unwrap(), &json!("old"));
        assert_eq!(set[0].1[1].get("name").unwrap(), &json!("fresh"));
    }

    #[test]
    fn test_oversized_restore_flushes_on_next_append() {
        let mut accumulator = BatchAccumulator::new(3);
        accumulator.restore([
            vec![event("a"), event("b"), event("c"), event("d")],
            Vec::new(),
            Vec::new(),
        ]);

        let set = accumulator
            .append(event("e"), QueuePriority::Default)
            .expect("oversized queue must flush");
        assert_eq!(set[0].1.len(), 5);
        assert!(accumulator.is_empty());
    }
}
