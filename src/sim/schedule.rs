//! Tick-keyed event queue
//!
//! Staggered work (trailing sparks, confetti pieces, delayed UI screens) is
//! queued here and drained deterministically from inside the tick loop.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

struct Scheduled<T> {
    due: u64,
    seq: u64,
    payload: T,
}

impl<T> PartialEq for Scheduled<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<T> Eq for Scheduled<T> {}

impl<T> PartialOrd for Scheduled<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Scheduled<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

/// Min-heap of payloads ordered by due tick, FIFO within a tick
pub struct Scheduler<T> {
    queue: BinaryHeap<Reverse<Scheduled<T>>>,
    next_seq: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            queue: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Queue `payload` to fire on tick `due`
    pub fn schedule(&mut self, due: u64, payload: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Scheduled { due, seq, payload }));
    }

    /// Pop the next payload whose due tick is `<= now`
    pub fn pop_due(&mut self, now: u64) -> Option<T> {
        match self.queue.peek() {
            Some(Reverse(next)) if next.due <= now => self.queue.pop().map(|Reverse(s)| s.payload),
            _ => None,
        }
    }

    /// Remove and return every payload due by `now`, in firing order
    pub fn drain_due(&mut self, now: u64) -> Vec<T> {
        let mut due = Vec::new();
        while let Some(payload) = self.pop_due(now) {
            due.push(payload);
        }
        due
    }

    /// Tick of the earliest queued payload
    pub fn next_due(&self) -> Option<u64> {
        self.queue.peek().map(|Reverse(s)| s.due)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_due_order() {
        let mut sched = Scheduler::new();
        sched.schedule(30, "c");
        sched.schedule(10, "a");
        sched.schedule(20, "b");

        assert_eq!(sched.next_due(), Some(10));
        assert!(sched.drain_due(5).is_empty());
        assert_eq!(sched.drain_due(20), vec!["a", "b"]);
        assert_eq!(sched.len(), 1);
        assert_eq!(sched.drain_due(100), vec!["c"]);
        assert!(sched.is_empty());
    }

    #[test]
    fn test_same_tick_is_fifo() {
        let mut sched = Scheduler::new();
        for i in 0..10 {
            sched.schedule(7, i);
        }
        assert_eq!(sched.drain_due(7), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_pop_due_stops_at_future() {
        let mut sched = Scheduler::new();
        sched.schedule(1, 'x');
        sched.schedule(2, 'y');
        assert_eq!(sched.pop_due(1), Some('x'));
        assert_eq!(sched.pop_due(1), None);
        assert_eq!(sched.pop_due(2), Some('y'));
    }

    #[test]
    fn test_clear() {
        let mut sched = Scheduler::new();
        sched.schedule(1, ());
        sched.schedule(2, ());
        sched.clear();
        assert!(sched.is_empty());
        assert_eq!(sched.next_due(), None);
    }
}
