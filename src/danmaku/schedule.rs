//! Deferred work for the overlay: reveal an item when its enter delay is up,
//! remove it when its travel is done.
//!
//! Tasks are plain records ordered by due time, so a single-threaded driver
//! (requestAnimationFrame in the browser, a loop in tests) only has to call
//! [`Scheduler::drain_due`] with the current clock.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use super::surface::ItemId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
    Reveal(ItemId),
    Remove(ItemId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug)]
struct Entry {
    due_ms: f64,
    seq: u64,
    task: Task,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed: BinaryHeap is a max-heap and we want the earliest first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due_ms
            .total_cmp(&self.due_ms)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Debug, Default)]
pub struct Scheduler {
    heap: BinaryHeap<Entry>,
    cancelled: HashSet<u64>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_ms: f64, task: Task) -> TaskHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry { due_ms, seq, task });
        TaskHandle(seq)
    }

    pub fn cancel(&mut self, handle: TaskHandle) {
        if self.heap.iter().any(|e| e.seq == handle.0) {
            self.cancelled.insert(handle.0);
        }
    }

    pub fn cancel_all(&mut self) {
        self.heap.clear();
        self.cancelled.clear();
    }

    /// Pop every live task due at or before `now_ms`, earliest first.
    pub fn drain_due(&mut self, now_ms: f64) -> Vec<Task> {
        let mut due = Vec::new();
        while self.heap.peek().is_some_and(|e| e.due_ms <= now_ms) {
            let Some(entry) = self.heap.pop() else { break };
            if !self.cancelled.remove(&entry.seq) {
                due.push(entry.task);
            }
        }
        due
    }

    pub fn pending(&self) -> usize {
        self.heap.len() - self.cancelled.len()
    }

    pub fn next_due(&self) -> Option<f64> {
        self.heap.iter().filter(|e| !self.cancelled.contains(&e.seq)).map(|e| e.due_ms).reduce(f64::min)
    }
}
