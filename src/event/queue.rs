// Pending (target process, event) deliveries

use super::Event;
use std::collections::VecDeque;

/// FIFO of deliveries awaiting the next drain.
#[derive(Debug, Default)]
pub struct EventQueue {
    pending: VecDeque<(usize, Event)>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, target: usize, event: Event) {
        self.pending.push_back((target, event));
    }

    pub fn pop(&mut self) -> Option<(usize, Event)> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(usize, Event)> {
        self.pending.iter()
    }

    /// Drop deliveries for a removed process and shift the ids above it
    /// down by one.
    pub fn remove_process(&mut self, id: usize) {
        self.pending.retain(|(target, _)| *target != id);
        for (target, _) in self.pending.iter_mut() {
            if *target > id {
                *target -= 1;
            }
        }
    }
}
