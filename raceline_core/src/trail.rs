//! Bounded trail history and the time gate that feeds it.

use crate::geometry::Sample;
use std::collections::VecDeque;
use std::time::Duration;

/// Fixed-capacity FIFO of observed samples, oldest first.
///
/// Invariant: `len() <= capacity()` after every operation. Appending past
/// capacity evicts from the head.
#[derive(Debug, Clone)]
pub struct TrailBuffer {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl TrailBuffer {
    /// Creates an empty trail holding at most `capacity` samples.
    ///
    /// A capacity of zero is bumped to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Inserts at the tail, evicting the oldest samples if over capacity.
    pub fn append(&mut self, sample: Sample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Empties the buffer (user-triggered reset).
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Copies the current contents, oldest first.
    ///
    /// The returned vector is detached from the buffer.
    pub fn snapshot(&self) -> Vec<Sample> {
        self.samples.iter().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recently appended sample.
    pub fn newest(&self) -> Option<&Sample> {
        self.samples.back()
    }
}

/// Rate limiter deciding whether this frame appends to the trail.
///
/// Gating on elapsed time rather than frame count keeps the trail close to
/// uniform in time whatever the render rate.
#[derive(Debug, Clone)]
pub struct SampleGate {
    interval: Duration,
    last: Option<Duration>,
}

impl SampleGate {
    pub fn new(interval: Duration) -> Self {
        Self { interval, last: None }
    }

    /// Returns true (and records `now`) when at least `interval` has passed
    /// since the last accepted call. The first call is always accepted.
    pub fn ready(&mut self, now: Duration) -> bool {
        let open = match self.last {
            None => true,
            Some(last) => now.checked_sub(last).map_or(false, |elapsed| elapsed >= self.interval),
        };
        if open {
            self.last = Some(now);
        }
        open
    }

    /// Forgets the last accepted time so the next call fires immediately.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
