//! Position feed adapters.
//!
//! A host delivers vehicle state either by pushing from a hook inside its
//! own update routine or by being polled. Both adapters expose the same
//! [`PositionFeed`] so the session samples the trail through one path.

use raceline_env::VehicleState;
use std::time::Duration;

pub trait PositionFeed {
    /// Current vehicle state at `now`, or `None` when the host has none.
    fn latest(&mut self, now: Duration) -> Option<VehicleState>;
}

/// Push-based feed: a host hook calls [`PushFeed::push`] on every update.
///
/// A pushed state is served until it is older than `max_age`; after that
/// the vehicle counts as missing until the hook fires again.
#[derive(Debug, Clone)]
pub struct PushFeed {
    max_age: Duration,
    latest: Option<(Duration, VehicleState)>,
    pushes: u64,
}

impl PushFeed {
    pub fn new(max_age: Duration) -> Self {
        Self {
            max_age,
            latest: None,
            pushes: 0,
        }
    }

    /// Records a state delivered at `now`, replacing the previous one.
    pub fn push(&mut self, now: Duration, state: VehicleState) {
        self.latest = Some((now, state));
        self.pushes += 1;
    }

    /// Number of states pushed so far.
    pub fn push_count(&self) -> u64 {
        self.pushes
    }
}

impl PositionFeed for PushFeed {
    fn latest(&mut self, now: Duration) -> Option<VehicleState> {
        let (at, state) = self.latest?;
        (now.saturating_sub(at) <= self.max_age).then_some(state)
    }
}

/// Poll-based fallback: queries the host no more often than `interval`.
///
/// Between polls the result of the last poll is served as-is, so a poll
/// that finds no vehicle reports it missing until the next one.
pub struct PollFeed<F> {
    poll: F,
    interval: Duration,
    last_poll: Option<Duration>,
    cached: Option<VehicleState>,
}

impl<F> PollFeed<F>
where
    F: FnMut() -> Option<VehicleState>,
{
    pub fn new(interval: Duration, poll: F) -> Self {
        Self {
            poll,
            interval,
            last_poll: None,
            cached: None,
        }
    }
}

impl<F> PositionFeed for PollFeed<F>
where
    F: FnMut() -> Option<VehicleState>,
{
    fn latest(&mut self, now: Duration) -> Option<VehicleState> {
        let due = match self.last_poll {
            None => true,
            Some(last) => now
                .checked_sub(last)
                .map_or(false, |elapsed| elapsed >= self.interval),
        };
        if due {
            self.last_poll = Some(now);
            self.cached = (self.poll)();
        }
        self.cached
    }
}

impl<F> std::fmt::Debug for PollFeed<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollFeed")
            .field("interval", &self.interval)
            .field("last_poll", &self.last_poll)
            .field("cached", &self.cached)
            .finish()
    }
}
