//! Logical clock for driving the schedule without real time
//!
//! Used by tests and the native front end in place of `setTimeout`.

use std::time::Duration;

use super::Timer;
use crate::sim::TickTicket;

#[derive(Debug, Clone, Copy)]
struct Pending {
    due: Duration,
    seq: u64,
    ticket: TickTicket,
}

/// Manually advanced timer queue
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Duration,
    next_seq: u64,
    pending: Vec<Pending>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logical time elapsed since the clock was created
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of scheduled, uncancelled tickets
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// When the earliest pending ticket is due
    pub fn next_due(&self) -> Option<Duration> {
        self.pending.iter().map(|p| p.due).min()
    }

    /// Jump to the earliest pending ticket and hand it out
    pub fn fire_next(&mut self) -> Option<TickTicket> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .min_by_key(|(_, p)| (p.due, p.seq))
            .map(|(i, _)| i)?;
        let entry = self.pending.remove(idx);
        self.now = self.now.max(entry.due);
        Some(entry.ticket)
    }

    /// Move time forward and return every ticket now due, earliest first.
    ///
    /// Tickets scheduled while handling the returned ones are not included,
    /// even if they fall inside the window; call again to collect them.
    pub fn advance(&mut self, by: Duration) -> Vec<TickTicket> {
        self.now += by;
        let now = self.now;
        let mut due: Vec<Pending> = Vec::new();
        self.pending.retain(|p| {
            if p.due <= now {
                due.push(*p);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|p| (p.due, p.seq));
        due.into_iter().map(|p| p.ticket).collect()
    }
}

impl Timer for ManualClock {
    fn schedule(&mut self, delay: Duration, ticket: TickTicket) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Pending {
            due: self.now + delay,
            seq,
            ticket,
        });
    }

    fn cancel(&mut self, ticket: TickTicket) {
        self.pending.retain(|p| p.ticket != ticket);
    }
}
