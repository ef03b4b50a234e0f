//! Latest-wins debouncing.
//!
//! Each [`Debouncer::schedule`] bumps a generation counter and replaces the
//! pending value. A value only fires if its generation is still current, so a
//! superseded reload can never overwrite a newer one. Time is passed in by
//! the caller which keeps the logic independent of any runtime.

use std::time::{Duration, Instant};

/// Quiet period before the sandbox is reloaded after an edit.
pub const RELOAD_DEBOUNCE: Duration = Duration::from_millis(400);

/// Handle to one scheduled value. Stale once anything newer is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    generation: u64,
    due: Instant,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn due(&self) -> Instant {
        self.due
    }
}

#[derive(Debug)]
struct Pending<T> {
    ticket: Ticket,
    value: T,
}

#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    generation: u64,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replaces any pending value; the new one is due `delay` after `now`.
    pub fn schedule(&mut self, value: T, now: Instant) -> Ticket {
        self.generation += 1;
        let ticket = Ticket {
            generation: self.generation,
            due: now + self.delay,
        };
        self.pending = Some(Pending { ticket, value });
        ticket
    }

    /// Fires the pending value if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some(p) if p.ticket.due <= now => self.pending.take().map(|p| p.value),
            _ => None,
        }
    }

    /// Fires the pending value only if `ticket` is still the current generation.
    /// Used by timer-driven callers that sleep until the ticket is due.
    pub fn take_if_current(&mut self, ticket: Ticket) -> Option<T> {
        match &self.pending {
            Some(p) if p.ticket.generation == ticket.generation => {
                self.pending.take().map(|p| p.value)
            }
            _ => None,
        }
    }

    /// Drops the pending value. Outstanding tickets become stale.
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.pending = None;
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.ticket.due)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_after_quiet_period() {
        let start = Instant::now();
        let mut d = Debouncer::new(RELOAD_DEBOUNCE);
        d.schedule("a", start);

        assert_eq!(d.poll(start + Duration::from_millis(399)), None);
        assert_eq!(d.poll(start + RELOAD_DEBOUNCE), Some("a"));
        assert_eq!(d.poll(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn newer_schedule_supersedes_pending() {
        let start = Instant::now();
        let mut d = Debouncer::new(RELOAD_DEBOUNCE);
        let first = d.schedule("old", start);
        let second = d.schedule("new", start + Duration::from_millis(100));

        assert_eq!(d.take_if_current(first), None);
        assert_eq!(d.next_deadline(), Some(second.due()));
        assert_eq!(d.take_if_current(second), Some("new"));
    }

    #[test]
    fn cancel_invalidates_tickets() {
        let start = Instant::now();
        let mut d = Debouncer::new(RELOAD_DEBOUNCE);
        let ticket = d.schedule(1, start);
        d.cancel();

        assert!(!d.is_pending());
        assert_eq!(d.take_if_current(ticket), None);
        assert_eq!(d.poll(start + Duration::from_secs(1)), None);
    }
}
