//! Cooperative timer scheduler
//!
//! Single-threaded stand-in for `setInterval`/`setTimeout`: timers live on a
//! virtual millisecond clock and only fire when the owner pops them. Each
//! popped timer is handled to completion before the next one is popped, so a
//! handler may freely cancel or schedule other timers.

use std::collections::{BTreeMap, HashMap};

/// Cancellation token for a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

#[derive(Debug, Clone)]
struct Entry<T> {
    payload: T,
    /// `Some` for repeating timers
    period: Option<u64>,
}

/// A timer that came due
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<T> {
    pub at_ms: u64,
    pub payload: T,
}

/// Virtual-clock timer queue ordered by (due time, timer id)
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now_ms: u64,
    next_id: u64,
    queue: BTreeMap<(u64, TimerId), Entry<T>>,
    due_by_id: HashMap<TimerId, u64>,
}

impl<T: Clone> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_id: 1,
            queue: BTreeMap::new(),
            due_by_id: HashMap::new(),
        }
    }

    /// Current virtual time
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Number of live timers
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.due_by_id.contains_key(&id)
    }

    /// Fire once, `delay_ms` from now
    pub fn set_timeout(&mut self, delay_ms: u64, payload: T) -> TimerId {
        self.insert(delay_ms, payload, None)
    }

    /// Fire every `period_ms`, first time one period from now
    pub fn set_interval(&mut self, period_ms: u64, payload: T) -> TimerId {
        // A zero period would pin the clock in place
        let period_ms = period_ms.max(1);
        self.insert(period_ms, payload, Some(period_ms))
    }

    fn insert(&mut self, delay_ms: u64, payload: T, period: Option<u64>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let due = self.now_ms.saturating_add(delay_ms);
        self.queue.insert((due, id), Entry { payload, period });
        self.due_by_id.insert(id, due);
        id
    }

    /// Cancel a timer. Returns false if it already fired (one-shot) or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.due_by_id.remove(&id) {
            Some(due) => self.queue.remove(&(due, id)).is_some(),
            None => false,
        }
    }

    /// Cancel everything, returning how many timers were live
    pub fn cancel_all(&mut self) -> usize {
        let count = self.queue.len();
        self.queue.clear();
        self.due_by_id.clear();
        count
    }

    /// Pop the earliest timer due at or before `until_ms`.
    ///
    /// The clock jumps to the timer's due time. Repeating timers are re-armed
    /// under the same id before being returned.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<Fired<T>> {
        let (&(due, id), _) = self.queue.first_key_value()?;
        if due > until_ms {
            return None;
        }
        let entry = self.queue.remove(&(due, id))?;
        self.due_by_id.remove(&id);
        self.now_ms = self.now_ms.max(due);

        if let Some(period) = entry.period {
            let next_due = due.saturating_add(period);
            self.queue.insert(
                (next_due, id),
                Entry {
                    payload: entry.payload.clone(),
                    period: entry.period,
                },
            );
            self.due_by_id.insert(id, next_due);
        }

        Some(Fired {
            at_ms: due,
            payload: entry.payload,
        })
    }

    /// Move the clock forward without firing anything
    pub fn advance_to(&mut self, ms: u64) {
        self.now_ms = self.now_ms.max(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(sched: &mut Scheduler<&'static str>, until: u64) -> Vec<(u64, &'static str)> {
        let mut fired = Vec::new();
        while let Some(f) = sched.pop_due(until) {
            fired.push((f.at_ms, f.payload));
        }
        sched.advance_to(until);
        fired
    }

    #[test]
    fn test_timeouts_fire_in_due_order() {
        let mut sched = Scheduler::new();
        sched.set_timeout(300, "late");
        sched.set_timeout(100, "early");
        assert_eq!(drain(&mut sched, 1000), vec![(100, "early"), (300, "late")]);
        assert_eq!(sched.pending(), 0);
        assert_eq!(sched.now_ms(), 1000);
    }

    #[test]
    fn test_ties_break_by_schedule_order() {
        let mut sched = Scheduler::new();
        sched.set_interval(1000, "spawn");
        sched.set_interval(1000, "clock");
        let fired = drain(&mut sched, 1000);
        assert_eq!(fired, vec![(1000, "spawn"), (1000, "clock")]);
    }

    #[test]
    fn test_interval_repeats() {
        let mut sched = Scheduler::new();
        sched.set_interval(400, "tick");
        assert_eq!(drain(&mut sched, 1000).len(), 2);
        assert_eq!(drain(&mut sched, 1200).len(), 1);
        assert_eq!(sched.pending(), 1);
    }

    #[test]
    fn test_not_due_stays_queued() {
        let mut sched = Scheduler::new();
        let id = sched.set_timeout(500, "later");
        assert!(drain(&mut sched, 499).is_empty());
        assert!(sched.is_pending(id));
    }

    #[test]
    fn test_cancel() {
        let mut sched = Scheduler::new();
        let a = sched.set_timeout(100, "a");
        let b = sched.set_interval(100, "b");
        assert!(sched.cancel(a));
        assert!(!sched.cancel(a), "double cancel is a no-op");
        assert!(sched.cancel(b));
        assert!(drain(&mut sched, 10_000).is_empty());
    }

    #[test]
    fn test_fired_timeout_cannot_be_cancelled() {
        let mut sched = Scheduler::new();
        let id = sched.set_timeout(10, "once");
        drain(&mut sched, 10);
        assert!(!sched.cancel(id));
    }

    #[test]
    fn test_cancel_all() {
        let mut sched = Scheduler::new();
        sched.set_timeout(10, "a");
        sched.set_interval(20, "b");
        assert_eq!(sched.cancel_all(), 2);
        assert!(drain(&mut sched, 1000).is_empty());
    }

    #[test]
    fn test_clock_tracks_fired_timer_during_drain() {
        let mut sched = Scheduler::new();
        sched.set_timeout(250, "a");
        let fired = sched.pop_due(1000).unwrap();
        assert_eq!(fired.at_ms, 250);
        assert_eq!(sched.now_ms(), 250);
        // Scheduled from inside a handler, relative to the handler's time
        sched.set_timeout(100, "b");
        assert_eq!(drain(&mut sched, 1000), vec![(350, "b")]);
    }
}
