// Deferred "call me back in N ms" timers. The transport never sleeps; it asks
// a scheduler for a handle and whoever drives the loop hands the handle back
// once it is due.

use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

pub trait Scheduler {
    fn schedule(&mut self, delay: Duration) -> TimerHandle;

    /// Forget a timer. Cancelling one that already fired is a no-op.
    fn cancel(&mut self, handle: TimerHandle);
}

/// Wall clock timers, polled by the UI loop.
///
/// A timer scheduled while another one is firing is measured from that
/// timer's deadline rather than from when the loop got around to it, so
/// frame jitter doesn't pile up into tempo drift. If that deadline has
/// already passed the loop stalled for a whole step, and the timer starts
/// from now instead, so missed steps are dropped rather than played in a
/// burst.
#[derive(Debug, Default)]
pub struct ClockScheduler {
    next_id: u64,
    pending: Vec<(TimerHandle, Instant)>,
    anchor: Option<Instant>, // deadline of the timer currently firing
}

impl ClockScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|(_, at)| *at).min()
    }

    /// Pop the earliest timer whose deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Option<TimerHandle> {
        let (idx, _) = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, (_, at))| *at <= now)
            .min_by_key(|(_, (_, at))| *at)?;
        let (handle, at) = self.pending.swap_remove(idx);
        self.anchor = Some(at);
        Some(handle)
    }

    #[cfg(test)]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn schedule_from(&mut self, now: Instant, delay: Duration) -> TimerHandle {
        let at = match self.anchor.take() {
            Some(anchor) if anchor + delay > now => anchor + delay,
            _ => now + delay,
        };
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.pending.push((handle, at));
        handle
    }
}

impl Scheduler for ClockScheduler {
    fn schedule(&mut self, delay: Duration) -> TimerHandle {
        self.schedule_from(Instant::now(), delay)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.pending.retain(|(h, _)| *h != handle);
        // a cancel means the next schedule is a fresh start, not a follow-on
        self.anchor = None;
    }
}

/// Timers on a virtual clock that only moves when asked. Used for tests and
/// for bouncing a pattern to disk faster than real time.
#[derive(Debug, Default)]
pub struct VirtualScheduler {
    next_id: u64,
    now: Duration,
    pending: Vec<(TimerHandle, Duration)>,
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    #[cfg(test)]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Jump the clock to the earliest pending timer and return it.
    pub fn advance(&mut self) -> Option<TimerHandle> {
        self.advance_until(Duration::MAX)
    }

    /// Like `advance`, but only if the timer is due at or before `limit`.
    /// Otherwise the clock moves to `limit`.
    pub fn advance_until(&mut self, limit: Duration) -> Option<TimerHandle> {
        let earliest = self
            .pending
            .iter()
            .enumerate()
            .min_by_key(|(_, (_, at))| *at)
            .map(|(i, (_, at))| (i, *at));
        match earliest {
            Some((idx, at)) if at <= limit => {
                let (handle, at) = self.pending.swap_remove(idx);
                self.now = self.now.max(at);
                Some(handle)
            }
            _ => {
                if limit != Duration::MAX {
                    self.now = self.now.max(limit);
                }
                None
            }
        }
    }
}

impl Scheduler for VirtualScheduler {
    fn schedule(&mut self, delay: Duration) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.pending.push((handle, self.now + delay));
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.pending.retain(|(h, _)| *h != handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn virtual_timers_fire_in_deadline_order() {
        let mut s = VirtualScheduler::new();
        let late = s.schedule(Duration::from_millis(30));
        let early = s.schedule(Duration::from_millis(10));
        assert_eq!(s.advance(), Some(early));
        assert_eq!(s.now(), Duration::from_millis(10));
        assert_eq!(s.advance(), Some(late));
        assert_eq!(s.now(), Duration::from_millis(30));
        assert_eq!(s.advance(), None);
    }

    #[test]
    fn cancelled_virtual_timer_never_fires() {
        let mut s = VirtualScheduler::new();
        let h = s.schedule(Duration::from_millis(5));
        s.cancel(h);
        assert_eq!(s.pending_count(), 0);
        assert_eq!(s.advance(), None);
        // second cancel is harmless
        s.cancel(h);
    }

    #[test]
    fn advance_until_respects_limit() {
        let mut s = VirtualScheduler::new();
        let h = s.schedule(Duration::from_millis(100));
        assert_eq!(s.advance_until(Duration::from_millis(50)), None);
        assert_eq!(s.now(), Duration::from_millis(50));
        assert_eq!(s.advance_until(Duration::from_millis(100)), Some(h));
    }

    #[test]
    fn clock_timers_chain_off_the_previous_deadline() {
        let mut s = ClockScheduler::new();
        let t0 = Instant::now();
        let first = s.schedule_from(t0, Duration::from_millis(100));
        assert_eq!(s.next_deadline(), Some(t0 + Duration::from_millis(100)));

        assert_eq!(s.take_due(t0 + Duration::from_millis(50)), None);
        // the loop noticed 12ms late
        let noticed = t0 + Duration::from_millis(112);
        assert_eq!(s.take_due(noticed), Some(first));

        s.schedule_from(noticed, Duration::from_millis(100));
        assert_eq!(s.next_deadline(), Some(t0 + Duration::from_millis(200)));
    }

    #[test]
    fn clock_cancel_resets_the_anchor() {
        let mut s = ClockScheduler::new();
        let t0 = Instant::now();
        let first = s.schedule_from(t0, Duration::from_millis(10));
        let fired_at = t0 + Duration::from_millis(20);
        assert_eq!(s.take_due(fired_at), Some(first));

        let second = s.schedule_from(fired_at, Duration::from_millis(10));
        s.cancel(second);
        assert_eq!(s.pending_count(), 0);

        let later = fired_at + Duration::from_millis(5);
        s.schedule_from(later, Duration::from_millis(10));
        assert_eq!(s.next_deadline(), Some(later + Duration::from_millis(10)));
    }

    #[test]
    fn short_stall_fires_one_tick_per_pass() {
        let step = Duration::from_millis(68);
        let mut s = ClockScheduler::new();
        let t0 = Instant::now();
        s.schedule_from(t0, step);

        // the loop wakes up 200ms late, the way main drains due timers
        let now = t0 + step + Duration::from_millis(200);
        let mut fired = 0;
        while s.take_due(now).is_some() {
            fired += 1;
            s.schedule_from(now, step);
        }
        assert_eq!(fired, 1);
        assert_eq!(s.next_deadline(), Some(now + step));
    }

    #[test]
    fn clock_gives_up_catching_up_after_a_stall() {
        let mut s = ClockScheduler::new();
        let t0 = Instant::now();
        let h = s.schedule_from(t0, Duration::from_millis(10));
        let stalled = t0 + Duration::from_secs(2);
        assert_eq!(s.take_due(stalled), Some(h));
        s.schedule_from(stalled, Duration::from_millis(10));
        assert_eq!(s.next_deadline(), Some(stalled + Duration::from_millis(10)));
    }
}
