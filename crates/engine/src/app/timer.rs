use std::time::Duration;

use tracing::warn;

const MIN_TIMER_INTERVAL: Duration = Duration::from_millis(1);

/// Caller-chosen label delivered back with each firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerTag(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

#[derive(Debug, Clone)]
struct RepeatingTimer {
    id: TimerId,
    tag: TimerTag,
    interval: Duration,
    next_due: Duration,
}

/// Repeating timers on a simulated clock. Timers never expire; a timer
/// registered at time `t` first fires at `t + interval`.
#[derive(Debug, Default)]
pub struct TimerQueue {
    timers: Vec<RepeatingTimer>,
    elapsed: Duration,
    next_id: u64,
}

impl TimerQueue {
    pub fn add_repeating(&mut self, interval: Duration, tag: TimerTag) -> TimerId {
        let interval = if interval < MIN_TIMER_INTERVAL {
            warn!(
                interval_ms = interval.as_millis() as u64,
                tag = tag.0,
                "timer_interval_below_minimum_clamped"
            );
            MIN_TIMER_INTERVAL
        } else {
            interval
        };
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.timers.push(RepeatingTimer {
            id,
            tag,
            interval,
            next_due: self.elapsed.saturating_add(interval),
        });
        id
    }

    /// Advances the clock and returns every firing that became due, ordered
    /// by due time (ties broken by registration order).
    pub fn advance(&mut self, dt: Duration) -> Vec<TimerTag> {
        self.elapsed = self.elapsed.saturating_add(dt);
        let mut fired: Vec<(Duration, TimerId, TimerTag)> = Vec::new();
        for timer in &mut self.timers {
            while timer.next_due <= self.elapsed {
                fired.push((timer.next_due, timer.id, timer.tag));
                timer.next_due = timer.next_due.saturating_add(timer.interval);
            }
        }
        fired.sort_by_key(|(due, id, _)| (*due, *id));
        fired.into_iter().map(|(_, _, tag)| tag).collect()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
        self.elapsed = Duration::ZERO;
    }
}
