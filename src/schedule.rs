// StrideWatch: Tick Scheduling
//
// The control loop suspends exactly once per tick, after all work is done,
// for whatever is left of the poll interval. Slower jobs (MQTT publish) ride
// on `Periodic` checks inside the tick.

use std::time::{Duration, Instant};

/// Millisecond time source.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// `Instant`-based clock, measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Fixed-rate tick pacing.
#[derive(Debug, Clone, Copy)]
pub struct Cadence {
    interval_ms: u64,
    tick_start_ms: u64,
}

impl Cadence {
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms: u64::from(interval_ms),
            tick_start_ms: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn begin_tick(&mut self, now_ms: u64) {
        self.tick_start_ms = now_ms;
    }

    /// Sleep needed to keep the cadence; zero if this tick overran.
    pub fn remaining(&self, now_ms: u64) -> Duration {
        let elapsed = now_ms.saturating_sub(self.tick_start_ms);
        Duration::from_millis(self.interval_ms.saturating_sub(elapsed))
    }
}

/// Coarser job that fires at most once per period.
#[derive(Debug, Clone, Copy)]
pub struct Periodic {
    period_ms: u64,
    last_ms: Option<u64>,
}

impl Periodic {
    pub fn new(period_ms: u32) -> Self {
        Self {
            period_ms: u64::from(period_ms),
            last_ms: None,
        }
    }

    /// True on the first call, then once each time a full period has passed.
    /// A late check fires once and restarts the period from `now_ms`.
    pub fn due(&mut self, now_ms: u64) -> bool {
        let due = match self.last_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.period_ms,
        };
        if due {
            self.last_ms = Some(now_ms);
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cadence_sleeps_for_the_remainder() {
        let mut c = Cadence::new(300);
        c.begin_tick(1_000);
        assert_eq!(c.remaining(1_040), Duration::from_millis(260));
    }

    #[test]
    fn cadence_overrun_does_not_sleep() {
        let mut c = Cadence::new(300);
        c.begin_tick(1_000);
        assert_eq!(c.remaining(1_450), Duration::ZERO);
    }

    #[test]
    fn periodic_fires_immediately_then_per_period() {
        let mut p = Periodic::new(5_000);
        assert!(p.due(0));
        assert!(!p.due(300));
        assert!(!p.due(4_999));
        assert!(p.due(5_000));
        assert!(!p.due(5_300));
    }

    #[test]
    fn periodic_does_not_burst_after_a_stall() {
        let mut p = Periodic::new(5_000);
        assert!(p.due(0));
        assert!(p.due(17_000));
        assert!(!p.due(17_300));
        assert!(p.due(22_000));
    }

    #[test]
    fn monotonic_clock_does_not_go_backwards() {
        let clock = MonotonicClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }
}
