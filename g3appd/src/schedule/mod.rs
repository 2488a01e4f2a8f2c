/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{trace, warn};
use tokio::time::Instant;

const MINUTE_MILLIS: u64 = 60 * 1000;

/// Extra minute added to each query range, to cover clock skew between us and
/// the controller and sub-minute scheduling jitter.
const LOOKBACK_MARGIN_MINUTES: u64 = 1;

/// Number of minutes to query back so that the elapsed gap since the last
/// cycle is fully covered.
pub fn lookback_minutes(elapsed: Duration) -> u64 {
    let millis = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
    millis.div_ceil(MINUTE_MILLIS) + LOOKBACK_MARGIN_MINUTES
}

/// Time to sleep before the next cycle. After an overrun we only sleep up to
/// the next interval boundary, so the schedule keeps its phase.
pub fn sleep_duration(taken: Duration, interval: Duration) -> Duration {
    if interval.is_zero() {
        return Duration::ZERO;
    }
    if taken > interval {
        let interval_nanos = interval.as_nanos();
        let rem = taken.as_nanos() % interval_nanos;
        let left = u64::try_from(interval_nanos - rem).unwrap_or(u64::MAX);
        Duration::from_nanos(left)
    } else {
        interval - taken
    }
}

pub struct PollCycle {
    started: Instant,
    lookback_minutes: u64,
}

impl PollCycle {
    #[inline]
    pub fn lookback_minutes(&self) -> u64 {
        self.lookback_minutes
    }

    #[inline]
    pub fn started(&self) -> Instant {
        self.started
    }
}

pub struct PollScheduler {
    interval: Duration,
    last_cycle_start: Option<Instant>,
}

impl PollScheduler {
    pub fn new(interval_minutes: u64) -> Self {
        let interval_minutes = interval_minutes.max(1);
        PollScheduler {
            interval: Duration::from_millis(interval_minutes.saturating_mul(MINUTE_MILLIS)),
            last_cycle_start: None,
        }
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Compute the query range of the cycle starting now, and mark now as the
    /// start of the last cycle.
    pub fn begin_cycle(&mut self, now: Instant) -> PollCycle {
        let elapsed = match self.last_cycle_start.replace(now) {
            Some(last) => now.saturating_duration_since(last),
            None => self.interval,
        };
        let lookback_minutes = lookback_minutes(elapsed);
        let start_time: DateTime<Utc> = Utc::now();
        trace!(
            "starting at {} and querying for range {lookback_minutes}",
            start_time.format("%Y.%m.%d %H:%M:%S %Z")
        );
        PollCycle {
            started: now,
            lookback_minutes,
        }
    }

    /// Get the sleep time before the next cycle.
    pub fn finish_cycle(&self, cycle: &PollCycle, now: Instant) -> Duration {
        let taken = now.saturating_duration_since(cycle.started);
        if taken > self.interval {
            warn!(
                "took {}ms to process which is more than {}ms interval",
                taken.as_millis(),
                self.interval.as_millis()
            );
        }
        let sleep = sleep_duration(taken, self.interval);
        trace!(
            "took {}ms, sleeping for {}ms",
            taken.as_millis(),
            sleep.as_millis()
        );
        sleep
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookback() {
        assert_eq!(lookback_minutes(Duration::from_secs(90)), 3);
        assert_eq!(lookback_minutes(Duration::from_secs(60)), 2);
        assert_eq!(lookback_minutes(Duration::from_millis(60_001)), 3);
        assert_eq!(lookback_minutes(Duration::ZERO), 1);
        assert_eq!(lookback_minutes(Duration::from_millis(1)), 2);
    }

    #[test]
    fn overrun() {
        let interval = Duration::from_secs(60);
        assert_eq!(
            sleep_duration(Duration::from_secs(70), interval),
            Duration::from_secs(50)
        );
        assert_eq!(
            sleep_duration(Duration::from_secs(150), interval),
            Duration::from_secs(30)
        );
        assert_eq!(
            sleep_duration(Duration::from_secs(120), interval),
            Duration::from_secs(60)
        );
    }

    #[test]
    fn in_time() {
        let interval = Duration::from_secs(120);
        assert_eq!(
            sleep_duration(Duration::from_secs(20), interval),
            Duration::from_secs(100)
        );
        assert_eq!(sleep_duration(interval, interval), Duration::ZERO);
        assert_eq!(sleep_duration(Duration::ZERO, interval), interval);
    }

    #[test]
    fn cycles() {
        let mut scheduler = PollScheduler::new(1);
        assert_eq!(scheduler.interval(), Duration::from_secs(60));

        let t0 = Instant::now();
        let cycle = scheduler.begin_cycle(t0);
        // the first cycle covers exactly one interval
        assert_eq!(cycle.lookback_minutes(), 2);
        let sleep = scheduler.finish_cycle(&cycle, t0 + Duration::from_secs(70));
        assert_eq!(sleep, Duration::from_secs(50));

        let t1 = t0 + Duration::from_secs(90);
        let cycle = scheduler.begin_cycle(t1);
        assert_eq!(cycle.lookback_minutes(), 3);
        assert_eq!(cycle.started(), t1);
        let sleep = scheduler.finish_cycle(&cycle, t1 + Duration::from_secs(5));
        assert_eq!(sleep, Duration::from_secs(55));
    }

    #[test]
    fn min_interval() {
        let scheduler = PollScheduler::new(0);
        assert_eq!(scheduler.interval(), Duration::from_secs(60));
        let scheduler = PollScheduler::new(5);
        assert_eq!(scheduler.interval(), Duration::from_secs(300));
    }
}
