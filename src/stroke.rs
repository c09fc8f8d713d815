//! Fixed-cadence driver for held interactions.
//!
//! A subsystem (terrain stroke, edge pan) owns one `IntervalDriver` inside its
//! own resource; nothing else ticks it, so stopping on the exit transition is
//! enough to guarantee no orphaned firings survive a state change.

use std::time::Duration;

use bevy::prelude::*;

pub struct IntervalDriver {
    timer: Timer,
    active: bool,
}

impl IntervalDriver {
    pub fn new(period: Duration) -> Self {
        Self {
            timer: Timer::new(period, TimerMode::Repeating),
            active: false,
        }
    }

    /// Arm the driver. Any elapsed time from a previous run is discarded, so
    /// re-starting is also how a new stroke cancels the pending interval of
    /// the one before it.
    pub fn start(&mut self) {
        self.timer.reset();
        self.active = true;
    }

    pub fn stop(&mut self) {
        self.active = false;
        self.timer.reset();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Advance the driver; returns how many firings elapsed. Always 0 while
    /// stopped.
    pub fn tick(&mut self, delta: Duration) -> u32 {
        if !self.active {
            return 0;
        }
        self.timer.tick(delta);
        self.timer.times_finished_this_tick()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIOD: Duration = Duration::from_millis(100);

    #[test]
    fn never_fires_while_stopped() {
        let mut driver = IntervalDriver::new(PERIOD);
        assert_eq!(driver.tick(Duration::from_secs(5)), 0);
        assert!(!driver.is_active());
    }

    #[test]
    fn fires_once_per_period_while_active() {
        let mut driver = IntervalDriver::new(PERIOD);
        driver.start();
        assert_eq!(driver.tick(Duration::from_millis(50)), 0);
        assert_eq!(driver.tick(Duration::from_millis(50)), 1);
        assert_eq!(driver.tick(Duration::from_millis(250)), 2);
    }

    #[test]
    fn stop_cancels_deterministically() {
        let mut driver = IntervalDriver::new(PERIOD);
        driver.start();
        driver.tick(Duration::from_millis(90));
        driver.stop();
        // The nearly-elapsed interval must not fire later.
        assert_eq!(driver.tick(Duration::from_millis(20)), 0);
    }

    #[test]
    fn restart_discards_accumulated_time() {
        let mut driver = IntervalDriver::new(PERIOD);
        driver.start();
        driver.tick(Duration::from_millis(90));
        driver.start();
        assert_eq!(driver.tick(Duration::from_millis(60)), 0);
        assert_eq!(driver.tick(Duration::from_millis(40)), 1);
    }
}
