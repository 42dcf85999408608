// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Periodic tick bookkeeping.
//!
//! The tick interrupt only sets flags and advances the [`SoftClock`]; sampling and reporting run in
//! the main loop, which consumes the flags with the `take_*` methods.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::tower::clock::SoftClock;

pub struct Ticker {
    ticks_per_second: u32,
    ticks: AtomicU32,
    sample_due: AtomicBool,
    second_due: AtomicBool,
}

impl Ticker {
    pub const fn new(ticks_per_second: u32) -> Self {
        Self {
            ticks_per_second,
            ticks: AtomicU32::new(0),
            sample_due: AtomicBool::new(false),
            second_due: AtomicBool::new(false),
        }
    }

    /// Tick interrupt body.
    pub fn on_tick(&self, clock: &SoftClock) {
        let n = self.ticks.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        self.sample_due.store(true, Ordering::Release);
        if self.ticks_per_second != 0 && n % self.ticks_per_second == 0 {
            clock.tick();
            self.second_due.store(true, Ordering::Release);
        }
    }

    /// An analog sample is due. Clears the flag.
    pub fn take_sample(&self) -> bool {
        self.sample_due.swap(false, Ordering::Acquire)
    }

    /// A second has elapsed. Clears the flag.
    pub fn take_second(&self) -> bool {
        self.second_due.swap(false, Ordering::Acquire)
    }

    /// Ticks since reset.
    #[inline]
    pub fn now(&self) -> u32 {
        self.ticks.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tower::clock::Time;

    #[test]
    fn flags_are_consumed_once() {
        let ticker = Ticker::new(4);
        let clock = SoftClock::new();

        ticker.on_tick(&clock);
        assert!(ticker.take_sample());
        assert!(!ticker.take_sample());
        assert!(!ticker.take_second());
    }

    #[test]
    fn second_elapses_every_n_ticks() {
        let ticker = Ticker::new(4);
        let clock = SoftClock::new();

        for _ in 0..3 {
            ticker.on_tick(&clock);
        }
        assert!(!ticker.take_second());
        ticker.on_tick(&clock);
        assert!(ticker.take_second());
        assert_eq!(clock.now(), Time::new(0, 0, 1).unwrap());

        for _ in 0..8 {
            ticker.on_tick(&clock);
        }
        assert_eq!(clock.now(), Time::new(0, 0, 3).unwrap());
        assert_eq!(ticker.now(), 12);
    }
}
