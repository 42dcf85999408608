// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Time of day.
//!
//! [`Clock`] is what the command handlers need from a real-time clock. [`SoftClock`] implements it
//! with a seconds-of-day counter advanced once per second from the tick interrupt.

use core::sync::atomic::{AtomicU32, Ordering};

const SECONDS_PER_DAY: u32 = 24 * 60 * 60;

/// Hours, minutes and seconds of a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Time {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

impl Time {
    /// `None` unless `hours <= 23`, `minutes <= 59` and `seconds <= 59`.
    pub fn new(hours: u8, minutes: u8, seconds: u8) -> Option<Self> {
        if hours > 23 || minutes > 59 || seconds > 59 {
            return None;
        }
        Some(Self {
            hours,
            minutes,
            seconds,
        })
    }

    /// Time of day `secs` seconds after midnight, wrapping at 24 h.
    pub fn from_seconds(secs: u32) -> Self {
        let secs = secs % SECONDS_PER_DAY;
        Self {
            hours: (secs / 3600) as u8,
            minutes: (secs / 60 % 60) as u8,
            seconds: (secs % 60) as u8,
        }
    }

    pub fn as_seconds(&self) -> u32 {
        self.hours as u32 * 3600 + self.minutes as u32 * 60 + self.seconds as u32
    }
}

pub trait Clock {
    fn get(&self) -> Time;
    fn set(&mut self, time: Time);
}

/// Seconds-of-day counter shared between the tick interrupt and the main loop.
pub struct SoftClock {
    seconds: AtomicU32,
}

impl SoftClock {
    pub const fn new() -> Self {
        Self {
            seconds: AtomicU32::new(0),
        }
    }

    /// Advance one second, wrapping at midnight.
    pub fn tick(&self) {
        let _ = self
            .seconds
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |s| {
                Some((s + 1) % SECONDS_PER_DAY)
            });
    }

    pub fn now(&self) -> Time {
        Time::from_seconds(self.seconds.load(Ordering::Relaxed))
    }

    pub fn set_time(&self, time: Time) {
        self.seconds.store(time.as_seconds(), Ordering::Relaxed);
    }
}

impl Default for SoftClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for &SoftClock {
    fn get(&self) -> Time {
        self.now()
    }

    fn set(&mut self, time: Time) {
        self.set_time(time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_fields() {
        assert!(Time::new(23, 59, 59).is_some());
        assert!(Time::new(24, 0, 0).is_none());
        assert!(Time::new(0, 60, 0).is_none());
        assert!(Time::new(0, 0, 60).is_none());
    }

    #[test]
    fn seconds_conversion() {
        let t = Time::new(13, 5, 42).unwrap();
        assert_eq!(Time::from_seconds(t.as_seconds()), t);
        assert_eq!(Time::from_seconds(SECONDS_PER_DAY + 61), Time::new(0, 1, 1).unwrap());
    }

    #[test]
    fn soft_clock_wraps_at_midnight() {
        let clock = SoftClock::new();
        clock.set_time(Time::new(23, 59, 58).unwrap());
        clock.tick();
        assert_eq!(clock.now(), Time::new(23, 59, 59).unwrap());
        clock.tick();
        assert_eq!(clock.now(), Time::new(0, 0, 0).unwrap());
    }

    #[test]
    fn shared_reference_is_a_clock() {
        let soft = SoftClock::new();
        let mut clock = &soft;
        clock.set(Time::new(1, 2, 3).unwrap());
        assert_eq!(soft.now(), Time::new(1, 2, 3).unwrap());
        assert_eq!(clock.get(), Time::new(1, 2, 3).unwrap());
    }
}
