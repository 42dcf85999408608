// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Status LEDs.

use stm32f7xx_hal::{
    gpio::{self, Output, PinState, PushPull},
    prelude::*,
};

use crate::hw::pins::LedPins;

/// Whether the LED is driven active-high or active-low on the board wiring.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ActiveLevel {
    High,
    Low,
}

/// LED on any GPIO pin that remembers its active level and last known state.
pub struct Led<const P: char, const N: u8> {
    pin: gpio::Pin<P, N, Output<PushPull>>,
    active: ActiveLevel,
    is_on: bool,
}

impl<const P: char, const N: u8> Led<P, N> {
    /// Create an LED wrapper, initializing it to OFF.
    pub fn new<MODE>(pin: gpio::Pin<P, N, MODE>, active: ActiveLevel) -> Self {
        let mut led = Self {
            pin: pin.into_push_pull_output(),
            active,
            is_on: true,
        };
        led.off();
        led
    }

    pub fn active_low<MODE>(pin: gpio::Pin<P, N, MODE>) -> Self {
        Self::new(pin, ActiveLevel::Low)
    }

    /// Drive the LED logically ON (true) or OFF (false).
    pub fn set(&mut self, on: bool) {
        let state = match (self.active, on) {
            (ActiveLevel::High, true) | (ActiveLevel::Low, false) => PinState::High,
            (ActiveLevel::High, false) | (ActiveLevel::Low, true) => PinState::Low,
        };
        self.pin.set_state(state);
        self.is_on = on;
    }

    #[inline]
    pub fn on(&mut self) {
        self.set(true);
    }

    #[inline]
    pub fn off(&mut self) {
        self.set(false);
    }

    pub fn toggle(&mut self) {
        self.set(!self.is_on);
    }

}

/// The three board LEDs by role.
pub struct StatusLeds {
    /// Red: startup failed.
    pub error: Led<'D', 8>,
    /// Yellow: lit for a while after each received packet.
    pub activity: Led<'D', 9>,
    /// Green: toggled once a second.
    pub heartbeat: Led<'D', 10>,
    activity_until: Option<u32>,
}

impl StatusLeds {
    pub fn new(pins: LedPins) -> Self {
        Self {
            error: Led::active_low(pins.red),
            activity: Led::active_low(pins.yellow),
            heartbeat: Led::active_low(pins.green),
            activity_until: None,
        }
    }

    /// Light the activity LED until tick `now + ticks`.
    pub fn flash_activity(&mut self, now: u32, ticks: u32) {
        self.activity.on();
        self.activity_until = Some(now.wrapping_add(ticks));
    }

    /// Turn the activity LED off once its time is up.
    pub fn update(&mut self, now: u32) {
        if let Some(until) = self.activity_until {
            if now.wrapping_sub(until) as i32 >= 0 {
                self.activity.off();
                self.activity_until = None;
            }
        }
    }
}
