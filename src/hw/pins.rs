// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pin definitions for the tower board (STM32F777).

use stm32f7xx_hal::{
    gpio::{gpioa, gpioc, gpiod, Alternate, Analog, Output, PushPull},
    pac,
    prelude::*,
};

/// All board pins. Construct this once at startup using:
///
/// ```rust
/// let pins = BoardPins::new(dp.GPIOA, dp.GPIOC, dp.GPIOD);
/// ```
pub struct BoardPins {
    pub leds: LedPins,
    pub usart1: Usart1Pins,
    pub analog: AnalogPins,
}

pub struct LedPins {
    pub red: gpiod::PD8<Output<PushPull>>,
    pub yellow: gpiod::PD9<Output<PushPull>>,
    pub green: gpiod::PD10<Output<PushPull>>,
}

/// Protocol link
pub struct Usart1Pins {
    pub tx: gpioa::PA9<Alternate<7>>,
    pub rx: gpioa::PA10<Alternate<7>>,
}

/// Analog inputs, tower channels 0 and 1
pub struct AnalogPins {
    pub ain0: gpioc::PC4<Analog>, // ADC1_IN14
    pub ain1: gpioc::PC5<Analog>, // ADC1_IN15
}

impl AnalogPins {
    /// ADC1 input number of each tower channel.
    pub const ADC1_INPUTS: [u8; 2] = [14, 15];
}

impl BoardPins {
    /// Create all named pins from raw GPIO peripherals.
    pub fn new(gpioa: pac::GPIOA, gpioc: pac::GPIOC, gpiod: pac::GPIOD) -> Self {
        let gpioa = gpioa.split();
        let gpioc = gpioc.split();
        let gpiod = gpiod.split();

        Self {
            leds: LedPins {
                red: gpiod.pd8.into_push_pull_output(),
                yellow: gpiod.pd9.into_push_pull_output(),
                green: gpiod.pd10.into_push_pull_output(),
            },

            usart1: Usart1Pins {
                tx: gpioa.pa9.into_alternate::<7>(),
                rx: gpioa.pa10.into_alternate::<7>(),
            },

            analog: AnalogPins {
                ain0: gpioc.pc4.into_analog(),
                ain1: gpioc.pc5.into_analog(),
            },
        }
    }
}
