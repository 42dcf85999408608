// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! ADC1 support for the analog inputs, using direct PAC register access.
//!
//! Blocking single conversions, one per tower channel. Tower channel `n` is read from ADC1 input
//! `inputs[n]`.
//!
//! Example:
//! ```no_run
//! let mut adc = Adc1::new(dp.ADC1, [14, 15]);
//! let value = adc.read_channel(0);
//! ```

use stm32f7xx_hal::pac;

use crate::config::ANALOG_CHANNELS;
use crate::tower::AdcRead;

/// Longest sample time, 480 cycles.
const SMP_480: u32 = 0b111;

pub struct Adc1 {
    adc: pac::ADC1,
    inputs: [u8; ANALOG_CHANNELS],
}

impl Adc1 {
    /// Power up ADC1: 12-bit, right-aligned, software trigger, PCLK2 / 4.
    pub fn new(adc: pac::ADC1, inputs: [u8; ANALOG_CHANNELS]) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb2enr.modify(|_, w| w.adc1en().set_bit());

        let common = unsafe { &*pac::ADC_COMMON::ptr() };
        common.ccr.modify(|_, w| w.adcpre().div4());

        adc.cr2.modify(|_, w| w.adon().clear_bit());
        adc.cr1.modify(|_, w| w.res().bits(0b00));
        adc.cr2.modify(|_, w| {
            w.cont().clear_bit();
            w.align().right();
            w.exten().disabled();
            w
        });

        // Long sample time on every input we read, for stability.
        for &input in &inputs {
            set_sample_time(&adc, input);
        }

        // Sequence length = 1 conversion
        adc.sqr1.modify(|_, w| w.l().bits(0));
        adc.cr2.modify(|_, w| w.adon().set_bit());

        Self { adc, inputs }
    }

    /// Convert one ADC1 input.
    pub fn convert(&mut self, input: u8) -> u16 {
        self.adc
            .sqr3
            .modify(|_, w| unsafe { w.sq1().bits(input & 0x1F) });
        self.adc.cr2.modify(|_, w| w.swstart().set_bit());
        while self.adc.sr.read().eoc().bit_is_clear() {}
        self.adc.dr.read().data().bits() as u16
    }
}

fn set_sample_time(adc: &pac::adc1::RegisterBlock, input: u8) {
    let input = input as u32;
    match input {
        0..=9 => adc.smpr2.modify(|r, w| unsafe {
            let shift = input * 3;
            w.bits((r.bits() & !(0b111 << shift)) | (SMP_480 << shift))
        }),
        10..=18 => adc.smpr1.modify(|r, w| unsafe {
            let shift = (input - 10) * 3;
            w.bits((r.bits() & !(0b111 << shift)) | (SMP_480 << shift))
        }),
        _ => {}
    }
}

impl AdcRead for Adc1 {
    fn read_channel(&mut self, ch: u8) -> u16 {
        match self.inputs.get(ch as usize) {
            Some(&input) => self.convert(input),
            None => 0,
        }
    }
}
