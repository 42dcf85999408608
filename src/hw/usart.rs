// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! USART1 as the protocol link.
//!
//! The HAL `Serial` driver does the pin, clock and baud-rate setup once at startup. After that
//! the link is interrupt-driven. [`Usart1`] is the register-level view the USART1 interrupt
//! hands to [`SerialQueues::service`](crate::transport::SerialQueues::service), and
//! [`Usart1::arm_tx`] is what the main loop calls after enqueueing bytes.
//!
//! The link is 8N1 at [`BAUD_RATE`](crate::config::BAUD_RATE) with no flow control.

use stm32f7xx_hal::{
    pac::{self, usart1},
    prelude::*,
    rcc::Clocks,
    serial::{Config, Pins, Serial},
};

use crate::config;
use crate::transport::SerialDevice;

/// Register access to USART1.
///
/// Holds no state; every method goes straight to the peripheral, so an instance can be created in
/// the interrupt handler and in the main loop at the same time.
pub struct Usart1 {
    _private: (),
}

impl Usart1 {
    /// Configure USART1 for the protocol link and enable the receive interrupt.
    ///
    /// Returns the HAL driver so the caller keeps ownership of the pins.
    pub fn init<PINS: Pins<pac::USART1>>(
        usart: pac::USART1,
        pins: PINS,
        clocks: &Clocks,
    ) -> Serial<pac::USART1, PINS> {
        let cfg = Config {
            baud_rate: config::BAUD_RATE.bps(),
            ..Default::default()
        };
        let serial = Serial::new(usart, pins, clocks, cfg);

        Self::regs().cr1.modify(|_, w| w.rxneie().set_bit());
        serial
    }

    /// Register handle for the interrupt handler. Call [`Usart1::init`] first.
    #[inline]
    pub fn steal() -> Self {
        Self { _private: () }
    }

    /// Re-enable the transmit interrupt so queued bytes start draining.
    ///
    /// CR1 is also modified from the interrupt, so the read-modify-write runs with interrupts
    /// masked.
    pub fn arm_tx() {
        critical_section::with(|_| Self::regs().cr1.modify(|_, w| w.txeie().set_bit()));
    }

    #[inline]
    fn regs() -> &'static usart1::RegisterBlock {
        unsafe { &*pac::USART1::ptr() }
    }
}

impl SerialDevice for Usart1 {
    fn read_received(&mut self) -> Option<u8> {
        let usart = Self::regs();
        let isr = usart.isr.read();

        // Overrun blocks further reception until cleared.
        if isr.ore().bit_is_set() {
            usart.icr.write(|w| w.orecf().set_bit());
        }
        if isr.rxne().bit_is_set() {
            Some(usart.rdr.read().rdr().bits() as u8)
        } else {
            None
        }
    }

    fn tx_empty(&self) -> bool {
        Self::regs().isr.read().txe().bit_is_set()
    }

    fn write_data(&mut self, byte: u8) {
        Self::regs().tdr.write(|w| w.tdr().bits(byte as u16));
    }

    fn set_tx_interrupt(&mut self, enabled: bool) {
        Self::regs().cr1.modify(|_, w| w.txeie().bit(enabled));
    }
}
