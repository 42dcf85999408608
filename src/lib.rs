// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Tower Firmware
//!
//! This crate contains the firmware for the tower board: a serial command-and-control node that
//! receives checksummed 5-byte packets from a host, answers them from non-volatile storage, a
//! real-time clock and the analog inputs, and streams periodic reports back over the same link.
//! It targets an STM32F777 MCU, but everything outside [`hw`] is hardware-independent and tested
//! on the host.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`queue`] | Fixed-capacity circular byte queue |
//! | [`transport`] | Interrupt-safe receive/transmit queues behind byte source/sink traits |
//! | [`protocol`] | Packet layout, command codes and the resynchronizing framer |
//! | [`nvm`] | Variable allocation and erase-modify-write over a single flash block |
//! | [`dispatch`] | Command dispatch and the acknowledgement-bit convention |
//! | [`tower`] | Command handlers, clock, analog reporting and tick bookkeeping |
//! | `hw` | MCU-level wrappers around USART, flash, ADC, SysTick and LEDs (board builds only) |
//!
//! ## Getting Started
//!
//! Run the host tests:
//!
//! ```bash
//! cargo test
//! ```
//!
//! Flash the board:
//!
//! ```bash
//! cargo run --release --target thumbv7em-none-eabihf
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(test), no_std)]

#[macro_use]
pub mod log;

pub mod config;
pub mod dispatch;
pub mod nvm;
pub mod protocol;
pub mod queue;
pub mod tower;
pub mod transport;

#[cfg(target_os = "none")]
pub mod hw;
