// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Tower application: command handlers, analog inputs, clock and tick bookkeeping.

pub mod analog;
pub mod clock;
pub mod commands;
pub mod tick;

pub use analog::{AdcRead, AnalogInputs};
pub use clock::{Clock, SoftClock, Time};
pub use commands::{CommandError, Tower};
pub use tick::Ticker;
