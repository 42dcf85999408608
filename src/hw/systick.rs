// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! SysTick as the periodic tick source.

use cortex_m::peripheral::{syst::SystClkSource, SYST};

/// Start SysTick interrupting at `hz`, clocked from the core clock.
pub fn start(mut syst: SYST, sysclk_hz: u32, hz: u32) -> SYST {
    syst.set_clock_source(SystClkSource::Core);
    syst.set_reload(sysclk_hz / hz - 1);
    syst.clear_current();
    syst.enable_interrupt();
    syst.enable_counter();
    syst
}
