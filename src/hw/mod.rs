// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! STM32F777 peripherals behind the tower's hardware traits.

pub mod adc;
pub mod flash;
pub mod led;
pub mod pins;
pub mod systick;
pub mod usart;

pub use adc::Adc1;
pub use flash::FlashBlock;
pub use led::{Led, StatusLeds};
pub use pins::BoardPins;
pub use usart::Usart1;
