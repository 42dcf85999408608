// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

pub mod framer;
pub mod messages;

pub use framer::Framer;
pub use messages::{Command, Packet};
