// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Compile-time configuration for the tower firmware.

/// Serial link baud rate.
pub const BAUD_RATE: u32 = 115_200;

/// Receive queue capacity in bytes.
pub const RX_QUEUE_SIZE: usize = 256;

/// Transmit queue capacity in bytes. Must hold the full startup burst (5 packets).
pub const TX_QUEUE_SIZE: usize = 256;

/// Size of the non-volatile data block. All NV variables live in this one block.
pub const NV_BLOCK_SIZE: usize = 8;

/// Periodic tick rate. Analog inputs are sampled on every tick.
pub const TICK_HZ: u32 = 100;

/// Number of sampled analog channels.
pub const ANALOG_CHANNELS: usize = 2;

/// How long the activity LED stays lit after a packet, in ticks.
pub const ACTIVITY_TICKS: u32 = TICK_HZ;

/// Firmware version reported by the version command.
pub const VERSION_MAJOR: u8 = 1;
pub const VERSION_MINOR: u8 = 0;

/// Tower number seeded into a blank NV block.
pub const DEFAULT_TOWER_NUMBER: u16 = 0x09C7;

/// Tower mode seeded into a blank NV block.
pub const DEFAULT_TOWER_MODE: u16 = 0x0001;

/// Report every analog sample (`true`) or only changed ones (`false`) after reset.
pub const DEFAULT_SYNCHRONOUS: bool = false;
