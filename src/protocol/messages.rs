// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Packet layout and command codes for the tower serial protocol.
//!
//! Every packet is five bytes on the wire:
//!
//! ```text
//! [command][parameter1][parameter2][parameter3][checksum]
//! ```
//!
//! where `checksum` is the XOR of the four preceding bytes. Bit 7 of the command byte is the
//! acknowledgement flag and is not part of the command identity.

/// Bytes per packet on the wire, checksum included.
pub const PACKET_SIZE: usize = 5;

/// Command-byte bit that requests (host → tower) or grants (tower → host) an acknowledgement.
pub const ACK_MASK: u8 = 0x80;

// Command codes
pub const CMD_STARTUP: u8 = 0x04;
pub const CMD_PROGRAM_BYTE: u8 = 0x07;
pub const CMD_READ_BYTE: u8 = 0x08;
pub const CMD_VERSION: u8 = 0x09;
pub const CMD_PROTOCOL_MODE: u8 = 0x0A;
pub const CMD_TOWER_NUMBER: u8 = 0x0B;
pub const CMD_TIME: u8 = 0x0C;
pub const CMD_TOWER_MODE: u8 = 0x0D;
pub const CMD_ANALOG_INPUT: u8 = 0x50;

/// `parameter1` of a get/set command: read the current value.
pub const PARAM_GET: u8 = 1;
/// `parameter1` of a get/set command: store `parameter2`/`parameter3`.
pub const PARAM_SET: u8 = 2;

/// Commands recognised by the tower.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    StartupValues,
    ProgramByte,
    ReadByte,
    Version,
    ProtocolMode,
    TowerNumber,
    Time,
    TowerMode,
    AnalogInput,
}

impl Command {
    /// Look up a command by its code. The acknowledgement bit must already be masked off.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            CMD_STARTUP => Some(Command::StartupValues),
            CMD_PROGRAM_BYTE => Some(Command::ProgramByte),
            CMD_READ_BYTE => Some(Command::ReadByte),
            CMD_VERSION => Some(Command::Version),
            CMD_PROTOCOL_MODE => Some(Command::ProtocolMode),
            CMD_TOWER_NUMBER => Some(Command::TowerNumber),
            CMD_TIME => Some(Command::Time),
            CMD_TOWER_MODE => Some(Command::TowerMode),
            CMD_ANALOG_INPUT => Some(Command::AnalogInput),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Command::StartupValues => CMD_STARTUP,
            Command::ProgramByte => CMD_PROGRAM_BYTE,
            Command::ReadByte => CMD_READ_BYTE,
            Command::Version => CMD_VERSION,
            Command::ProtocolMode => CMD_PROTOCOL_MODE,
            Command::TowerNumber => CMD_TOWER_NUMBER,
            Command::Time => CMD_TIME,
            Command::TowerMode => CMD_TOWER_MODE,
            Command::AnalogInput => CMD_ANALOG_INPUT,
        }
    }
}

/// The four data fields of a packet. The checksum is derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Packet {
    pub command: u8,
    pub parameter1: u8,
    pub parameter2: u8,
    pub parameter3: u8,
}

impl Packet {
    pub const fn new(command: u8, parameter1: u8, parameter2: u8, parameter3: u8) -> Self {
        Self {
            command,
            parameter1,
            parameter2,
            parameter3,
        }
    }

    /// XOR of the four data fields.
    #[inline]
    pub fn checksum(&self) -> u8 {
        self.command ^ self.parameter1 ^ self.parameter2 ^ self.parameter3
    }

    /// Wire representation, checksum last.
    pub fn to_bytes(&self) -> [u8; PACKET_SIZE] {
        [
            self.command,
            self.parameter1,
            self.parameter2,
            self.parameter3,
            self.checksum(),
        ]
    }

    /// Command code with the acknowledgement bit masked off.
    #[inline]
    pub fn code(&self) -> u8 {
        self.command & !ACK_MASK
    }

    #[inline]
    pub fn ack_requested(&self) -> bool {
        self.command & ACK_MASK != 0
    }

    pub fn kind(&self) -> Option<Command> {
        Command::from_code(self.code())
    }

    /// `parameter2` (low) and `parameter3` (high) as a little-endian 16-bit value.
    #[inline]
    pub fn word(&self) -> u16 {
        u16::from_le_bytes([self.parameter2, self.parameter3])
    }

    /// Reply to this packet for the acknowledgement convention: same parameters, acknowledgement
    /// bit set on success and cleared on failure.
    pub fn ack(&self, success: bool) -> Self {
        let command = if success {
            self.command | ACK_MASK
        } else {
            self.command & !ACK_MASK
        };
        Self { command, ..*self }
    }
}

/// Build the wire bytes for a packet.
#[inline]
pub fn encode(command: u8, parameter1: u8, parameter2: u8, parameter3: u8) -> [u8; PACKET_SIZE] {
    Packet::new(command, parameter1, parameter2, parameter3).to_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_is_xor_of_fields() {
        let bytes = encode(0x0B, 0x01, 0xC7, 0x09);
        assert_eq!(bytes, [0x0B, 0x01, 0xC7, 0x09, 0xC4]);
    }

    #[test]
    fn ack_bit_is_not_part_of_identity() {
        let p = Packet::new(CMD_VERSION | ACK_MASK, 0, 0, 0);
        assert!(p.ack_requested());
        assert_eq!(p.code(), CMD_VERSION);
        assert_eq!(p.kind(), Some(Command::Version));
    }

    #[test]
    fn ack_reply_echoes_parameters() {
        let p = Packet::new(CMD_TOWER_MODE | ACK_MASK, 2, 0x34, 0x12);
        assert_eq!(p.ack(true), Packet::new(0x8D, 2, 0x34, 0x12));
        assert_eq!(p.ack(false), Packet::new(0x0D, 2, 0x34, 0x12));
    }

    #[test]
    fn word_is_little_endian() {
        let p = Packet::new(CMD_TOWER_NUMBER, PARAM_SET, 0xC7, 0x09);
        assert_eq!(p.word(), 0x09C7);
    }

    #[test]
    fn codes_round_trip() {
        for code in 0..=0x7F {
            if let Some(cmd) = Command::from_code(code) {
                assert_eq!(cmd.code(), code);
            }
        }
        assert_eq!(Command::from_code(0x01), None);
    }
}
