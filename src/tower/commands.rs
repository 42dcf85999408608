// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Tower command handlers.
//!
//! [`Tower`] owns the non-volatile store, the clock and the analog state, and implements
//! [`Handler`] for every command in [`crate::protocol::messages`].
//!
//! Get/set commands (protocol mode, tower number, tower mode) share one parameter convention:
//! `parameter1` is [`PARAM_GET`] or [`PARAM_SET`], and a set carries its value in `parameter2`
//! (low byte) and `parameter3` (high byte). A get answers `(code, 1, lsb, msb)`.

use crate::config;
use crate::dispatch::Handler;
use crate::nvm::{NvBlock, NvError, NvStore, NvVar};
use crate::protocol::framer;
use crate::protocol::messages::*;
use crate::tower::analog::{AdcRead, AnalogInputs};
use crate::tower::clock::{Clock, Time};
use crate::transport::{ByteSink, TransportFull};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Reply could not be enqueued.
    Transport(TransportFull),
    /// Non-volatile storage rejected the request or failed.
    Nv(NvError),
    /// Command code not recognised. Carries the code without the acknowledgement bit.
    UnknownCommand(u8),
    InvalidParameter,
    InvalidTime,
}

impl From<TransportFull> for CommandError {
    fn from(e: TransportFull) -> Self {
        CommandError::Transport(e)
    }
}

impl From<NvError> for CommandError {
    fn from(e: NvError) -> Self {
        CommandError::Nv(e)
    }
}

/// Command handler state for one tower.
pub struct Tower<B, C, const N: usize> {
    nv: NvStore<B, N>,
    tower_number: NvVar<u16>,
    tower_mode: NvVar<u16>,
    clock: C,
    analog: AnalogInputs<{ config::ANALOG_CHANNELS }>,
    synchronous: bool,
}

impl<B: NvBlock<N>, C: Clock, const N: usize> Tower<B, C, N> {
    /// Allocate the tower number and tower mode variables and seed any that read back blank.
    pub fn new(mut nv: NvStore<B, N>, clock: C) -> Result<Self, CommandError> {
        let tower_number = nv.allocate_var::<u16>()?;
        let tower_mode = nv.allocate_var::<u16>()?;

        if nv.read_var(tower_number)? == u16::MAX {
            nv.write_var(tower_number, config::DEFAULT_TOWER_NUMBER)?;
        }
        if nv.read_var(tower_mode)? == u16::MAX {
            nv.write_var(tower_mode, config::DEFAULT_TOWER_MODE)?;
        }

        Ok(Self {
            nv,
            tower_number,
            tower_mode,
            clock,
            analog: AnalogInputs::new(),
            synchronous: config::DEFAULT_SYNCHRONOUS,
        })
    }

    /// Send startup, version, tower number, tower mode and protocol mode, in that order.
    pub fn send_startup_values<S: ByteSink>(&self, sink: &mut S) -> Result<(), CommandError> {
        framer::put(sink, CMD_STARTUP, 0, 0, 0)?;
        self.send_version(sink)?;
        self.send_word(sink, CMD_TOWER_NUMBER, self.tower_number)?;
        self.send_word(sink, CMD_TOWER_MODE, self.tower_mode)?;
        self.send_protocol_mode(sink)?;
        Ok(())
    }

    pub fn send_version<S: ByteSink>(&self, sink: &mut S) -> Result<(), CommandError> {
        framer::put(
            sink,
            CMD_VERSION,
            b'v',
            config::VERSION_MAJOR,
            config::VERSION_MINOR,
        )?;
        Ok(())
    }

    /// Send the current time as `(0x0C, hours, minutes, seconds)`.
    pub fn send_time<S: ByteSink>(&self, sink: &mut S) -> Result<(), TransportFull> {
        let t = self.clock.get();
        framer::put(sink, CMD_TIME, t.hours, t.minutes, t.seconds)
    }

    /// Sample every analog channel and report according to the protocol mode.
    pub fn sample_analog<A: AdcRead, S: ByteSink>(
        &mut self,
        adc: &mut A,
        sink: &mut S,
    ) -> Result<usize, TransportFull> {
        self.analog.sample(adc);
        self.analog.report(sink, self.synchronous)
    }

    #[inline]
    pub fn synchronous(&self) -> bool {
        self.synchronous
    }

    pub fn tower_number(&self) -> Result<u16, NvError> {
        self.nv.read_var(self.tower_number)
    }

    pub fn tower_mode(&self) -> Result<u16, NvError> {
        self.nv.read_var(self.tower_mode)
    }

    #[inline]
    pub fn nv(&self) -> &NvStore<B, N> {
        &self.nv
    }

    #[inline]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// `offset < N` programs one byte, `offset == N` erases the block.
    fn program_byte(&mut self, offset: u8, data: u8) -> Result<(), CommandError> {
        let offset = offset as usize;
        if offset == N {
            self.nv.erase_all()?;
        } else {
            self.nv.write(offset, 1, data as u32)?;
        }
        Ok(())
    }

    fn read_byte<S: ByteSink>(&self, sink: &mut S, offset: u8) -> Result<(), CommandError> {
        let data = self.nv.read(offset as usize, 1)? as u8;
        framer::put(sink, CMD_READ_BYTE, offset, 0, data)?;
        Ok(())
    }

    fn send_protocol_mode<S: ByteSink>(&self, sink: &mut S) -> Result<(), CommandError> {
        framer::put(sink, CMD_PROTOCOL_MODE, PARAM_GET, self.synchronous as u8, 0)?;
        Ok(())
    }

    fn protocol_mode<S: ByteSink>(
        &mut self,
        sink: &mut S,
        packet: &Packet,
    ) -> Result<(), CommandError> {
        match (packet.parameter1, packet.parameter2) {
            (PARAM_GET, _) => self.send_protocol_mode(sink),
            (PARAM_SET, 0) => {
                self.synchronous = false;
                Ok(())
            }
            (PARAM_SET, 1) => {
                self.synchronous = true;
                Ok(())
            }
            _ => Err(CommandError::InvalidParameter),
        }
    }

    fn send_word<S: ByteSink>(
        &self,
        sink: &mut S,
        code: u8,
        var: NvVar<u16>,
    ) -> Result<(), CommandError> {
        let [lsb, msb] = self.nv.read_var(var)?.to_le_bytes();
        framer::put(sink, code, PARAM_GET, lsb, msb)?;
        Ok(())
    }

    /// Shared body of the tower number and tower mode commands.
    fn get_set_word<S: ByteSink>(
        &mut self,
        sink: &mut S,
        packet: &Packet,
        var: NvVar<u16>,
    ) -> Result<(), CommandError> {
        match packet.parameter1 {
            PARAM_GET => self.send_word(sink, packet.code(), var),
            PARAM_SET => {
                self.nv.write_var(var, packet.word())?;
                Ok(())
            }
            _ => Err(CommandError::InvalidParameter),
        }
    }

    fn set_time(&mut self, packet: &Packet) -> Result<(), CommandError> {
        let time = Time::new(packet.parameter1, packet.parameter2, packet.parameter3)
            .ok_or(CommandError::InvalidTime)?;
        self.clock.set(time);
        Ok(())
    }

    fn analog_value<S: ByteSink>(&self, sink: &mut S, ch: u8) -> Result<(), CommandError> {
        self.analog
            .send(sink, ch)
            .ok_or(CommandError::InvalidParameter)??;
        Ok(())
    }
}

impl<B: NvBlock<N>, C: Clock, const N: usize> Handler for Tower<B, C, N> {
    type Error = CommandError;

    fn handle<S: ByteSink>(&mut self, packet: &Packet, sink: &mut S) -> Result<(), CommandError> {
        let command = packet
            .kind()
            .ok_or(CommandError::UnknownCommand(packet.code()))?;

        match command {
            Command::StartupValues => self.send_startup_values(sink),
            Command::ProgramByte => self.program_byte(packet.parameter1, packet.parameter3),
            Command::ReadByte => self.read_byte(sink, packet.parameter1),
            Command::Version => self.send_version(sink),
            Command::ProtocolMode => self.protocol_mode(sink, packet),
            Command::TowerNumber => self.get_set_word(sink, packet, self.tower_number),
            Command::Time => self.set_time(packet),
            Command::TowerMode => self.get_set_word(sink, packet, self.tower_mode),
            Command::AnalogInput => self.analog_value(sink, packet.parameter1),
        }
    }
}
