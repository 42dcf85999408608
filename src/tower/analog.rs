// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Analog input sampling and reporting.
//!
//! Each tick every channel is sampled. In synchronous mode every channel is then reported to the
//! host; in asynchronous mode only channels whose value changed since the previous sample are.

use crate::protocol::{framer, messages::CMD_ANALOG_INPUT};
use crate::transport::{ByteSink, TransportFull};

/// Trait for reading a single channel from an ADC peripheral.
pub trait AdcRead {
    fn read_channel(&mut self, ch: u8) -> u16;
}

/// Latest and previous sample of each of `C` channels.
pub struct AnalogInputs<const C: usize> {
    value: [u16; C],
    previous: [u16; C],
}

impl<const C: usize> AnalogInputs<C> {
    pub const fn new() -> Self {
        Self {
            value: [0; C],
            previous: [0; C],
        }
    }

    /// Take a new sample of every channel.
    pub fn sample<A: AdcRead>(&mut self, adc: &mut A) {
        for ch in 0..C {
            self.previous[ch] = self.value[ch];
            self.value[ch] = adc.read_channel(ch as u8);
        }
    }

    /// Latest sample of `ch`, or `None` if there is no such channel.
    #[inline]
    pub fn value(&self, ch: u8) -> Option<u16> {
        self.value.get(ch as usize).copied()
    }

    pub fn changed(&self, ch: u8) -> bool {
        let ch = ch as usize;
        ch < C && self.value[ch] != self.previous[ch]
    }

    /// Send `(0x50, channel, lo, hi)` for one channel.
    pub fn send<S: ByteSink>(&self, sink: &mut S, ch: u8) -> Option<Result<(), TransportFull>> {
        let [lo, hi] = self.value(ch)?.to_le_bytes();
        Some(framer::put(sink, CMD_ANALOG_INPUT, ch, lo, hi))
    }

    /// Report the latest samples. Returns the number of packets sent.
    pub fn report<S: ByteSink>(
        &self,
        sink: &mut S,
        synchronous: bool,
    ) -> Result<usize, TransportFull> {
        let mut sent = 0;
        for ch in 0..C as u8 {
            if !synchronous && !self.changed(ch) {
                continue;
            }
            if let Some(res) = self.send(sink, ch) {
                res?;
                sent += 1;
            }
        }
        Ok(sent)
    }
}

impl<const C: usize> Default for AnalogInputs<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::protocol::messages::encode;
    use std::vec::Vec;

    /// Returns the next scripted value for each channel, repeating the last one.
    pub struct ScriptedAdc {
        pub values: Vec<[u16; 2]>,
        pub step: usize,
    }

    impl AdcRead for ScriptedAdc {
        fn read_channel(&mut self, ch: u8) -> u16 {
            let row = self.values[self.step.min(self.values.len() - 1)];
            if ch as usize == row.len() - 1 {
                self.step += 1;
            }
            row[ch as usize]
        }
    }

    pub struct VecSink(pub Vec<u8>);

    impl ByteSink for VecSink {
        fn try_send(&mut self, byte: u8) -> Result<(), TransportFull> {
            self.0.push(byte);
            Ok(())
        }

        fn try_send_all(&mut self, bytes: &[u8]) -> Result<(), TransportFull> {
            self.0.extend_from_slice(bytes);
            Ok(())
        }
    }

    #[test]
    fn asynchronous_reports_only_changes() {
        let mut adc = ScriptedAdc {
            values: Vec::from([[0x0123, 0x0456], [0x0123, 0x0457]]),
            step: 0,
        };
        let mut inputs: AnalogInputs<2> = AnalogInputs::new();
        let mut sink = VecSink(Vec::new());

        inputs.sample(&mut adc);
        assert_eq!(inputs.report(&mut sink, false), Ok(2));
        sink.0.clear();

        inputs.sample(&mut adc);
        assert_eq!(inputs.report(&mut sink, false), Ok(1));
        assert_eq!(sink.0, encode(0x50, 1, 0x57, 0x04));
        sink.0.clear();

        inputs.sample(&mut adc);
        assert_eq!(inputs.report(&mut sink, false), Ok(0));
        assert!(sink.0.is_empty());
    }

    #[test]
    fn synchronous_reports_every_channel() {
        let mut adc = ScriptedAdc {
            values: Vec::from([[7, 9]]),
            step: 0,
        };
        let mut inputs: AnalogInputs<2> = AnalogInputs::new();
        let mut sink = VecSink(Vec::new());

        inputs.sample(&mut adc);
        inputs.sample(&mut adc);
        assert_eq!(inputs.report(&mut sink, true), Ok(2));
        let mut expected = Vec::from(encode(0x50, 0, 7, 0));
        expected.extend_from_slice(&encode(0x50, 1, 9, 0));
        assert_eq!(sink.0, expected);
    }

    #[test]
    fn unknown_channel_has_no_value() {
        let inputs: AnalogInputs<2> = AnalogInputs::new();
        let mut sink = VecSink(Vec::new());
        assert_eq!(inputs.value(2), None);
        assert!(inputs.send(&mut sink, 2).is_none());
    }
}
