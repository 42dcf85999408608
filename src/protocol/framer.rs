// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Packet framer for the tower protocol.
//!
//! Turns a raw byte stream into checksummed [`Packet`]s and encodes outgoing packets. There is no
//! start byte: frame alignment is recovered by sliding a five-byte window over the stream until
//! the last byte matches the XOR of the four before it.

use crate::protocol::messages::{Packet, PACKET_SIZE};
use crate::transport::{ByteSink, ByteSource, TransportFull};

const CHECKSUM_POS: usize = PACKET_SIZE - 1;

/// Incremental packet assembler.
pub struct Framer {
    /// command, parameter1, parameter2, parameter3, checksum
    window: [u8; PACKET_SIZE],
    position: usize,
}

impl Framer {
    pub const fn new() -> Self {
        Self {
            window: [0; PACKET_SIZE],
            position: 0,
        }
    }

    /// Process a single incoming byte. Returns `Some(Packet)` once a packet with a valid checksum
    /// has been assembled.
    ///
    /// On a checksum mismatch the window drops its oldest byte and keeps the rest, so every
    /// following byte is tried as the checksum of the four bytes before it. At most one byte is
    /// discarded per failed attempt.
    pub fn feed(&mut self, byte: u8) -> Option<Packet> {
        self.window[self.position] = byte;
        if self.position < CHECKSUM_POS {
            self.position += 1;
            return None;
        }

        let [command, parameter1, parameter2, parameter3, checksum] = self.window;
        let packet = Packet::new(command, parameter1, parameter2, parameter3);
        if packet.checksum() == checksum {
            self.position = 0;
            return Some(packet);
        }

        trace!("framer: checksum mismatch, shifting window");
        self.window.copy_within(1.., 0);
        None
    }

    /// Drain `source` until a packet completes or no more bytes are available.
    pub fn poll<S: ByteSource>(&mut self, source: &mut S) -> Option<Packet> {
        while let Some(byte) = source.try_recv() {
            if let Some(packet) = self.feed(byte) {
                return Some(packet);
            }
        }
        None
    }

    /// Whether part of a packet has been received.
    #[inline]
    pub fn in_progress(&self) -> bool {
        self.position != 0
    }
}

impl Default for Framer {
    fn default() -> Self {
        Self::new()
    }
}

/// Enqueue a whole packet on `sink`.
///
/// Either all five bytes are enqueued or none are: a partial packet would throw the remote framer
/// out of alignment. On `TransportFull` the caller may retry the whole packet later.
pub fn send<S: ByteSink>(sink: &mut S, packet: &Packet) -> Result<(), TransportFull> {
    sink.try_send_all(&packet.to_bytes())
}

/// Build and enqueue a packet from its fields.
#[inline]
pub fn put<S: ByteSink>(
    sink: &mut S,
    command: u8,
    parameter1: u8,
    parameter2: u8,
    parameter3: u8,
) -> Result<(), TransportFull> {
    send(sink, &Packet::new(command, parameter1, parameter2, parameter3))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::messages::encode;
    use std::vec::Vec;

    fn feed_all(framer: &mut Framer, bytes: &[u8]) -> Vec<Packet> {
        bytes.iter().filter_map(|&b| framer.feed(b)).collect()
    }

    struct VecSink {
        bytes: Vec<u8>,
        capacity: usize,
    }

    impl ByteSink for VecSink {
        fn try_send(&mut self, byte: u8) -> Result<(), TransportFull> {
            self.try_send_all(&[byte])
        }

        fn try_send_all(&mut self, bytes: &[u8]) -> Result<(), TransportFull> {
            if self.bytes.len() + bytes.len() > self.capacity {
                return Err(TransportFull);
            }
            self.bytes.extend_from_slice(bytes);
            Ok(())
        }
    }

    struct SliceSource<'a>(&'a [u8]);

    impl ByteSource for SliceSource<'_> {
        fn try_recv(&mut self) -> Option<u8> {
            let (&first, rest) = self.0.split_first()?;
            self.0 = rest;
            Some(first)
        }
    }

    #[test]
    fn encoded_packets_are_recovered() {
        let mut framer = Framer::new();
        let mut seed: u32 = 7;
        for _ in 0..500 {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let [c, p1, p2, p3] = seed.to_le_bytes();
            let packets = feed_all(&mut framer, &encode(c, p1, p2, p3));
            assert_eq!(packets, [Packet::new(c, p1, p2, p3)]);
            assert!(!framer.in_progress());
        }
    }

    #[test]
    fn incomplete_packet_is_not_reported() {
        let mut framer = Framer::new();
        assert!(feed_all(&mut framer, &[0x09, 0x76, 0x01, 0x00]).is_empty());
        assert!(framer.in_progress());
        assert_eq!(framer.feed(0x7E), Some(Packet::new(0x09, 0x76, 0x01, 0x00)));
    }

    #[test]
    fn resyncs_after_corrupted_checksum() {
        let mut framer = Framer::new();
        // Version reply with its checksum (0x7E) corrupted, then a tower number packet.
        let mut stream = Vec::from([0x09, 0x76, 0x01, 0x00, 0x00]);
        stream.extend_from_slice(&encode(0x0B, 0x01, 0xC7, 0x09));

        let packets = feed_all(&mut framer, &stream);
        assert_eq!(packets, [Packet::new(0x0B, 0x01, 0xC7, 0x09)]);
    }

    #[test]
    fn resyncs_after_any_corrupted_byte() {
        let mut seed: u32 = 0x2545_F491;
        let mut next_word = || {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            seed.to_le_bytes()
        };

        let mut cases = 0;
        let mut collisions = 0;
        for _ in 0..150 {
            let [c, p1, p2, p3] = next_word();
            let [n, q1, q2, q3] = next_word();
            let following = Packet::new(n, q1, q2, q3);

            for pos in 0..PACKET_SIZE {
                for mask in [0x01, 0x10, 0x80, 0x5A, 0xFF] {
                    let mut frame = encode(c, p1, p2, p3);
                    frame[pos] ^= mask;
                    let mut stream = Vec::from(frame);
                    stream.extend_from_slice(&following.to_bytes());

                    let mut framer = Framer::new();
                    let packets = feed_all(&mut framer, &stream);
                    cases += 1;

                    // The damaged frame itself never passes. Only a window straddling the two
                    // frames can, and accepting it consumes bytes of the following frame.
                    assert_eq!(packets.len(), 1, "pos {} mask {:#x}", pos, mask);
                    if packets[0] != following {
                        collisions += 1;
                    }
                }
            }
        }

        assert_eq!(cases, 3750);
        // Each of the four straddling windows matches by chance about once in 256.
        assert!(collisions * 20 < cases, "{} of {} lost", collisions, cases);
    }

    #[test]
    fn skips_leading_garbage() {
        let mut framer = Framer::new();
        let mut stream = Vec::from([0xAA, 0xBB]);
        stream.extend_from_slice(&encode(0x09, b'v', 1, 0));

        let packets = feed_all(&mut framer, &stream);
        assert_eq!(packets, [Packet::new(0x09, b'v', 1, 0)]);
    }

    #[test]
    fn poll_stops_at_each_packet() {
        let mut framer = Framer::new();
        let mut stream = Vec::from(encode(0x04, 0, 0, 0));
        stream.extend_from_slice(&encode(0x89, 0, 0, 0));
        let mut source = SliceSource(&stream);

        assert_eq!(framer.poll(&mut source), Some(Packet::new(0x04, 0, 0, 0)));
        assert_eq!(framer.poll(&mut source), Some(Packet::new(0x89, 0, 0, 0)));
        assert_eq!(framer.poll(&mut source), None);
    }

    #[test]
    fn send_is_all_or_nothing() {
        let mut sink = VecSink {
            bytes: Vec::new(),
            capacity: 8,
        };
        assert!(put(&mut sink, 0x09, b'v', 1, 0).is_ok());
        assert_eq!(sink.bytes, [0x09, 0x76, 0x01, 0x00, 0x7E]);

        assert_eq!(put(&mut sink, 0x04, 0, 0, 0), Err(TransportFull));
        assert_eq!(sink.bytes.len(), 5);
    }
}
