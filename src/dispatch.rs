// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Command dispatch and the acknowledgement convention.
//!
//! The dispatcher pulls bytes through the [`Framer`] until a packet completes, hands it to a
//! [`Handler`] exactly once, and, if the host set the acknowledgement bit, answers with the same
//! packet: bit set on success, cleared on failure. That bit is the only status the host gets; there
//! are no sequence numbers, retries or timeouts at this layer.

use crate::protocol::{framer, Framer, Packet};
use crate::transport::{ByteSink, ByteSource, TransportFull};

/// Executes one decoded packet.
pub trait Handler {
    type Error;

    /// Handle `packet`. Replies, if any, go to `sink`.
    fn handle<S: ByteSink>(&mut self, packet: &Packet, sink: &mut S) -> Result<(), Self::Error>;
}

/// Result of dispatching one packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Dispatched {
    pub packet: Packet,
    pub success: bool,
    /// `None` if no acknowledgement was requested.
    pub ack: Option<Result<(), TransportFull>>,
}

enum State {
    AwaitingPacket,
    HavePacket(Packet),
}

pub struct Dispatcher {
    framer: Framer,
    state: State,
}

impl Dispatcher {
    pub const fn new() -> Self {
        Self {
            framer: Framer::new(),
            state: State::AwaitingPacket,
        }
    }

    /// Read available bytes from `link` and dispatch at most one completed packet.
    pub fn poll<L, H>(&mut self, link: &mut L, handler: &mut H) -> Option<Dispatched>
    where
        L: ByteSource + ByteSink,
        H: Handler,
    {
        if let State::AwaitingPacket = self.state {
            if let Some(packet) = self.framer.poll(link) {
                self.state = State::HavePacket(packet);
            }
        }

        match self.state {
            State::HavePacket(packet) => {
                self.state = State::AwaitingPacket;
                Some(dispatch(&packet, link, handler))
            }
            State::AwaitingPacket => None,
        }
    }

    #[inline]
    pub fn framer(&self) -> &Framer {
        &self.framer
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `handler` on `packet` and send the acknowledgement if one was requested.
pub fn dispatch<S, H>(packet: &Packet, sink: &mut S, handler: &mut H) -> Dispatched
where
    S: ByteSink,
    H: Handler,
{
    debug!("dispatch: command {}", packet.code());
    let success = handler.handle(packet, sink).is_ok();
    if !success {
        warn!("dispatch: command {} failed", packet.code());
    }

    let ack = packet.ack_requested().then(|| {
        let res = framer::send(sink, &packet.ack(success));
        if res.is_err() {
            warn!("dispatch: no room for acknowledgement");
        }
        res
    });

    Dispatched {
        packet: *packet,
        success,
        ack,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::messages::{encode, ACK_MASK};
    use std::collections::VecDeque;
    use std::vec::Vec;

    /// Loopback link: `rx` is what the host sent, `tx` collects what the tower sends.
    #[derive(Default)]
    struct FakeLink {
        rx: VecDeque<u8>,
        tx: Vec<u8>,
        tx_capacity: Option<usize>,
    }

    impl ByteSource for FakeLink {
        fn try_recv(&mut self) -> Option<u8> {
            self.rx.pop_front()
        }
    }

    impl ByteSink for FakeLink {
        fn try_send(&mut self, byte: u8) -> Result<(), TransportFull> {
            self.try_send_all(&[byte])
        }

        fn try_send_all(&mut self, bytes: &[u8]) -> Result<(), TransportFull> {
            if let Some(cap) = self.tx_capacity {
                if self.tx.len() + bytes.len() > cap {
                    return Err(TransportFull);
                }
            }
            self.tx.extend_from_slice(bytes);
            Ok(())
        }
    }

    /// Succeeds on even command codes, fails on odd ones, and records what it saw.
    #[derive(Default)]
    struct ParityHandler {
        seen: Vec<u8>,
    }

    impl Handler for ParityHandler {
        type Error = ();

        fn handle<S: ByteSink>(&mut self, packet: &Packet, _sink: &mut S) -> Result<(), ()> {
            self.seen.push(packet.code());
            if packet.code() % 2 == 0 {
                Ok(())
            } else {
                Err(())
            }
        }
    }

    #[test]
    fn successful_command_is_acked_with_bit_set() {
        let mut link = FakeLink::default();
        link.rx.extend(encode(0x0A | ACK_MASK, 1, 2, 3));
        let mut handler = ParityHandler::default();
        let mut dispatcher = Dispatcher::new();

        let out = dispatcher.poll(&mut link, &mut handler).unwrap();
        assert!(out.success);
        assert_eq!(out.ack, Some(Ok(())));
        assert_eq!(handler.seen, [0x0A]);
        assert_eq!(link.tx, encode(0x8A, 1, 2, 3));
    }

    #[test]
    fn failed_command_is_acked_with_bit_cleared() {
        let mut link = FakeLink::default();
        link.rx.extend(encode(0x0B | ACK_MASK, 2, 0xC7, 0x09));
        let mut handler = ParityHandler::default();
        let mut dispatcher = Dispatcher::new();

        let out = dispatcher.poll(&mut link, &mut handler).unwrap();
        assert!(!out.success);
        assert_eq!(link.tx, encode(0x0B, 2, 0xC7, 0x09));
    }

    #[test]
    fn no_ack_without_request() {
        let mut link = FakeLink::default();
        link.rx.extend(encode(0x0B, 2, 0xC7, 0x09));
        let mut handler = ParityHandler::default();
        let mut dispatcher = Dispatcher::new();

        let out = dispatcher.poll(&mut link, &mut handler).unwrap();
        assert_eq!(out.ack, None);
        assert!(link.tx.is_empty());
    }

    #[test]
    fn dispatches_each_packet_once() {
        let mut link = FakeLink::default();
        link.rx.extend(encode(0x04, 0, 0, 0));
        link.rx.extend(encode(0x08, 1, 0, 0));
        let mut handler = ParityHandler::default();
        let mut dispatcher = Dispatcher::new();

        assert!(dispatcher.poll(&mut link, &mut handler).is_some());
        assert!(dispatcher.poll(&mut link, &mut handler).is_some());
        assert!(dispatcher.poll(&mut link, &mut handler).is_none());
        assert_eq!(handler.seen, [0x04, 0x08]);
    }

    #[test]
    fn partial_packet_waits_for_more_bytes() {
        let mut link = FakeLink::default();
        let bytes = encode(0x09 | ACK_MASK, b'v', 1, 0);
        link.rx.extend(&bytes[..3]);
        let mut handler = ParityHandler::default();
        let mut dispatcher = Dispatcher::new();

        assert!(dispatcher.poll(&mut link, &mut handler).is_none());
        assert!(dispatcher.framer().in_progress());
        link.rx.extend(&bytes[3..]);
        let out = dispatcher.poll(&mut link, &mut handler).unwrap();
        assert_eq!(out.packet.code(), 0x09);
    }

    #[test]
    fn full_sink_reports_lost_ack() {
        let mut link = FakeLink {
            tx_capacity: Some(4),
            ..Default::default()
        };
        link.rx.extend(encode(0x04 | ACK_MASK, 0, 0, 0));
        let mut handler = ParityHandler::default();
        let mut dispatcher = Dispatcher::new();

        let out = dispatcher.poll(&mut link, &mut handler).unwrap();
        assert!(out.success);
        assert_eq!(out.ack, Some(Err(TransportFull)));
        assert!(link.tx.is_empty());
    }
}
