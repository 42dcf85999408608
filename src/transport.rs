// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Interrupt-driven serial transport.
//!
//! The serial interrupt and the main loop share two [`ByteQueue`]s: received bytes are pushed by
//! the interrupt and popped by the main loop, transmitted bytes go the other way. Every queue
//! mutation happens inside a `critical_section`, so neither side can observe a half-updated queue.
//!
//! The rest of the firmware only sees the [`ByteSource`] / [`ByteSink`] traits: bytes arrive
//! asynchronously, bytes are sent by enqueueing, and enqueueing succeeds unless the transmit
//! queue is full.

use core::cell::RefCell;
use core::sync::atomic::{AtomicU32, Ordering};

use critical_section::Mutex;

use crate::queue::ByteQueue;

/// The transmit queue could not take the bytes. Nothing was enqueued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransportFull;

/// Non-blocking source of received bytes.
pub trait ByteSource {
    fn try_recv(&mut self) -> Option<u8>;
}

/// Non-blocking sink for bytes to transmit.
pub trait ByteSink {
    fn try_send(&mut self, byte: u8) -> Result<(), TransportFull>;

    /// Enqueue all of `bytes` or none of them.
    fn try_send_all(&mut self, bytes: &[u8]) -> Result<(), TransportFull>;
}

/// The parts of a serial peripheral the interrupt handler touches.
pub trait SerialDevice {
    /// Take the received byte, if the receive data register is full.
    fn read_received(&mut self) -> Option<u8>;

    /// Transmit data register is empty.
    fn tx_empty(&self) -> bool;

    fn write_data(&mut self, byte: u8);

    /// Enable or disable the "transmit register empty" interrupt.
    fn set_tx_interrupt(&mut self, enabled: bool);
}

/// Receive and transmit queues shared between the serial interrupt and the main loop.
///
/// Usually placed in a `static` so the interrupt handler can reach it.
pub struct SerialQueues<const RX: usize, const TX: usize> {
    rx: Mutex<RefCell<ByteQueue<RX>>>,
    tx: Mutex<RefCell<ByteQueue<TX>>>,
    rx_dropped: AtomicU32,
}

impl<const RX: usize, const TX: usize> SerialQueues<RX, TX> {
    pub const fn new() -> Self {
        Self {
            rx: Mutex::new(RefCell::new(ByteQueue::new())),
            tx: Mutex::new(RefCell::new(ByteQueue::new())),
            rx_dropped: AtomicU32::new(0),
        }
    }

    /// Empty both queues.
    pub fn init(&self) {
        critical_section::with(|cs| {
            self.rx.borrow_ref_mut(cs).init();
            self.tx.borrow_ref_mut(cs).init();
        });
        self.rx_dropped.store(0, Ordering::Relaxed);
    }

    /// Serial interrupt body.
    ///
    /// Feeds the device from the transmit queue, or turns the transmit interrupt off once the
    /// queue is drained, and stores any received byte. A received byte that does not fit is
    /// dropped and counted.
    pub fn service<D: SerialDevice>(&self, dev: &mut D) {
        if dev.tx_empty() {
            match critical_section::with(|cs| self.tx.borrow_ref_mut(cs).pop()) {
                Some(b) => dev.write_data(b),
                None => dev.set_tx_interrupt(false),
            }
        }

        if let Some(b) = dev.read_received() {
            let stored = critical_section::with(|cs| self.rx.borrow_ref_mut(cs).push(b));
            if stored.is_err() {
                self.rx_dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Pop the next received byte.
    pub fn recv(&self) -> Option<u8> {
        critical_section::with(|cs| self.rx.borrow_ref_mut(cs).pop())
    }

    /// Enqueue bytes for transmission, all or nothing.
    ///
    /// Does not re-arm the transmit interrupt; see [`Link`].
    pub fn enqueue(&self, bytes: &[u8]) -> Result<(), TransportFull> {
        critical_section::with(|cs| self.tx.borrow_ref_mut(cs).push_all(bytes))
            .map_err(|_| TransportFull)
    }

    /// Bytes waiting to be transmitted.
    pub fn tx_pending(&self) -> usize {
        critical_section::with(|cs| self.tx.borrow_ref(cs).len())
    }

    /// Received bytes lost to a full receive queue since the last `init`.
    pub fn rx_dropped(&self) -> u32 {
        self.rx_dropped.load(Ordering::Relaxed)
    }

    /// Main-loop handle. `arm_tx` re-enables the transmit interrupt after every successful
    /// enqueue.
    pub fn link<F: FnMut()>(&self, arm_tx: F) -> Link<'_, RX, TX, F> {
        Link {
            queues: self,
            arm_tx,
        }
    }
}

impl<const RX: usize, const TX: usize> Default for SerialQueues<RX, TX> {
    fn default() -> Self {
        Self::new()
    }
}

/// Main-loop side of the transport: a [`ByteSource`] and [`ByteSink`] over [`SerialQueues`].
pub struct Link<'a, const RX: usize, const TX: usize, F: FnMut()> {
    queues: &'a SerialQueues<RX, TX>,
    arm_tx: F,
}

impl<const RX: usize, const TX: usize, F: FnMut()> ByteSource for Link<'_, RX, TX, F> {
    #[inline]
    fn try_recv(&mut self) -> Option<u8> {
        self.queues.recv()
    }
}

impl<const RX: usize, const TX: usize, F: FnMut()> ByteSink for Link<'_, RX, TX, F> {
    fn try_send(&mut self, byte: u8) -> Result<(), TransportFull> {
        self.try_send_all(&[byte])
    }

    fn try_send_all(&mut self, bytes: &[u8]) -> Result<(), TransportFull> {
        self.queues.enqueue(bytes)?;
        (self.arm_tx)();
        Ok(())
    }
}
