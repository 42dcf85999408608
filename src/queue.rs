// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Fixed-capacity circular byte queue.
//!
//! One queue is used per serial direction. The queue itself is plain data and does no locking:
//! the interrupt-safe wrapper lives in [`crate::transport`], which holds each queue inside a
//! critical-section mutex so the producer and consumer never see `start`, `end` and `count`
//! half-updated.

/// Circular buffer of `N` bytes.
///
/// `count` is the number of stored bytes, `start` indexes the oldest byte and `end` the next free
/// slot. Both indices stay in `[0, N)`.
pub struct ByteQueue<const N: usize> {
    buf: [u8; N],
    start: usize,
    end: usize,
    count: usize,
}

impl<const N: usize> ByteQueue<N> {
    /// Create an empty queue.
    pub const fn new() -> Self {
        Self {
            buf: [0; N],
            start: 0,
            end: 0,
            count: 0,
        }
    }

    /// Discard all stored bytes.
    pub fn init(&mut self) {
        self.start = 0;
        self.end = 0;
        self.count = 0;
    }

    /// Append a byte. Hands the byte back if the queue is full.
    pub fn push(&mut self, byte: u8) -> Result<(), u8> {
        if self.count >= N {
            return Err(byte);
        }
        self.buf[self.end] = byte;
        self.count += 1;
        self.end = (self.end + 1) % N;
        Ok(())
    }

    /// Append every byte of `bytes`, or none of them if they do not all fit.
    pub fn push_all(&mut self, bytes: &[u8]) -> Result<(), ()> {
        if bytes.len() > self.vacancy() {
            return Err(());
        }
        for &b in bytes {
            self.buf[self.end] = b;
            self.end = (self.end + 1) % N;
        }
        self.count += bytes.len();
        Ok(())
    }

    /// Remove and return the oldest byte.
    pub fn pop(&mut self) -> Option<u8> {
        if self.count == 0 {
            return None;
        }
        let byte = self.buf[self.start];
        self.count -= 1;
        self.start = (self.start + 1) % N;
        Some(byte)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.count == N
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of bytes that can still be pushed.
    #[inline]
    pub fn vacancy(&self) -> usize {
        N - self.count
    }
}

impl<const N: usize> Default for ByteQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_fifo_order() {
        let mut q: ByteQueue<4> = ByteQueue::new();
        for b in [1, 2, 3] {
            q.push(b).unwrap();
        }
        assert_eq!(q.pop(), Some(1));
        assert_eq!(q.pop(), Some(2));
        assert_eq!(q.pop(), Some(3));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn push_fails_when_full() {
        let mut q: ByteQueue<2> = ByteQueue::new();
        assert!(q.push(0xAA).is_ok());
        assert!(q.push(0xBB).is_ok());
        assert!(q.is_full());
        assert_eq!(q.push(0xCC), Err(0xCC));
        assert_eq!(q.len(), 2);
        assert_eq!(q.pop(), Some(0xAA));
    }

    #[test]
    fn wraps_around_the_end() {
        let mut q: ByteQueue<3> = ByteQueue::new();
        let mut next_in = 0u8;
        let mut next_out = 0u8;
        // Enough rounds to wrap both indices several times.
        for _ in 0..10 {
            q.push(next_in).unwrap();
            next_in += 1;
            q.push(next_in).unwrap();
            next_in += 1;
            assert_eq!(q.pop(), Some(next_out));
            next_out += 1;
            assert_eq!(q.pop(), Some(next_out));
            next_out += 1;
        }
        assert!(q.is_empty());
    }

    #[test]
    fn count_stays_within_bounds() {
        let mut q: ByteQueue<5> = ByteQueue::new();
        // Deterministic mixed push/pop pattern.
        let mut seed: u32 = 0x1234_5678;
        for i in 0..1000u32 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            if seed & 0x100 == 0 {
                let _ = q.push(i as u8);
            } else {
                let _ = q.pop();
            }
            assert!(q.len() <= q.capacity());
            assert_eq!(q.vacancy() + q.len(), 5);
        }
    }

    #[test]
    fn push_all_is_all_or_nothing() {
        let mut q: ByteQueue<6> = ByteQueue::new();
        q.push(9).unwrap();
        q.push(9).unwrap();
        assert!(q.push_all(&[1, 2, 3, 4, 5]).is_err());
        assert_eq!(q.len(), 2);
        assert!(q.push_all(&[1, 2, 3, 4]).is_ok());
        assert!(q.is_full());
        assert_eq!(q.pop(), Some(9));
        assert_eq!(q.pop(), Some(9));
        assert_eq!(q.pop(), Some(1));
    }

    #[test]
    fn init_empties_the_queue() {
        let mut q: ByteQueue<4> = ByteQueue::new();
        q.push(1).unwrap();
        q.push(2).unwrap();
        q.init();
        assert!(q.is_empty());
        assert_eq!(q.pop(), None);
    }
}
