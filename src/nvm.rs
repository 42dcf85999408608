// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Non-volatile variables inside a single erasable flash block.
//!
//! The medium can only be erased as a whole block and programmed afterwards, so every update is an
//! erase-modify-write cycle: read the full block, overlay the changed field, erase, reprogram, and
//! wait for the medium to report completion before returning.
//!
//! Variables are 1, 2 or 4 bytes, aligned to their own size and stored little-endian. The
//! allocation table is runtime-only bookkeeping. Callers are expected to allocate the same
//! variables in the same order on every boot so they land on the same offsets.
//!
//! Erasing the block ([`NvStore::erase_all`]) does not touch the allocation table: allocated
//! variables stay reserved and read back as the erased value. [`NvStore::reset`] clears both.

use core::marker::PhantomData;

/// Value of an erased byte.
pub const ERASED: u8 = 0xFF;

/// The medium reported an error for the last erase or program command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MediumFault;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NvError {
    /// Variable size is not 1, 2 or 4 bytes.
    InvalidSize,
    /// Offset (plus size) lies outside the block.
    OutOfRange,
    /// Offset is not a multiple of the variable size.
    Misaligned,
    /// No free, aligned span of the requested size.
    Exhausted,
    /// Erase or program failed. The block contents are indeterminate.
    MediumFault,
}

impl From<MediumFault> for NvError {
    fn from(_: MediumFault) -> Self {
        NvError::MediumFault
    }
}

/// A block-erase, byte-program storage medium of `N` bytes.
///
/// Erase and program only start an operation; completion is observed through [`NvBlock::poll`].
pub trait NvBlock<const N: usize> {
    /// Current contents of the whole block.
    fn read(&self) -> [u8; N];

    /// Start erasing the whole block to [`ERASED`].
    fn start_erase(&mut self);

    /// Start programming one byte of an erased block.
    fn start_program(&mut self, offset: usize, byte: u8);

    /// `Ok` when idle, `WouldBlock` while busy, `Other` if the last operation failed.
    fn poll(&mut self) -> nb::Result<(), MediumFault>;
}

/// Types that can be stored as a non-volatile variable.
pub trait NvValue: Copy {
    const SIZE: usize;

    fn to_word(self) -> u32;
    fn from_word(word: u32) -> Self;
}

impl NvValue for u8 {
    const SIZE: usize = 1;

    fn to_word(self) -> u32 {
        self as u32
    }

    fn from_word(word: u32) -> Self {
        word as u8
    }
}

impl NvValue for u16 {
    const SIZE: usize = 2;

    fn to_word(self) -> u32 {
        self as u32
    }

    fn from_word(word: u32) -> Self {
        word as u16
    }
}

impl NvValue for u32 {
    const SIZE: usize = 4;

    fn to_word(self) -> u32 {
        self
    }

    fn from_word(word: u32) -> Self {
        word
    }
}

/// Handle to an allocated variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NvVar<T> {
    offset: usize,
    _ty: PhantomData<T>,
}

impl<T> NvVar<T> {
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }
}

fn check_size(size: usize) -> Result<(), NvError> {
    match size {
        1 | 2 | 4 => Ok(()),
        _ => Err(NvError::InvalidSize),
    }
}

fn check_span<const N: usize>(offset: usize, size: usize) -> Result<(), NvError> {
    check_size(size)?;
    if offset >= N || size > N - offset {
        return Err(NvError::OutOfRange);
    }
    if offset % size != 0 {
        return Err(NvError::Misaligned);
    }
    Ok(())
}

/// One flag per byte of the block.
pub struct AllocationTable<const N: usize> {
    allocated: [bool; N],
}

impl<const N: usize> AllocationTable<N> {
    pub const fn new() -> Self {
        Self {
            allocated: [false; N],
        }
    }

    /// Reserve the first free span of `size` bytes that starts at a multiple of `size`.
    ///
    /// The table is left unchanged on failure.
    pub fn allocate(&mut self, size: usize) -> Result<usize, NvError> {
        check_size(size)?;
        let offset = (0..N)
            .step_by(size)
            .filter(|&o| size <= N - o)
            .find(|&o| self.allocated[o..o + size].iter().all(|&a| !a))
            .ok_or(NvError::Exhausted)?;
        self.allocated[offset..offset + size].fill(true);
        Ok(offset)
    }

    #[inline]
    pub fn is_allocated(&self, offset: usize) -> bool {
        self.allocated.get(offset).copied().unwrap_or(false)
    }

    /// Number of reserved bytes.
    pub fn used(&self) -> usize {
        self.allocated.iter().filter(|&&a| a).count()
    }

    pub fn free_all(&mut self) {
        self.allocated = [false; N];
    }
}

impl<const N: usize> Default for AllocationTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Allocator and erase-modify-write cycle over one [`NvBlock`].
///
/// All mutation goes through `&mut self`, so allocation and writes are single-writer by
/// construction. Writes busy-wait on the medium and must only be issued from the main loop.
pub struct NvStore<B, const N: usize> {
    block: B,
    table: AllocationTable<N>,
}

impl<B: NvBlock<N>, const N: usize> NvStore<B, N> {
    /// Wrap a medium. The allocation table starts empty.
    pub fn new(block: B) -> Self {
        Self {
            block,
            table: AllocationTable::new(),
        }
    }

    /// Reserve `size` bytes (1, 2 or 4) and return their offset.
    pub fn allocate(&mut self, size: usize) -> Result<usize, NvError> {
        let res = self.table.allocate(size);
        if res.is_err() {
            error!("nvm: cannot allocate {} bytes", size);
        }
        res
    }

    /// Reserve a typed variable.
    pub fn allocate_var<T: NvValue>(&mut self) -> Result<NvVar<T>, NvError> {
        let offset = self.allocate(T::SIZE)?;
        Ok(NvVar {
            offset,
            _ty: PhantomData,
        })
    }

    /// Read `size` bytes at `offset` as a little-endian value.
    pub fn read(&self, offset: usize, size: usize) -> Result<u32, NvError> {
        check_span::<N>(offset, size)?;
        let data = self.block.read();
        let mut word = [0u8; 4];
        word[..size].copy_from_slice(&data[offset..offset + size]);
        Ok(u32::from_le_bytes(word))
    }

    /// Store the low `size` bytes of `value` at `offset`, preserving every other byte of the block.
    ///
    /// On `MediumFault` the block may be left erased or partially programmed.
    pub fn write(&mut self, offset: usize, size: usize, value: u32) -> Result<(), NvError> {
        check_span::<N>(offset, size)?;

        self.wait_ready()?;
        let mut scratch = self.block.read();
        scratch[offset..offset + size].copy_from_slice(&value.to_le_bytes()[..size]);

        self.erase_block()?;
        for (i, &b) in scratch.iter().enumerate() {
            if b == ERASED {
                continue;
            }
            self.block.start_program(i, b);
            self.wait_ready()?;
        }
        debug!("nvm: wrote {} bytes at offset {}", size, offset);
        Ok(())
    }

    pub fn read_var<T: NvValue>(&self, var: NvVar<T>) -> Result<T, NvError> {
        self.read(var.offset, T::SIZE).map(T::from_word)
    }

    pub fn write_var<T: NvValue>(&mut self, var: NvVar<T>, value: T) -> Result<(), NvError> {
        self.write(var.offset, T::SIZE, value.to_word())
    }

    /// Erase the whole block. Allocations are kept.
    pub fn erase_all(&mut self) -> Result<(), NvError> {
        self.wait_ready()?;
        self.erase_block()?;
        info!("nvm: block erased");
        Ok(())
    }

    /// Erase the whole block and release every allocation.
    pub fn reset(&mut self) -> Result<(), NvError> {
        self.erase_all()?;
        self.table.free_all();
        Ok(())
    }

    #[inline]
    pub fn table(&self) -> &AllocationTable<N> {
        &self.table
    }

    #[inline]
    pub fn block(&self) -> &B {
        &self.block
    }

    fn erase_block(&mut self) -> Result<(), NvError> {
        self.block.start_erase();
        self.wait_ready()
    }

    /// Spin until the medium is idle.
    ///
    /// Each status check runs with interrupts masked and is acted on as-is: a medium may clear its
    /// error flags once it has reported them, so a fault is never polled twice.
    fn wait_ready(&mut self) -> Result<(), NvError> {
        loop {
            match critical_section::with(|_| self.block.poll()) {
                Ok(()) => return Ok(()),
                Err(nb::Error::WouldBlock) => core::hint::spin_loop(),
                Err(nb::Error::Other(fault)) => {
                    error!("nvm: medium fault");
                    return Err(fault.into());
                }
            }
        }
    }
}
