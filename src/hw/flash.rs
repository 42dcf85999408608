// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Internal flash as the non-volatile block, using direct PAC register access.
//!
//! The block is the first [`NV_BLOCK_SIZE`] bytes of sector 11, the last 256 KiB sector of the
//! STM32F777's 2 MiB single-bank flash. Erasing clears the whole sector. Bytes are programmed one
//! at a time with an 8-bit parallelism.

use stm32f7xx_hal::pac;

use crate::config::NV_BLOCK_SIZE;
use crate::nvm::{MediumFault, NvBlock};

const SECTOR: u32 = 11;
const SECTOR_BASE: usize = 0x081C_0000;

const KEY1: u32 = 0x4567_0123;
const KEY2: u32 = 0xCDEF_89AB;

// FLASH_CR
const CR_PG: u32 = 1 << 0;
const CR_SER: u32 = 1 << 1;
const CR_SNB_SHIFT: u32 = 3;
const CR_SNB_MASK: u32 = 0x1F << CR_SNB_SHIFT;
const CR_PSIZE_MASK: u32 = 0b11 << 8;
const CR_STRT: u32 = 1 << 16;
const CR_LOCK: u32 = 1 << 31;

// FLASH_SR
const SR_OPERR: u32 = 1 << 1;
const SR_WRPERR: u32 = 1 << 4;
const SR_PGAERR: u32 = 1 << 5;
const SR_PGPERR: u32 = 1 << 6;
const SR_ERSERR: u32 = 1 << 7;
const SR_BSY: u32 = 1 << 16;
const SR_ERRORS: u32 = SR_OPERR | SR_WRPERR | SR_PGAERR | SR_PGPERR | SR_ERSERR;

/// Sector 11 of the internal flash.
pub struct FlashBlock {
    flash: pac::FLASH,
    /// A request outside the block was refused; reported by the next `poll`.
    rejected: bool,
}

impl FlashBlock {
    pub fn new(flash: pac::FLASH) -> Self {
        Self {
            flash,
            rejected: false,
        }
    }

    fn unlock(&mut self) {
        if self.flash.cr.read().bits() & CR_LOCK != 0 {
            self.flash.keyr.write(|w| unsafe { w.bits(KEY1) });
            self.flash.keyr.write(|w| unsafe { w.bits(KEY2) });
        }
        // Clear stale error flags (write-one-to-clear).
        self.flash.sr.write(|w| unsafe { w.bits(SR_ERRORS) });
    }

    fn finish(&mut self) {
        self.flash.cr.modify(|r, w| unsafe {
            w.bits((r.bits() & !(CR_PG | CR_SER | CR_SNB_MASK)) | CR_LOCK)
        });
    }
}

impl NvBlock<NV_BLOCK_SIZE> for FlashBlock {
    fn read(&self) -> [u8; NV_BLOCK_SIZE] {
        let mut out = [0u8; NV_BLOCK_SIZE];
        for (i, b) in out.iter_mut().enumerate() {
            *b = unsafe { core::ptr::read_volatile((SECTOR_BASE + i) as *const u8) };
        }
        out
    }

    fn start_erase(&mut self) {
        self.unlock();
        self.flash.cr.modify(|r, w| unsafe {
            let bits = r.bits() & !(CR_PG | CR_SNB_MASK | CR_PSIZE_MASK);
            w.bits(bits | CR_SER | (SECTOR << CR_SNB_SHIFT))
        });
        self.flash
            .cr
            .modify(|r, w| unsafe { w.bits(r.bits() | CR_STRT) });
        debug!("flash: erasing sector {}", SECTOR);
    }

    fn start_program(&mut self, offset: usize, byte: u8) {
        if offset >= NV_BLOCK_SIZE {
            error!("flash: program offset {} outside block", offset);
            self.rejected = true;
            return;
        }
        self.unlock();
        // PSIZE = 0b00: byte parallelism.
        self.flash.cr.modify(|r, w| unsafe {
            let bits = r.bits() & !(CR_SER | CR_SNB_MASK | CR_PSIZE_MASK);
            w.bits(bits | CR_PG)
        });
        unsafe { core::ptr::write_volatile((SECTOR_BASE + offset) as *mut u8, byte) };
        cortex_m::asm::dsb();
    }

    fn poll(&mut self) -> nb::Result<(), MediumFault> {
        if core::mem::take(&mut self.rejected) {
            return Err(nb::Error::Other(MediumFault));
        }

        let sr = self.flash.sr.read().bits();
        if sr & SR_BSY != 0 {
            return Err(nb::Error::WouldBlock);
        }

        self.finish();
        if sr & SR_ERRORS != 0 {
            self.flash.sr.write(|w| unsafe { w.bits(sr & SR_ERRORS) });
            error!("flash: status error {}", sr & SR_ERRORS);
            return Err(nb::Error::Other(MediumFault));
        }
        Ok(())
    }
}
