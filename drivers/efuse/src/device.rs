// Licensed under the Apache-2.0 license

//! The process-wide eFUSE handle.

use crate::{
    validate_address, ClockGate, EfuseBus, EfuseController, EfuseError, EfuseFile, EfuseResult,
    ReadMode, Row, WordWriteReport,
};
use efuse_config::EfuseConfig;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Owns the controller behind a single lock.
///
/// Every public operation holds the lock for its whole register sequence, so
/// a program pulse, a physical read or a word write is never interleaved with
/// another caller's register accesses.
pub struct Efuse<B, C> {
    controller: Mutex<EfuseController<B, C>>,
    programming_enabled: bool,
}

impl<B: EfuseBus, C: ClockGate> Efuse<B, C> {
    pub fn new(bus: B, clock: C, config: &EfuseConfig) -> Self {
        if config.programming_enabled {
            log::info!("eFUSE programming is enabled");
        }
        Self {
            controller: Mutex::new(EfuseController::new(bus, clock, config.ready_poll_limit)),
            programming_enabled: config.programming_enabled,
        }
    }

    pub fn programming_enabled(&self) -> bool {
        self.programming_enabled
    }

    fn lock(&self) -> MutexGuard<'_, EfuseController<B, C>> {
        // The guarded state is the hardware itself; a panicking holder leaves
        // nothing inconsistent behind that a retry would not see anyway.
        self.controller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn check_programming(&self) -> EfuseResult<()> {
        if !self.programming_enabled {
            log::warn!("eFUSE write rejected: programming is disabled");
            return Err(EfuseError::ProgrammingDisabled);
        }
        Ok(())
    }

    /// Opens a character-device style view of the fuses.
    pub fn open(&self) -> EfuseFile<'_, B, C> {
        EfuseFile::new(self)
    }

    pub fn read_shadow(&self, addr: u32) -> EfuseResult<u32> {
        self.lock().read_shadow(addr)
    }

    pub fn read_buf(&self, addr: u32, buf: &mut [u8]) -> EfuseResult<usize> {
        self.lock().read_buf(addr, buf)
    }

    pub fn read_physical(&self, phys_word_addr: u32, mode: ReadMode) -> EfuseResult<u32> {
        self.lock()
            .with_clock(|ctrl| ctrl.read_physical(phys_word_addr, mode))
    }

    pub fn program_bit(&self, word_addr: u32, bit_addr: u32, row: Row) -> EfuseResult<()> {
        self.check_programming()?;
        self.lock()
            .with_clock(|ctrl| ctrl.program_bit(word_addr, bit_addr, row))
    }

    pub fn write_word(&self, word_addr: u32, value: u32) -> EfuseResult<WordWriteReport> {
        self.check_programming()?;
        self.lock().with_clock(|ctrl| ctrl.write_word(word_addr, value))
    }

    /// Writes `value` at byte address `addr`.
    ///
    /// Runs the whole sequence with the clock enabled: program and verify the
    /// word, then power on, refresh and wait for the shadow to settle.
    pub fn write(&self, addr: u32, value: u32) -> EfuseResult<WordWriteReport> {
        log::debug!("write(): {:#x} = {:#x}", addr, value);
        self.check_programming()?;
        validate_address(addr)?;

        self.lock().with_clock(|ctrl| {
            let report = ctrl.write_word(addr / 4, value);
            log::debug!("write(): ret={:?}", report.as_ref().map(|r| r.error_count()));

            ctrl.power_on(true);
            ctrl.refresh();
            let ready = ctrl.wait_ready();
            let report = report?;
            ready?;
            Ok(report)
        })
    }

    /// Powers the macro down and hands back the bus and clock.
    pub fn shutdown(self) -> (B, C) {
        let mut controller = self
            .controller
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        controller.power_on(false);
        log::info!("eFUSE powered down");
        controller.into_parts()
    }
}
