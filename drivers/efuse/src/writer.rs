// Licensed under the Apache-2.0 license

//! Program-then-verify word writes.
//!
//! A virtual word is backed by two physical rows. Each row is array-read, the
//! requested bits that are still zero get one program pulse each, and the row
//! is margin-read to confirm the requested bits hold. A row that fails the
//! check counts as one error; the word write fails only when both rows fail.
//! The check is a subset test, so bits that were already set (or got set by
//! accident) are not reported.

use crate::{physical_word_address, ClockGate, EfuseBus, EfuseController, EfuseError};
use crate::{EfuseResult, ReadMode, Row};

/// Number of failing rows at which a word write is reported as failed.
pub const MAX_ROW_ERRORS: u32 = 2;

/// What happened to one physical row during a word write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowReport {
    pub row: Row,
    /// Array-read value before programming
    pub before: u32,
    /// Bits that received a program pulse
    pub programmed: u32,
    /// Margin-read value after programming
    pub margin: u32,
    pub verified: bool,
}

impl RowReport {
    const fn empty(row: Row) -> Self {
        Self {
            row,
            before: 0,
            programmed: 0,
            margin: 0,
            verified: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordWriteReport {
    pub word: u32,
    pub value: u32,
    pub rows: [RowReport; 2],
}

impl WordWriteReport {
    pub fn error_count(&self) -> u32 {
        self.rows.iter().filter(|r| !r.verified).count() as u32
    }

    /// Every `(row, bit)` pair that was pulsed.
    pub fn programmed_bits(&self) -> impl Iterator<Item = (Row, u32)> + '_ {
        self.rows
            .iter()
            .flat_map(|r| set_bits(r.programmed).map(move |bit| (r.row, bit)))
    }
}

fn set_bits(mask: u32) -> impl Iterator<Item = u32> {
    (0..u32::BITS).filter(move |bit| (mask >> bit) & 1 == 1)
}

impl<B: EfuseBus, C: ClockGate> EfuseController<B, C> {
    /// Programs `value` into virtual word `word_addr` and verifies it.
    ///
    /// Bits blown before a failure stay blown.
    pub fn write_word(&mut self, word_addr: u32, value: u32) -> EfuseResult<WordWriteReport> {
        let mut rows = [RowReport::empty(Row::Low), RowReport::empty(Row::High)];
        let mut err_cnt = 0;

        for report in rows.iter_mut() {
            let row = report.row;
            let phys_word_addr = physical_word_address(word_addr, row);
            log::debug!("Program physical word addr #{}", phys_word_addr);

            let before = self.read_physical(phys_word_addr, ReadMode::Array)?;
            // only zero bits get a pulse
            let zero_bits = value & !before;
            for bit in set_bits(zero_bits) {
                self.program_bit(word_addr, bit, row)?;
            }

            let margin = self.read_physical(phys_word_addr, ReadMode::Margin)?;
            log::debug!("write_word(): val={:#x} new_value={:#x}", value, margin);

            let verified = value & margin == value;
            if !verified {
                err_cnt += 1;
                log::error!("eFUSE program bits check failed ({})", err_cnt);
            }

            *report = RowReport {
                row,
                before,
                programmed: zero_bits,
                margin,
                verified,
            };
        }

        self.refresh();

        if err_cnt >= MAX_ROW_ERRORS {
            return Err(EfuseError::VerifyFailed {
                word: word_addr,
                failed_rows: err_cnt,
            });
        }
        Ok(WordWriteReport {
            word: word_addr,
            value,
            rows,
        })
    }
}
