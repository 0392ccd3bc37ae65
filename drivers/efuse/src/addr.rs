// Licensed under the Apache-2.0 license

//! Virtual to physical fuse addressing.
//!
//! Physical bit address, 12 bits:
//!
//! ```text
//!  11      7 6          1   0
//! +---------+------------+-----+
//! |   bit   |    word    | row |
//! +---------+------------+-----+
//! ```
//!
//! The word field only keeps the low six bits of the virtual word address, so
//! words past 63 wrap. Callers reject those before getting here.

use efuse_registers::bits::Address;

/// One of the two physical rows backing a virtual word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u32)]
pub enum Row {
    Low = 0,
    High = 1,
}

impl Row {
    pub const ALL: [Row; 2] = [Row::Low, Row::High];
}

impl From<Row> for u32 {
    fn from(row: Row) -> u32 {
        row as u32
    }
}

pub fn compose_physical_address(word_addr: u32, bit_addr: u32, row: Row) -> u32 {
    (Address::BIT.val(bit_addr & 0x1f)
        + Address::WORD.val(word_addr & 0x3f)
        + Address::ROW.val(row.into()))
    .value
}

/// Row index used by array and margin reads.
pub fn physical_word_address(word_addr: u32, row: Row) -> u32 {
    (Address::WORD.val(word_addr & 0x3f) + Address::ROW.val(row.into())).value
}
