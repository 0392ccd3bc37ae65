// Licensed under the Apache-2.0 license

use crate::{ClockGate, EfuseBus, EfuseController, EfuseError, EfuseResult};
use efuse_registers::bits::Mode;
use efuse_registers::offsets;

/// How a physical row is read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ReadMode {
    /// Nominal read of the stored value
    Array = 0,
    /// Tighter-threshold read used to confirm freshly programmed bits
    Margin = 1,
}

impl TryFrom<u32> for ReadMode {
    type Error = EfuseError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ReadMode::Array),
            1 => Ok(ReadMode::Margin),
            _ => {
                log::error!("Unsupported eFUSE read type {}", value);
                Err(EfuseError::UnsupportedReadMode(value))
            }
        }
    }
}

impl ReadMode {
    fn command(self) -> u32 {
        match self {
            ReadMode::Array => (Mode::AREAD::SET + Mode::CMD::SET).value,
            ReadMode::Margin => (Mode::MREAD::SET + Mode::CMD::SET).value,
        }
    }
}

impl<B: EfuseBus, C: ClockGate> EfuseController<B, C> {
    /// Reads one physical row (`(word << 1) | row`).
    pub fn read_physical(&mut self, phys_word_addr: u32, mode: ReadMode) -> EfuseResult<u32> {
        self.power_on(true);

        self.wait_ready()?;

        self.bus.write_register(offsets::ADDRESS, phys_word_addr);
        self.bus.write_register(offsets::MODE, mode.command());

        self.wait_ready()?;

        Ok(self.bus.read_register(offsets::READ_DATA))
    }
}
