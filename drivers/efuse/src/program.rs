// Licensed under the Apache-2.0 license

use crate::{compose_physical_address, ClockGate, EfuseBus, EfuseController, EfuseResult, Row};
use efuse_registers::bits::Mode;
use efuse_registers::offsets;

impl<B: EfuseBus, C: ClockGate> EfuseController<B, C> {
    /// Sends a single program pulse for one physical bit.
    ///
    /// This blows the fuse permanently. Nothing is verified here; see
    /// [`EfuseController::write_word`].
    pub fn program_bit(&mut self, word_addr: u32, bit_addr: u32, row: Row) -> EfuseResult<()> {
        let phys_addr = compose_physical_address(word_addr, bit_addr, row);

        self.wait_ready()?;

        self.bus.write_register(offsets::ADDRESS, phys_addr);
        self.bus
            .write_register(offsets::MODE, (Mode::PRG::SET + Mode::CMD::SET).value);
        Ok(())
    }
}
