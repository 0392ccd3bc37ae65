// Licensed under the Apache-2.0 license

//! Busy-wait handshake with the fuse macro.

use crate::{ClockGate, EfuseBus, EfuseController, EfuseError, EfuseResult};
use efuse_registers::bits::{Mode, Status};
use efuse_registers::{offsets, MODE_CMD_REFRESH};
use tock_registers::LocalRegisterCopy;

impl<B: EfuseBus, C: ClockGate> EfuseController<B, C> {
    pub fn is_busy(&mut self) -> bool {
        LocalRegisterCopy::<u32, Status::Register>::new(self.bus.read_register(offsets::STATUS))
            .is_set(Status::BUSY)
    }

    /// Polls the status register until the macro is idle.
    ///
    /// Gives up after `ready_poll_limit` polls.
    pub fn wait_ready(&mut self) -> EfuseResult<()> {
        for _ in 0..self.ready_poll_limit {
            if !self.is_busy() {
                return Ok(());
            }
            core::hint::spin_loop();
        }
        log::error!(
            "eFUSE still busy after {} status polls",
            self.ready_poll_limit
        );
        Err(EfuseError::Timeout {
            polls: self.ready_poll_limit,
        })
    }

    /// Powers the macro up or down. Must precede array and margin reads.
    pub fn power_on(&mut self, on: bool) {
        let mask = if on {
            Mode::CMD::SET
        } else {
            Mode::PWR_DN::SET + Mode::CMD::SET
        };
        self.bus.set_bits(offsets::MODE, mask.value);
    }

    /// Reloads the shadow registers so newly programmed bits become visible.
    pub fn refresh(&mut self) {
        self.bus.write_register(offsets::MODE, MODE_CMD_REFRESH);
    }
}
