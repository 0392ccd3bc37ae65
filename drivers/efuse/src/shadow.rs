// Licensed under the Apache-2.0 license

//! Normal-operation reads from the shadow registers.

use crate::{ClockGate, EfuseBus, EfuseController, EfuseError, EfuseResult};
use efuse_registers::{offsets, EFUSE_SIZE};

/// Checks that `addr` names a word inside the fuse space.
pub fn validate_address(addr: u32) -> EfuseResult<()> {
    if addr as usize >= EFUSE_SIZE || addr % 4 != 0 {
        return Err(EfuseError::BadAddress { addr });
    }
    Ok(())
}

impl<B: EfuseBus, C: ClockGate> EfuseController<B, C> {
    /// Reads the shadowed word at byte address `addr`.
    pub fn read_shadow(&mut self, addr: u32) -> EfuseResult<u32> {
        validate_address(addr)?;
        self.with_clock(|ctrl| Ok(ctrl.bus.read_register(offsets::SHADOW + addr as usize)))
    }

    /// Fills `buf` from the shadow registers starting at byte address `addr`.
    ///
    /// At most 256 bytes are read; the number of bytes filled is returned. The
    /// filled part of `buf` is zeroed first and the whole range is validated
    /// before the clock is touched.
    pub fn read_buf(&mut self, addr: u32, buf: &mut [u8]) -> EfuseResult<usize> {
        let len = buf.len().min(EFUSE_SIZE);
        let buf = &mut buf[..len];
        buf.fill(0);
        if len == 0 {
            return Ok(0);
        }

        validate_address(addr)?;
        let last = addr as usize + (len - 1) / 4 * 4;
        if last >= EFUSE_SIZE {
            return Err(EfuseError::BadAddress { addr: last as u32 });
        }

        self.with_clock(|ctrl| {
            for (i, chunk) in buf.chunks_mut(4).enumerate() {
                let word = ctrl
                    .bus
                    .read_register(offsets::SHADOW + addr as usize + i * 4);
                chunk.copy_from_slice(&word.to_ne_bytes()[..chunk.len()]);
            }
            Ok(len)
        })
    }
}
