// Licensed under the Apache-2.0 license

//! Character-device view of the fuses: `read`, `write` and `ioctl`.
//!
//! `read` returns the shadowed fuse bytes at the file offset. `write` takes
//! exactly one [`EfuseData`] (address then value, native endian). The two
//! ioctls read or write a single word through an [`EfuseData`] argument.

use crate::{ClockGate, Efuse, EfuseBus, EfuseError, EfuseResult};
use core::mem::size_of;
use efuse_registers::EFUSE_SIZE;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Argument of the read/write control requests and payload of `write`.
#[repr(C)]
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout,
)]
pub struct EfuseData {
    pub addr: u32,
    pub value: u32,
}

const EFUSE_IOC_MAGIC: u8 = b'E';

/// `_IOR('E', 1, struct efuse_data)`
pub const EFUSE_IOC_READ: u32 =
    nix::request_code_read!(EFUSE_IOC_MAGIC, 1, size_of::<EfuseData>()) as u32;
/// `_IOW('E', 2, struct efuse_data)`
pub const EFUSE_IOC_WRITE: u32 =
    nix::request_code_write!(EFUSE_IOC_MAGIC, 2, size_of::<EfuseData>()) as u32;

/// An open file on the eFUSE device.
pub struct EfuseFile<'a, B, C> {
    efuse: &'a Efuse<B, C>,
    offset: u64,
}

impl<'a, B: EfuseBus, C: ClockGate> EfuseFile<'a, B, C> {
    pub(crate) fn new(efuse: &'a Efuse<B, C>) -> Self {
        Self { efuse, offset: 0 }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn seek(&mut self, offset: u64) {
        self.offset = offset;
    }

    /// Reads shadowed fuse bytes at the current offset. Returns 0 at the end
    /// of the fuse space.
    pub fn read(&mut self, buf: &mut [u8]) -> EfuseResult<usize> {
        if self.offset >= EFUSE_SIZE as u64 {
            return Ok(0);
        }
        let count = buf.len().min(EFUSE_SIZE - self.offset as usize);

        let mut kernel_buf = [0u8; EFUSE_SIZE];
        let read = self
            .efuse
            .read_buf(self.offset as u32, &mut kernel_buf[..count])?;
        buf[..read].copy_from_slice(&kernel_buf[..read]);

        self.offset += read as u64;
        Ok(read)
    }

    /// Programs one word. `buf` must be exactly one [`EfuseData`].
    pub fn write(&mut self, buf: &[u8]) -> EfuseResult<usize> {
        let data =
            EfuseData::read_from_bytes(buf).map_err(|_| EfuseError::SizeMismatch(buf.len()))?;

        self.efuse.write(data.addr, data.value)?;

        self.offset += buf.len() as u64;
        Ok(buf.len())
    }

    /// Handles a control request. `arg` is the caller's [`EfuseData`]; a read
    /// request stores the fuse value back into it.
    pub fn ioctl(&mut self, request: u32, arg: &mut [u8]) -> EfuseResult<()> {
        let mut data = EfuseData::read_from_prefix(arg)
            .map(|(data, _)| data)
            .map_err(|_| EfuseError::BufferFault { len: arg.len() })?;

        match request {
            EFUSE_IOC_READ => {
                data.value = self.efuse.read_shadow(data.addr)?;
                arg[..size_of::<EfuseData>()].copy_from_slice(data.as_bytes());
            }
            EFUSE_IOC_WRITE => {
                self.efuse.write(data.addr, data.value)?;
            }
            _ => {
                log::error!("Unsupported eFUSE ioctl {:#x}", request);
                return Err(EfuseError::UnsupportedRequest(request));
            }
        }
        Ok(())
    }
}
