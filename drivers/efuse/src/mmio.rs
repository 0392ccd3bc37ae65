// Licensed under the Apache-2.0 license

//! Memory-mapped register access through `/dev/mem`.

use crate::{ClockGate, EfuseBus, EfuseError, EfuseResult};
use efuse_config::{ClockGateConfig, EfuseConfig};
use nix::sys::mman::{mmap, munmap, MapFlags, ProtFlags};
use std::fs::OpenOptions;
use std::num::NonZeroUsize;
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;
use std::ptr::NonNull;

const DEV_MEM: &str = "/dev/mem";

/// A page-aligned mapping of physical memory.
struct MappedWindow {
    map: NonNull<u8>,
    map_len: usize,
    /// Offset of the requested address within the mapping
    start: usize,
    len: usize,
}

// The mapping is plain device memory owned by this value.
unsafe impl Send for MappedWindow {}

impl MappedWindow {
    fn map(addr: u64, len: usize) -> EfuseResult<Self> {
        let mapping_error = |source: std::io::Error| EfuseError::Mapping { addr, source };

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_SYNC)
            .open(DEV_MEM)
            .map_err(mapping_error)?;

        // SAFETY: sysconf has no preconditions.
        let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        let page_size = u64::try_from(page_size).unwrap_or(4096).max(1);
        let page_base = addr - addr % page_size;
        let start = (addr - page_base) as usize;
        let map_len = NonZeroUsize::new(start + len).ok_or_else(|| {
            mapping_error(std::io::Error::from_raw_os_error(libc::EINVAL))
        })?;
        let offset = libc::off_t::try_from(page_base)
            .map_err(|_| mapping_error(std::io::Error::from_raw_os_error(libc::EOVERFLOW)))?;

        // SAFETY: a fresh shared mapping of a device file; nothing else in
        // this process aliases it.
        let ptr = unsafe {
            mmap(
                None,
                map_len,
                ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
                MapFlags::MAP_SHARED,
                file.as_raw_fd(),
                offset,
            )
        }
        .map_err(|errno| mapping_error(errno.into()))?;

        let map = NonNull::new(ptr.cast::<u8>())
            .ok_or_else(|| mapping_error(std::io::Error::from_raw_os_error(libc::ENOMEM)))?;
        log::debug!("Mapped {:#x}+{:#x} from {}", addr, len, DEV_MEM);

        Ok(Self {
            map,
            map_len: map_len.get(),
            start,
            len,
        })
    }

    fn register(&self, offset: usize) -> *mut u32 {
        assert!(
            offset % 4 == 0 && offset + 4 <= self.len,
            "register offset {offset:#x} outside window"
        );
        // SAFETY: bounds checked above.
        unsafe { self.map.as_ptr().add(self.start + offset).cast::<u32>() }
    }

    fn read(&self, offset: usize) -> u32 {
        // SAFETY: aligned pointer into the live mapping.
        unsafe { self.register(offset).read_volatile() }
    }

    fn write(&self, offset: usize, value: u32) {
        // SAFETY: aligned pointer into the live mapping.
        unsafe { self.register(offset).write_volatile(value) }
    }
}

impl Drop for MappedWindow {
    fn drop(&mut self) {
        // SAFETY: unmaps exactly the region returned by mmap.
        if let Err(err) = unsafe { munmap(self.map.as_ptr().cast(), self.map_len) } {
            log::warn!("munmap of eFUSE window failed: {}", err);
        }
    }
}

/// The controller register window, mapped from physical memory.
pub struct MmioBus {
    window: MappedWindow,
}

impl MmioBus {
    pub fn map(config: &EfuseConfig) -> EfuseResult<Self> {
        Ok(Self {
            window: MappedWindow::map(config.base_address, config.window_size)?,
        })
    }
}

impl EfuseBus for MmioBus {
    fn read_register(&mut self, offset: usize) -> u32 {
        self.window.read(offset)
    }

    fn write_register(&mut self, offset: usize, value: u32) {
        self.window.write(offset, value)
    }
}

/// Clock gate driven by one enable bit in a clock controller register.
pub struct RegisterClockGate {
    window: MappedWindow,
    mask: u32,
}

impl RegisterClockGate {
    pub fn map(config: &ClockGateConfig) -> EfuseResult<Self> {
        Ok(Self {
            window: MappedWindow::map(config.register, 4)?,
            mask: 1 << config.bit,
        })
    }
}

impl ClockGate for RegisterClockGate {
    fn enable(&mut self) -> EfuseResult<()> {
        let value = self.window.read(0);
        self.window.write(0, value | self.mask);
        if self.window.read(0) & self.mask == 0 {
            return Err(EfuseError::Clock(format!(
                "enable bit {:#x} did not latch",
                self.mask
            )));
        }
        Ok(())
    }

    fn disable(&mut self) {
        let value = self.window.read(0);
        self.window.write(0, value & !self.mask);
    }
}
