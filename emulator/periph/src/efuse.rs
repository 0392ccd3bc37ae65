/*++

Licensed under the Apache-2.0 license.

File Name:

    efuse.rs

Abstract:

    Emulated eFUSE macro behind the controller register window.

--*/

use efuse_driver::EfuseBus;
use efuse_registers::bits::{Address, Mode, Status};
use efuse_registers::{offsets, EFUSE_PHYSICAL_ROWS, EFUSE_WORDS};
use std::fs;
use std::io::{Error as IoError, ErrorKind, Result as IoResult};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tock_registers::LocalRegisterCopy;

use crate::EmulatedClock;

/// Size of a persisted row image.
const IMAGE_SIZE: usize = EFUSE_PHYSICAL_ROWS * 4;

/// State shared by [`EmulatedEfuse`] and [`EmulatedClock`].
pub(crate) struct EfuseMacro {
    rows: [u32; EFUSE_PHYSICAL_ROWS],
    shadow: [u32; EFUSE_WORDS],
    /// Bits that never take a program pulse
    stuck: [u32; EFUSE_PHYSICAL_ROWS],
    /// Bits that read as set in array mode but not in margin mode
    weak: [u32; EFUSE_PHYSICAL_ROWS],
    address: u32,
    read_data: u32,
    one_way: u32,
    powered: bool,
    busy_polls: u32,
    busy_remaining: u32,
    hang: bool,
    pulses: Vec<u32>,
    pub(crate) clock: ClockState,
}

#[derive(Default)]
pub(crate) struct ClockState {
    /// Set once an [`EmulatedClock`] has been handed out. Until then the
    /// shadow window is always readable.
    pub(crate) attached: bool,
    pub(crate) enabled: bool,
    pub(crate) fail: bool,
    pub(crate) enable_count: u32,
    pub(crate) disable_count: u32,
}

impl EfuseMacro {
    fn new(rows: [u32; EFUSE_PHYSICAL_ROWS]) -> Self {
        let mut efuse = Self {
            rows,
            shadow: [0; EFUSE_WORDS],
            stuck: [0; EFUSE_PHYSICAL_ROWS],
            weak: [0; EFUSE_PHYSICAL_ROWS],
            address: 0,
            read_data: 0,
            one_way: 0,
            powered: true,
            busy_polls: 0,
            busy_remaining: 0,
            hang: false,
            pulses: Vec::new(),
            clock: ClockState::default(),
        };
        efuse.refresh();
        efuse
    }

    fn refresh(&mut self) {
        for (word, shadow) in self.shadow.iter_mut().enumerate() {
            *shadow = self.rows[word * 2] | self.rows[word * 2 + 1];
        }
    }

    fn row_index(&self) -> usize {
        (self.address as usize) % EFUSE_PHYSICAL_ROWS
    }

    fn execute(&mut self, value: u32) {
        let mode = LocalRegisterCopy::<u32, Mode::Register>::new(value);
        if !mode.is_set(Mode::CMD) {
            log::trace!("efuse: mode write {:#x} without CMD ignored", value);
            return;
        }
        self.busy_remaining = self.busy_polls;

        if mode.is_set(Mode::REFRESH) {
            log::trace!("efuse: refresh");
            self.refresh();
        } else if mode.is_set(Mode::PWR_DN) {
            log::trace!("efuse: power down");
            self.powered = false;
        } else if mode.is_set(Mode::PRG) {
            self.program();
        } else if mode.is_set(Mode::AREAD) {
            let row = self.row_index();
            self.read_data = if self.powered { self.rows[row] } else { 0 };
            log::trace!("efuse: array read row {} = {:#x}", row, self.read_data);
        } else if mode.is_set(Mode::MREAD) {
            let row = self.row_index();
            self.read_data = if self.powered {
                self.rows[row] & !self.weak[row]
            } else {
                0
            };
            log::trace!("efuse: margin read row {} = {:#x}", row, self.read_data);
        } else {
            log::trace!("efuse: power up");
            self.powered = true;
        }
    }

    fn program(&mut self) {
        let address = LocalRegisterCopy::<u32, Address::Register>::new(self.address);
        let row = ((address.read(Address::WORD) << 1) | address.read(Address::ROW)) as usize;
        let mask = 1u32 << address.read(Address::BIT);

        self.pulses.push(address.get() & 0xfff);
        if !self.powered {
            log::trace!("efuse: program pulse on powered-down macro dropped");
            return;
        }
        log::trace!("efuse: program row {} mask {:#x}", row, mask);
        self.rows[row] |= mask & !self.stuck[row];
    }

    fn status(&mut self) -> u32 {
        let busy = if self.hang {
            true
        } else if self.busy_remaining > 0 {
            self.busy_remaining -= 1;
            true
        } else {
            false
        };
        if busy {
            Status::BUSY::Busy.value
        } else {
            Status::BUSY::Idle.value
        }
    }

    fn read_shadow(&self, offset: usize) -> u32 {
        if self.clock.attached && !self.clock.enabled {
            log::trace!("efuse: shadow read at {:#x} with clock gated", offset);
            return 0;
        }
        self.shadow[(offset - offsets::SHADOW) / 4]
    }
}

/// A fuse macro with 128 physical rows, shared between clones.
///
/// Rows start out as given (blank by default) and the shadow registers are
/// loaded from them at construction, as after reset. Every command keeps the
/// status register busy for `busy_polls` polls.
#[derive(Clone)]
pub struct EmulatedEfuse {
    state: Arc<Mutex<EfuseMacro>>,
}

impl Default for EmulatedEfuse {
    fn default() -> Self {
        Self::new()
    }
}

impl EmulatedEfuse {
    pub fn new() -> Self {
        Self::with_rows([0; EFUSE_PHYSICAL_ROWS])
    }

    pub fn with_rows(rows: [u32; EFUSE_PHYSICAL_ROWS]) -> Self {
        Self {
            state: Arc::new(Mutex::new(EfuseMacro::new(rows))),
        }
    }

    /// Loads a row image written by [`EmulatedEfuse::save`].
    pub fn load(path: &Path) -> IoResult<Self> {
        let image = fs::read(path)?;
        if image.len() != IMAGE_SIZE {
            return Err(IoError::new(
                ErrorKind::InvalidData,
                format!(
                    "{}: expected {} bytes, found {}",
                    path.display(),
                    IMAGE_SIZE,
                    image.len()
                ),
            ));
        }
        let mut rows = [0u32; EFUSE_PHYSICAL_ROWS];
        for (row, chunk) in rows.iter_mut().zip(image.chunks_exact(4)) {
            *row = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Ok(Self::with_rows(rows))
    }

    /// Writes the physical rows as little-endian words.
    pub fn save(&self, path: &Path) -> IoResult<()> {
        let image: Vec<u8> = self.rows().iter().flat_map(|r| r.to_le_bytes()).collect();
        fs::write(path, image)
    }

    fn state(&self) -> MutexGuard<'_, EfuseMacro> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a clock gate for this macro. Once a clock exists, shadow
    /// reads return zero unless it is enabled.
    pub fn clock(&self) -> EmulatedClock {
        self.state().clock.attached = true;
        EmulatedClock::new(self.state.clone())
    }

    pub fn rows(&self) -> [u32; EFUSE_PHYSICAL_ROWS] {
        self.state().rows
    }

    pub fn row(&self, index: usize) -> u32 {
        self.state().rows[index]
    }

    /// Overwrites a physical row without a program pulse, as if it had been
    /// blown before power-up. The shadow is not refreshed.
    pub fn set_row(&self, index: usize, value: u32) {
        self.state().rows[index] = value;
    }

    /// Value a refresh would load for virtual word `word`.
    pub fn word(&self, word: usize) -> u32 {
        let state = self.state();
        state.rows[word * 2] | state.rows[word * 2 + 1]
    }

    pub fn shadow(&self) -> [u32; EFUSE_WORDS] {
        self.state().shadow
    }

    pub fn set_busy_polls(&self, polls: u32) {
        self.state().busy_polls = polls;
    }

    /// Keeps the status register busy forever.
    pub fn set_hang(&self, hang: bool) {
        self.state().hang = hang;
    }

    pub fn set_stuck_bits(&self, row: usize, mask: u32) {
        self.state().stuck[row] = mask;
    }

    pub fn set_weak_bits(&self, row: usize, mask: u32) {
        self.state().weak[row] = mask;
    }

    /// Physical addresses of every program pulse so far, in order.
    pub fn pulses(&self) -> Vec<u32> {
        self.state().pulses.clone()
    }

    pub fn clear_pulses(&self) {
        self.state().pulses.clear();
    }

    pub fn is_powered(&self) -> bool {
        self.state().powered
    }
}

impl EfuseBus for EmulatedEfuse {
    fn read_register(&mut self, offset: usize) -> u32 {
        let mut state = self.state();
        match offset {
            // command bits self-clear
            offsets::MODE => 0,
            offsets::ADDRESS => state.address,
            offsets::READ_DATA => state.read_data,
            offsets::STATUS => state.status(),
            offsets::ONE_WAY => state.one_way,
            _ if (offsets::SHADOW..offsets::SHADOW_END).contains(&offset) => {
                state.read_shadow(offset)
            }
            _ => {
                log::trace!("efuse: read of unmodelled offset {:#x}", offset);
                0
            }
        }
    }

    fn write_register(&mut self, offset: usize, value: u32) {
        let mut state = self.state();
        match offset {
            offsets::MODE => state.execute(value),
            offsets::ADDRESS => state.address = value,
            offsets::ONE_WAY => state.one_way = value,
            _ => log::trace!(
                "efuse: write {:#x} to unmodelled offset {:#x}",
                value,
                offset
            ),
        }
    }
}
