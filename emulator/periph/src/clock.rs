// Licensed under the Apache-2.0 license

use crate::efuse::EfuseMacro;
use efuse_driver::{ClockGate, EfuseError, EfuseResult};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Clock gate of an [`crate::EmulatedEfuse`].
///
/// While the clock is off the shadow window reads as zero.
#[derive(Clone)]
pub struct EmulatedClock {
    state: Arc<Mutex<EfuseMacro>>,
}

impl EmulatedClock {
    pub(crate) fn new(state: Arc<Mutex<EfuseMacro>>) -> Self {
        Self { state }
    }

    fn state(&self) -> MutexGuard<'_, EfuseMacro> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes every following `enable` fail.
    pub fn set_fail(&self, fail: bool) {
        self.state().clock.fail = fail;
    }

    pub fn is_enabled(&self) -> bool {
        self.state().clock.enabled
    }

    pub fn enable_count(&self) -> u32 {
        self.state().clock.enable_count
    }

    pub fn disable_count(&self) -> u32 {
        self.state().clock.disable_count
    }
}

impl ClockGate for EmulatedClock {
    fn enable(&mut self) -> EfuseResult<()> {
        let mut state = self.state();
        if state.clock.fail {
            return Err(EfuseError::Clock("emulated clk_efuse unavailable".into()));
        }
        log::trace!("efuse: clock on");
        state.clock.enabled = true;
        state.clock.enable_count += 1;
        Ok(())
    }

    fn disable(&mut self) {
        let mut state = self.state();
        log::trace!("efuse: clock off");
        state.clock.enabled = false;
        state.clock.disable_count += 1;
    }
}
