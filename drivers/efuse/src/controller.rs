// Licensed under the Apache-2.0 license

use crate::{ClockGate, EfuseBus, EfuseResult, NoClockGate};
use efuse_config::DEFAULT_READY_POLL_LIMIT;

/// Register-level eFUSE controller.
///
/// Owns the register window and the clock gate. The programming and read
/// primitives are implemented on this type in the `handshake`, `program`,
/// `phys`, `writer` and `shadow` modules. It does no locking of its own; the
/// [`crate::Efuse`] handle serializes access to it.
pub struct EfuseController<B, C = NoClockGate> {
    pub(crate) bus: B,
    pub(crate) clock: C,
    pub(crate) ready_poll_limit: u32,
}

impl<B: EfuseBus> EfuseController<B, NoClockGate> {
    pub fn without_clock(bus: B) -> Self {
        Self::new(bus, NoClockGate, DEFAULT_READY_POLL_LIMIT)
    }
}

impl<B: EfuseBus, C: ClockGate> EfuseController<B, C> {
    pub fn new(bus: B, clock: C, ready_poll_limit: u32) -> Self {
        Self {
            bus,
            clock,
            ready_poll_limit: ready_poll_limit.max(1),
        }
    }

    pub fn bus(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn into_parts(self) -> (B, C) {
        (self.bus, self.clock)
    }

    /// Runs `f` with the clock enabled. The clock is disabled again whatever
    /// `f` returns; if enabling fails `f` is not run.
    pub(crate) fn with_clock<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> EfuseResult<T>,
    ) -> EfuseResult<T> {
        if let Err(err) = self.clock.enable() {
            log::error!("eFUSE clock failed to enable: {}", err);
            return Err(err);
        }
        let result = f(self);
        self.clock.disable();
        result
    }
}
