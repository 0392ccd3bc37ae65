// Licensed under the Apache-2.0 license

use crate::EfuseResult;

/// The clock feeding the eFUSE controller.
///
/// Every successful `enable` is paired with exactly one `disable`.
pub trait ClockGate {
    fn enable(&mut self) -> EfuseResult<()>;
    fn disable(&mut self);
}

/// Clock that is always running.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoClockGate;

impl ClockGate for NoClockGate {
    fn enable(&mut self) -> EfuseResult<()> {
        Ok(())
    }

    fn disable(&mut self) {}
}

impl<C: ClockGate + ?Sized> ClockGate for Box<C> {
    fn enable(&mut self) -> EfuseResult<()> {
        (**self).enable()
    }

    fn disable(&mut self) {
        (**self).disable()
    }
}
