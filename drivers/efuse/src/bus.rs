// Licensed under the Apache-2.0 license

//! Raw 32-bit access to the controller register window.

/// Register window of the eFUSE controller.
///
/// Offsets are byte offsets from the controller base and must be word aligned
/// and inside the mapped window; anything else is a programming error, not a
/// runtime condition. Accesses never fail.
pub trait EfuseBus {
    fn read_register(&mut self, offset: usize) -> u32;

    fn write_register(&mut self, offset: usize, value: u32);

    /// Read-modify-write that ORs `mask` into the register.
    fn set_bits(&mut self, offset: usize, mask: u32) {
        let value = self.read_register(offset);
        self.write_register(offset, value | mask);
    }
}

impl<B: EfuseBus + ?Sized> EfuseBus for Box<B> {
    fn read_register(&mut self, offset: usize) -> u32 {
        (**self).read_register(offset)
    }

    fn write_register(&mut self, offset: usize, value: u32) {
        (**self).write_register(offset, value)
    }

    fn set_bits(&mut self, offset: usize, mask: u32) {
        (**self).set_bits(offset, mask)
    }
}
