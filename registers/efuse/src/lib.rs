/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    Register map of the eFUSE controller: control register offsets, the shadow
    window and the bit fields of the mode, status and one-way registers.

--*/

/// Physical base address of the eFUSE controller.
pub const EFUSE_BASE: u64 = 0x0305_0000;

/// Size of the mapped controller window.
pub const EFUSE_WINDOW_SIZE: usize = 0x1000;

/// Size in bytes of the user-visible fuse space (and of the shadow window).
pub const EFUSE_SIZE: usize = 0x100;

/// Number of 32-bit words in the user-visible fuse space.
pub const EFUSE_WORDS: usize = EFUSE_SIZE / 4;

/// Number of physical rows in the array. Every virtual word is backed by two.
pub const EFUSE_PHYSICAL_ROWS: usize = EFUSE_WORDS * 2;

/// Register offsets relative to the controller base.
pub mod offsets {
    pub const MODE: usize = 0x0;
    pub const ADDRESS: usize = 0x4;
    pub const DIRECT_CMD: usize = 0x8;
    pub const READ_DATA: usize = 0xC;
    pub const STATUS: usize = 0x10;
    pub const ONE_WAY: usize = 0x14;
    pub const SHADOW: usize = 0x100;
    pub const SHADOW_END: usize = SHADOW + super::EFUSE_SIZE;
}

pub mod bits {
    use tock_registers::register_bitfields;

    register_bitfields! {
        u32,

        /// Mode register. Commands are latched when CMD is written.
        pub Mode [
            /// Array read of the row in the address register
            AREAD OFFSET(0) NUMBITS(1) [],
            /// Margin read of the row in the address register
            MREAD OFFSET(1) NUMBITS(1) [],
            /// Program the single bit in the address register
            PRG OFFSET(2) NUMBITS(1) [],
            /// Power down the macro
            PWR_DN OFFSET(3) NUMBITS(1) [],
            /// Execute
            CMD OFFSET(4) NUMBITS(1) [],
            /// Reload the shadow registers from the array
            REFRESH OFFSET(5) NUMBITS(1) []
        ],

        /// Status register
        pub Status [
            BUSY OFFSET(0) NUMBITS(1) [
                Idle = 0,
                Busy = 1
            ]
        ],

        /// Physical bit address used by program commands.
        ///
        /// A read command only uses the low seven bits (the row index).
        pub Address [
            ROW OFFSET(0) NUMBITS(1) [],
            WORD OFFSET(1) NUMBITS(6) [],
            BIT OFFSET(7) NUMBITS(5) []
        ],

        pub OneWay [
            ENABLE OFFSET(0) NUMBITS(1) []
        ]
    }
}

/// Raw mode value of the direct refresh command.
pub const MODE_CMD_REFRESH: u32 = 0x30;
