/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    Driver for the one-time-programmable eFUSE controller.

--*/

mod addr;
mod bus;
mod clock;
mod controller;
mod device;
mod error;
mod handshake;
mod mmio;
mod phys;
mod program;
mod shadow;
mod transport;
mod writer;

pub use addr::{compose_physical_address, physical_word_address, Row};
pub use bus::EfuseBus;
pub use clock::{ClockGate, NoClockGate};
pub use controller::EfuseController;
pub use device::Efuse;
pub use error::{EfuseError, EfuseResult};
pub use mmio::{MmioBus, RegisterClockGate};
pub use phys::ReadMode;
pub use shadow::validate_address;
pub use transport::{EfuseData, EfuseFile, EFUSE_IOC_READ, EFUSE_IOC_WRITE};
pub use writer::{RowReport, WordWriteReport, MAX_ROW_ERRORS};
