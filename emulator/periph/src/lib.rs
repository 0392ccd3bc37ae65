/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    Software model of the eFUSE macro and its controller registers.

--*/

mod clock;
mod efuse;

pub use clock::EmulatedClock;
pub use efuse::EmulatedEfuse;
