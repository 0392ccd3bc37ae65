// Licensed under the Apache-2.0 license

use crate::Commands;
use anyhow::bail;
use efuse_driver::{ClockGate, Efuse, EfuseBus, EfuseData, ReadMode, EFUSE_IOC_READ};
use efuse_registers::{EFUSE_PHYSICAL_ROWS, EFUSE_SIZE};
use std::io::Write;
use zerocopy::IntoBytes;

const WORDS_PER_LINE: usize = 4;

pub(crate) fn execute<B: EfuseBus, C: ClockGate>(
    efuse: &Efuse<B, C>,
    command: &Commands,
) -> anyhow::Result<()> {
    let mut out = std::io::stdout().lock();
    match command {
        Commands::Read { addr } => {
            let mut data = EfuseData {
                addr: *addr,
                value: 0,
            };
            efuse.open().ioctl(EFUSE_IOC_READ, data.as_mut_bytes())?;
            writeln!(out, "{:#010x}", data.value)?;
        }
        Commands::Dump => {
            let mut buf = [0u8; EFUSE_SIZE];
            let mut file = efuse.open();
            let mut filled = 0;
            while filled < buf.len() {
                let n = file.read(&mut buf[filled..])?;
                if n == 0 {
                    break;
                }
                filled += n;
            }
            for (line, chunk) in buf[..filled]
                .chunks(4 * WORDS_PER_LINE)
                .enumerate()
            {
                write!(out, "{:02x}:", line * 4 * WORDS_PER_LINE)?;
                for word in chunk.chunks_exact(4) {
                    let word = u32::from_ne_bytes([word[0], word[1], word[2], word[3]]);
                    write!(out, " {:08x}", word)?;
                }
                writeln!(out)?;
            }
        }
        Commands::Write { addr, value } => {
            let report = efuse.write(*addr, *value)?;
            for row in report.rows.iter() {
                log::info!(
                    "row {:?}: before {:#010x} pulsed {:#010x} margin {:#010x}",
                    row.row,
                    row.before,
                    row.programmed,
                    row.margin
                );
            }
            writeln!(
                out,
                "wrote {:#010x} to {:#04x} ({} of {} rows verified)",
                value,
                addr,
                report.rows.len() as u32 - report.error_count(),
                report.rows.len()
            )?;
        }
        Commands::PhysRead { row, margin } => {
            if *row as usize >= EFUSE_PHYSICAL_ROWS {
                bail!("physical row {} out of range (0..{})", row, EFUSE_PHYSICAL_ROWS);
            }
            let mode = ReadMode::try_from(u32::from(*margin))?;
            let value = efuse.read_physical(*row, mode)?;
            writeln!(out, "{:#010x}", value)?;
        }
    }
    Ok(())
}
