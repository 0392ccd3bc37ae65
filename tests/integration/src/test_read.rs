// Licensed under the Apache-2.0 license

//! Shadow and physical reads against the emulated macro.

#[cfg(test)]
pub mod test {
    use crate::test::{harness, harness_with};
    use efuse_config::EfuseConfig;
    use efuse_driver::{EfuseError, ReadMode, Row};
    use efuse_emulator_periph::EmulatedEfuse;

    fn programmed_macro() -> EmulatedEfuse {
        let mut rows = [0u32; 128];
        for (i, row) in rows.iter_mut().enumerate() {
            // low row carries the word index, high row a marker
            *row = if i % 2 == 0 { (i / 2) as u32 } else { 0x5a00_0000 };
        }
        EmulatedEfuse::with_rows(rows)
    }

    #[test]
    fn test_shadow_read_is_stable() {
        let h = harness_with(programmed_macro(), &EfuseConfig::default());
        let first = h.efuse.read_shadow(40).unwrap();
        assert_eq!(first, 0x5a00_000a);
        assert_eq!(h.efuse.read_shadow(40).unwrap(), first);
    }

    #[test]
    fn test_shadow_read_range_and_alignment() {
        let h = harness_with(programmed_macro(), &EfuseConfig::default());
        assert_eq!(h.efuse.read_shadow(252).unwrap(), 0x5a00_003f);
        for addr in [2, 255, 256, 0x1000] {
            let err = h.efuse.read_shadow(addr).unwrap_err();
            assert!(matches!(err, EfuseError::BadAddress { .. }));
            assert_eq!(err.errno(), libc::EFAULT);
        }
        // only the good read enabled the clock
        assert_eq!(h.clock.enable_count(), 1);
    }

    #[test]
    fn test_bulk_read_clamps_to_fuse_space() {
        let h = harness_with(programmed_macro(), &EfuseConfig::default());
        let mut buf = vec![0xffu8; 1000];
        assert_eq!(h.efuse.read_buf(0, &mut buf).unwrap(), 256);
        for (word, chunk) in buf[..256].chunks_exact(4).enumerate() {
            let value = u32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            assert_eq!(value, 0x5a00_0000 | word as u32);
        }
        // one clock window for the whole buffer
        assert_eq!(h.clock.enable_count(), 1);
        assert_eq!(h.clock.disable_count(), 1);
    }

    #[test]
    fn test_bulk_read_of_blank_macro_is_zero() {
        let h = harness(false);
        let mut buf = [0xa5u8; 256];
        assert_eq!(h.efuse.read_buf(0, &mut buf).unwrap(), 256);
        assert!(buf.iter().all(|b| *b == 0));
    }

    #[test]
    fn test_failing_clock_aborts_read() {
        let h = harness_with(programmed_macro(), &EfuseConfig::default());
        h.clock.set_fail(true);
        let err = h.efuse.read_shadow(0).unwrap_err();
        assert!(matches!(err, EfuseError::Clock(_)));
        assert_eq!(h.register_accesses(), 0);

        h.clock.set_fail(false);
        assert_eq!(h.efuse.read_shadow(0).unwrap(), 0x5a00_0000);
    }

    #[test]
    fn test_physical_reads() {
        let emulated = programmed_macro();
        emulated.set_weak_bits(3, 0x5a00_0000);
        let h = harness_with(emulated, &EfuseConfig::default());

        assert_eq!(h.efuse.read_physical(2, ReadMode::Array).unwrap(), 1);
        assert_eq!(
            h.efuse.read_physical(3, ReadMode::Array).unwrap(),
            0x5a00_0000
        );
        assert_eq!(h.efuse.read_physical(3, ReadMode::Margin).unwrap(), 0);
    }

    #[test]
    fn test_physical_read_enables_clock() {
        let h = harness_with(programmed_macro(), &EfuseConfig::default());
        assert_eq!(h.efuse.read_physical(0, ReadMode::Array).unwrap(), 0);
        assert_eq!(h.clock.enable_count(), 1);
        assert_eq!(h.clock.disable_count(), 1);
        assert!(!h.clock.is_enabled());
    }

    #[test]
    fn test_program_paths_enable_clock() {
        let h = harness(true);
        h.efuse.program_bit(1, 1, Row::Low).unwrap();
        h.efuse.write_word(2, 0x1).unwrap();
        assert_eq!(h.emulated.row(2), 1 << 1);
        assert_eq!(h.emulated.row(4), 0x1);
        assert_eq!(h.clock.enable_count(), 2);
        assert_eq!(h.clock.enable_count(), h.clock.disable_count());
    }

    #[test]
    fn test_unknown_read_mode_is_rejected() {
        let err = ReadMode::try_from(2).unwrap_err();
        assert_eq!(err.errno(), libc::EINVAL);
    }

    #[test]
    fn test_shutdown_powers_down() {
        let h = harness(false);
        let emulated = h.emulated.clone();
        assert!(emulated.is_powered());
        h.efuse.shutdown();
        assert!(!emulated.is_powered());
    }
}
