// Licensed under the Apache-2.0 license

//! Word writes through the full driver stack against the emulated macro.

#[cfg(test)]
pub mod test {
    use crate::test::{harness, harness_with};
    use efuse_config::EfuseConfig;
    use efuse_driver::{compose_physical_address, EfuseError, Row};
    use efuse_emulator_periph::EmulatedEfuse;
    use rand::Rng;

    #[test]
    fn test_write_programs_exactly_the_requested_bits() {
        let h = harness(true);
        let report = h.efuse.write(20, 0x5).unwrap();

        assert_eq!(report.word, 5);
        assert_eq!(report.error_count(), 0);
        assert_eq!(
            h.emulated.pulses(),
            vec![
                compose_physical_address(5, 0, Row::Low),
                compose_physical_address(5, 2, Row::Low),
                compose_physical_address(5, 0, Row::High),
                compose_physical_address(5, 2, Row::High),
            ]
        );
        assert_eq!(h.emulated.row(10), 0x5);
        assert_eq!(h.emulated.row(11), 0x5);

        // refreshed shadow shows the new value
        assert_eq!(h.efuse.read_shadow(20).unwrap(), 0x5);
        assert_eq!(h.clock.enable_count(), h.clock.disable_count());
        assert!(!h.clock.is_enabled());
    }

    #[test]
    fn test_write_skips_blown_bits() {
        let emulated = EmulatedEfuse::new();
        emulated.set_row(0, 0x1);
        emulated.set_row(1, 0x4);
        let h = harness_with(
            emulated,
            &EfuseConfig::default().with_programming_enabled(true),
        );

        let report = h.efuse.write(0, 0x5).unwrap();
        assert_eq!(report.rows[0].before, 0x1);
        assert_eq!(report.rows[0].programmed, 0x4);
        assert_eq!(report.rows[1].programmed, 0x1);
        assert_eq!(h.emulated.pulses().len(), 2);
    }

    #[test]
    fn test_write_fails_when_no_bit_takes() {
        let h = harness(true);
        h.emulated.set_stuck_bits(6, u32::MAX);
        h.emulated.set_stuck_bits(7, u32::MAX);

        let err = h.efuse.write(12, 0x5).unwrap_err();
        assert!(matches!(
            err,
            EfuseError::VerifyFailed {
                word: 3,
                failed_rows: 2
            }
        ));
        assert_eq!(err.errno(), libc::EIO);
        // every missing bit was still pulsed
        assert_eq!(h.emulated.pulses().len(), 4);
        assert_eq!(h.efuse.read_shadow(12).unwrap(), 0);
        assert_eq!(h.clock.enable_count(), h.clock.disable_count());
    }

    #[test]
    fn test_one_good_row_is_enough() {
        let h = harness(true);
        h.emulated.set_weak_bits(0, 0x1);

        let report = h.efuse.write(0, 0x1).unwrap();
        assert_eq!(report.error_count(), 1);
        assert!(!report.rows[0].verified);
        assert!(report.rows[1].verified);
        assert_eq!(h.efuse.read_shadow(0).unwrap(), 0x1);
    }

    #[test]
    fn test_over_programmed_row_still_verifies() {
        let emulated = EmulatedEfuse::new();
        emulated.set_row(4, 0xf0);
        let h = harness_with(
            emulated,
            &EfuseConfig::default().with_programming_enabled(true),
        );
        let report = h.efuse.write(8, 0x1).unwrap();
        assert_eq!(report.error_count(), 0);
        assert_eq!(h.efuse.read_shadow(8).unwrap(), 0xf1);
    }

    #[test]
    fn test_disabled_programming_leaves_fuses_alone() {
        let h = harness(false);
        assert!(matches!(
            h.efuse.write(0, 0xffff_ffff),
            Err(EfuseError::ProgrammingDisabled)
        ));
        assert!(h.emulated.pulses().is_empty());
        assert_eq!(h.register_accesses(), 0);
        assert_eq!(h.clock.enable_count(), 0);
    }

    #[test]
    fn test_hung_macro_times_out() {
        let config = EfuseConfig {
            ready_poll_limit: 50,
            ..EfuseConfig::default().with_programming_enabled(true)
        };
        let h = harness_with(EmulatedEfuse::new(), &config);
        h.emulated.set_hang(true);

        assert!(matches!(
            h.efuse.write(0, 0x1),
            Err(EfuseError::Timeout { polls: 50 })
        ));
        assert!(h.emulated.pulses().is_empty());
        assert_eq!(h.clock.enable_count(), h.clock.disable_count());
    }

    #[test]
    fn test_pulses_are_subset_of_missing_bits() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let emulated = EmulatedEfuse::new();
            let word: u32 = rng.gen_range(0..64);
            let low: u32 = rng.gen();
            let high: u32 = rng.gen();
            emulated.set_row(word as usize * 2, low);
            emulated.set_row(word as usize * 2 + 1, high);
            let h = harness_with(
                emulated,
                &EfuseConfig::default().with_programming_enabled(true),
            );

            let value: u32 = rng.gen();
            h.efuse.write(word * 4, value).unwrap();

            let mut expected = Vec::new();
            for (row, current) in [(Row::Low, low), (Row::High, high)] {
                for bit in 0..32 {
                    if (value & !current) & (1 << bit) != 0 {
                        expected.push(compose_physical_address(word, bit, row));
                    }
                }
            }
            assert_eq!(h.emulated.pulses(), expected);
            assert_eq!(h.emulated.row(word as usize * 2), low | value);
            assert_eq!(h.emulated.row(word as usize * 2 + 1), high | value);
        }
    }
}
