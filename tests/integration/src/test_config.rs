// Licensed under the Apache-2.0 license

//! Configuration files and persisted emulator images.

#[cfg(test)]
pub mod test {
    use crate::test::harness_with;
    use efuse_config::EfuseConfig;
    use efuse_driver::EfuseError;
    use efuse_emulator_periph::EmulatedEfuse;
    use std::fs;

    #[test]
    fn test_config_file_enables_programming() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("efuse.toml");
        fs::write(
            &path,
            "programming_enabled = true\nready_poll_limit = 1000\n",
        )
        .unwrap();

        let config = EfuseConfig::load(&path).unwrap();
        assert!(config.programming_enabled);
        assert_eq!(config.ready_poll_limit, 1000);

        let h = harness_with(EmulatedEfuse::new(), &config);
        assert!(h.efuse.programming_enabled());
        h.efuse.write(4, 0x10).unwrap();
        assert_eq!(h.emulated.word(1), 0x10);
    }

    #[test]
    fn test_default_config_refuses_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("efuse.toml");
        fs::write(&path, "base_address = 0x03050000\n").unwrap();

        let config = EfuseConfig::load(&path).unwrap();
        let h = harness_with(EmulatedEfuse::new(), &config);
        assert!(matches!(
            h.efuse.write(0, 1),
            Err(EfuseError::ProgrammingDisabled)
        ));
    }

    #[test]
    fn test_image_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("efuse.bin");
        let config = EfuseConfig::default().with_programming_enabled(true);

        {
            let h = harness_with(EmulatedEfuse::new(), &config);
            h.efuse.write(0x40, 0xdead_beef).unwrap();
            h.emulated.save(&image).unwrap();
        }

        let h = harness_with(EmulatedEfuse::load(&image).unwrap(), &config);
        assert_eq!(h.efuse.read_shadow(0x40).unwrap(), 0xdead_beef);

        // fuses only ever gain bits
        h.efuse.write(0x40, 0x0000_0010).unwrap();
        assert_eq!(h.efuse.read_shadow(0x40).unwrap(), 0xdead_beff);
    }
}
