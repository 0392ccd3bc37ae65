// Licensed under the Apache-2.0 license

#[cfg(test)]
pub mod test {
    use crate::test::harness;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_concurrent_writes_do_not_interleave() {
        let h = harness(true);
        let efuse = Arc::new(h.efuse);

        let handles: Vec<_> = (0..8u32)
            .map(|word| {
                let efuse = efuse.clone();
                thread::spawn(move || {
                    let value = 1 << word | 1 << (31 - word);
                    efuse.write(word * 4, value).map(|report| report.error_count())
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), 0);
        }

        for word in 0..8u32 {
            let expected = 1 << word | 1 << (31 - word);
            assert_eq!(efuse.read_shadow(word * 4).unwrap(), expected);
            assert_eq!(h.emulated.row(word as usize * 2), expected);
        }
        assert_eq!(h.emulated.pulses().len(), 8 * 2 * 2);
        assert_eq!(h.clock.enable_count(), h.clock.disable_count());
    }
}
