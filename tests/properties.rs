use proptest::prelude::*;
use qrsnap::config::EncodingConfig;
use qrsnap::qrcode::{byte_capacity, encode, EcLevel, Version, VersionChoice};

fn ec_level() -> impl Strategy<Value = EcLevel> {
    prop::sample::select(EcLevel::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn encode_is_deterministic(text in "[ -~]{1,120}", ecl in ec_level()) {
        prop_assume!(!text.trim().is_empty());
        let config = EncodingConfig::default().with_ec_level(ecl);
        let first = encode(&text, &config).unwrap();
        let second = encode(&text, &config).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn side_length_matches_version_and_border(
        text in "\\PC{1,80}",
        ecl in ec_level(),
        border in 0u32..12,
    ) {
        prop_assume!(!text.trim().is_empty());
        let config = EncodingConfig::default()
            .with_ec_level(ecl)
            .with_border_modules(border);
        let matrix = encode(&text, &config).unwrap();
        let version = matrix.version().value() as usize;
        prop_assert_eq!(matrix.side_len(), 17 + 4 * version + 2 * border as usize);
        prop_assert_eq!(matrix.modules().len(), matrix.side_len() * matrix.side_len());
    }

    #[test]
    fn auto_version_is_smallest_that_fits(len in 1usize..600, ecl in ec_level()) {
        let text = "x".repeat(len);
        let matrix = encode(&text, &EncodingConfig::default().with_ec_level(ecl)).unwrap();
        let version = matrix.version();
        prop_assert!(byte_capacity(version, ecl) >= len);
        if version.value() > 1 {
            let smaller = Version::new(version.value() - 1).unwrap();
            prop_assert!(byte_capacity(smaller, ecl) < len);
        }
    }

    #[test]
    fn fixed_version_is_honoured_or_rejected(len in 1usize..200, ver in 1u8..=40) {
        let version = Version::new(ver).unwrap();
        let config = EncodingConfig::default()
            .with_version(VersionChoice::Fixed(version))
            .with_ec_level(EcLevel::High);
        let text = "y".repeat(len);
        match encode(&text, &config) {
            Ok(matrix) => {
                prop_assert_eq!(matrix.version(), version);
                prop_assert!(len <= byte_capacity(version, EcLevel::High));
            }
            Err(_) => prop_assert!(len > byte_capacity(version, EcLevel::High)),
        }
    }
}
