#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(scenario) = washer_config::Scenario::from_reader(data) {
        // Accepted scripts are ordered and in range.
        let rows = scenario.rows();
        assert!(rows.windows(2).all(|w| w[0].at_ms <= w[1].at_ms));
        assert!(rows.iter().all(|r| (0.0..=1.0).contains(&r.value)));
        assert_eq!(scenario.end_ms(), rows.last().map_or(0, |r| r.at_ms));
    }
});
