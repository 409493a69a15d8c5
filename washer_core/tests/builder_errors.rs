use washer_core::error::BuildError;
use washer_core::mocks::{NullOutputs, StuckPanel};
use washer_core::{SafetyCfg, SystemState, TimingCfg, Washer, WasherCfg, build_washer};
use washer_traits::ManualClock;
use rstest::rstest;

#[rstest]
fn builder_missing_panel_yields_typed_build_error() {
    let err = Washer::builder()
        // missing with_panel()
        .with_outputs(NullOutputs)
        .try_build()
        .expect_err("should fail with MissingPanel");

    match err.downcast_ref::<BuildError>() {
        Some(BuildError::MissingPanel) => {}
        other => panic!("expected MissingPanel, got: {other:?}"),
    }
}

#[rstest]
fn builder_missing_outputs_yields_typed_build_error() {
    let err = Washer::builder()
        .with_panel(StuckPanel::released())
        .try_build()
        .expect_err("should fail with MissingOutputs");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::MissingOutputs)
    ));
}

#[rstest]
#[case(TimingCfg { sample_interval_ms: 0, ..TimingCfg::default() }, "sample_interval_ms")]
#[case(TimingCfg { samples_per_frame: 0, ..TimingCfg::default() }, "samples_per_frame")]
#[case(TimingCfg { countdown_step_ms: 0, ..TimingCfg::default() }, "countdown_step_ms")]
#[case(TimingCfg { off_poll_ms: 0, ..TimingCfg::default() }, "off_poll_ms")]
fn zero_periods_are_rejected(#[case] timing: TimingCfg, #[case] needle: &str) {
    let err = Washer::builder()
        .with_panel(StuckPanel::released())
        .with_outputs(NullOutputs)
        .with_timing(timing)
        .build()
        .expect_err("invalid timing");
    assert!(err.to_string().contains(needle), "{err}");
}

#[rstest]
fn zero_debounce_rejected_by_generic_builder() {
    let cfg = WasherCfg {
        safety: SafetyCfg {
            debounce_count: 0,
            ..SafetyCfg::default()
        },
        ..WasherCfg::default()
    };
    let err = build_washer(StuckPanel::released(), NullOutputs, cfg, None)
        .expect_err("debounce 0");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::InvalidConfig(_))
    ));
}

#[rstest]
fn dead_panel_never_panics() {
    let clock = ManualClock::new();
    let mut w = build_washer(
        StuckPanel::dead(),
        NullOutputs,
        WasherCfg::default(),
        Some(Box::new(clock.clone())),
    )
    .unwrap();
    for _ in 0..20 {
        assert!(w.tick().is_empty());
        clock.advance(w.poll_interval());
    }
    assert_eq!(w.state(), SystemState::Off);
}

#[rstest]
fn config_file_flows_into_builder() {
    let file = washer_config::load_toml(
        "[timing]\noff_poll_ms = 250\n[cycle]\npower_off_while_running = \"ignore\"\n",
    )
    .unwrap();
    let w = Washer::builder()
        .with_panel(StuckPanel::released())
        .with_outputs(NullOutputs)
        .with_config(WasherCfg::from(&file))
        .build()
        .unwrap();
    assert_eq!(w.poll_interval(), std::time::Duration::from_millis(250));
}
