use rstest::rstest;
use washer_hardware::SimulatedPanel;
use washer_traits::{AnalogChannel, AnalogSource, ButtonId, ButtonInput};

#[rstest]
#[case(-0.5, 0.0)]
#[case(0.42, 0.42)]
#[case(1.7, 1.0)]
#[case(f32::NAN, 0.0)]
fn handle_clamps_values(#[case] input: f32, #[case] expected: f32) {
    let mut panel = SimulatedPanel::new();
    panel.handle().set(AnalogChannel::RpmKnob, input);
    let v = panel.read_normalized(AnalogChannel::RpmKnob).unwrap();
    assert!((v - expected).abs() < 1e-6, "got {v}");
}

#[rstest]
fn held_button_reads_low_until_released() {
    let mut panel = SimulatedPanel::new();
    let h = panel.handle();
    h.hold(ButtonId::Power, true);
    assert!(!panel.read_level(ButtonId::Power).unwrap());
    assert!(!panel.read_level(ButtonId::Power).unwrap());
    h.hold(ButtonId::Power, false);
    assert!(panel.read_level(ButtonId::Power).unwrap());
}

#[rstest]
#[case(true, 0.85)]
#[case(false, 0.10)]
fn door_helper_drives_light_sensor(#[case] open: bool, #[case] light: f32) {
    let mut panel = SimulatedPanel::new();
    panel.handle().set_door_open(open);
    let v = panel.read_normalized(AnalogChannel::Light).unwrap();
    assert!((v - light).abs() < 1e-6);
}

#[rstest]
fn recovered_channel_reads_again() {
    let mut panel = SimulatedPanel::new();
    let h = panel.handle();
    h.set_failing(AnalogChannel::WaterTemperature, true);
    assert!(panel.read_normalized(AnalogChannel::WaterTemperature).is_err());
    h.set_failing(AnalogChannel::WaterTemperature, false);
    assert!(panel.read_normalized(AnalogChannel::WaterTemperature).is_ok());
}

#[rstest]
fn failing_button_reports_unavailable_and_keeps_taps() {
    let mut panel = SimulatedPanel::new();
    let h = panel.handle();
    h.tap(ButtonId::Start);
    h.set_button_failing(ButtonId::Start, true);
    let err = panel.read_level(ButtonId::Start).unwrap_err();
    assert_eq!(err.to_string(), "button start unavailable");
    assert!(panel.read_level(ButtonId::Power).unwrap());

    h.set_button_failing(ButtonId::Start, false);
    assert!(!panel.read_level(ButtonId::Start).unwrap());
    assert!(panel.read_level(ButtonId::Start).unwrap());
}
