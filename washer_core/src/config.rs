//! Configuration types for the washer controller.
//!
//! These are the runtime configuration structs used by `WasherController`.
//! They are separate from the TOML-deserialized config in `washer_config`.

use crate::alerts::Tone;

/// Sampling and timer periods.
#[derive(Debug, Clone)]
pub struct TimingCfg {
    /// Spacing between the samples of one frame (ms).
    pub sample_interval_ms: u64,
    /// Samples averaged into one conditioned reading.
    pub samples_per_frame: usize,
    /// Rest after a completed frame before the next one starts (ms).
    pub frame_interval_ms: u64,
    /// Tick period while the machine is off (ms).
    pub off_poll_ms: u64,
    /// Real-time length of one ten-minute countdown step (ms).
    pub countdown_step_ms: u64,
}

impl Default for TimingCfg {
    fn default() -> Self {
        Self {
            sample_interval_ms: 5,
            samples_per_frame: 5,
            frame_interval_ms: 100,
            off_poll_ms: 500,
            countdown_step_ms: 1000,
        }
    }
}

/// Minimum deltas before a quantity is reported again.
#[derive(Debug, Clone)]
pub struct ReportingCfg {
    pub load_threshold: f32,
    pub light_threshold_pct: f32,
    pub temperature_threshold_c: f32,
    pub rpm_threshold: u32,
    pub temperature_setting_threshold: u32,
    pub duration_threshold_min: u32,
}

impl Default for ReportingCfg {
    fn default() -> Self {
        Self {
            load_threshold: 0.05,
            light_threshold_pct: 15.0,
            temperature_threshold_c: 5.0,
            rpm_threshold: 50,
            temperature_setting_threshold: 5,
            duration_threshold_min: 5,
        }
    }
}

/// Start-gating thresholds.
#[derive(Debug, Clone)]
pub struct SafetyCfg {
    /// Door reads open strictly above this light level (percent).
    pub door_open_light_pct: f32,
    /// Load strictly above this fraction of full scale is an overload.
    pub overload_threshold: f32,
    /// Consistent frames needed to flip the debounced door state.
    pub debounce_count: u32,
}

impl Default for SafetyCfg {
    fn default() -> Self {
        Self {
            door_open_light_pct: 40.0,
            overload_threshold: 0.7,
            debounce_count: 3,
        }
    }
}

/// Physical scaling of the water temperature sensor.
#[derive(Debug, Clone)]
pub struct SensorCfg {
    pub temperature_scale: f32,
    pub temperature_calibration: f32,
}

impl Default for SensorCfg {
    fn default() -> Self {
        Self {
            temperature_scale: 330.0,
            temperature_calibration: 0.5,
        }
    }
}

impl SensorCfg {
    /// Degrees Celsius for a normalized water temperature reading.
    #[inline]
    pub fn water_temperature_c(&self, normalized: f32) -> f32 {
        normalized * self.temperature_scale * self.temperature_calibration
    }
}

/// What a power press does while a cycle is running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PowerOffPolicy {
    /// Abort the countdown and power off.
    #[default]
    Abort,
    /// Keep running; the press is logged and dropped.
    Ignore,
}

/// Tone table for every alert the controller can raise.
#[derive(Debug, Clone)]
pub struct AlertCfg {
    pub power: Tone,
    pub start: Tone,
    pub door_warning: Tone,
    pub overload: Tone,
    pub overload_cleared: Tone,
    pub denied: Tone,
    pub already_running: Tone,
    pub complete: Tone,
    pub complete_repeats: u32,
    pub complete_gap_ms: u64,
}

impl Default for AlertCfg {
    fn default() -> Self {
        Self {
            power: Tone::new(600.0, 100),
            start: Tone::new(700.0, 100),
            door_warning: Tone::new(700.0, 200),
            overload: Tone::new(500.0, 100),
            overload_cleared: Tone::new(800.0, 100),
            denied: Tone::new(300.0, 500),
            already_running: Tone::new(500.0, 100),
            complete: Tone::new(1000.0, 200),
            complete_repeats: 3,
            complete_gap_ms: 200,
        }
    }
}

/// Everything the controller needs besides its collaborators.
#[derive(Debug, Clone, Default)]
pub struct WasherCfg {
    pub timing: TimingCfg,
    pub reporting: ReportingCfg,
    pub safety: SafetyCfg,
    pub sensors: SensorCfg,
    pub alerts: AlertCfg,
    pub power_off_while_running: PowerOffPolicy,
}
