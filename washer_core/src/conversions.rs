//! `From` implementations bridging `washer_config` types to `washer_core` types.

use crate::alerts::Tone;
use crate::config::{
    AlertCfg, PowerOffPolicy, ReportingCfg, SafetyCfg, SensorCfg, TimingCfg, WasherCfg,
};

// ── TimingCfg ────────────────────────────────────────────────────────────────

impl From<&washer_config::Timing> for TimingCfg {
    fn from(c: &washer_config::Timing) -> Self {
        Self {
            sample_interval_ms: c.sample_interval_ms,
            samples_per_frame: c.samples_per_frame,
            frame_interval_ms: c.frame_interval_ms,
            off_poll_ms: c.off_poll_ms,
            countdown_step_ms: c.countdown_step_ms,
        }
    }
}

// ── ReportingCfg ─────────────────────────────────────────────────────────────

impl From<&washer_config::Reporting> for ReportingCfg {
    fn from(c: &washer_config::Reporting) -> Self {
        Self {
            load_threshold: c.load_threshold,
            light_threshold_pct: c.light_threshold_pct,
            temperature_threshold_c: c.temperature_threshold_c,
            rpm_threshold: c.rpm_threshold,
            temperature_setting_threshold: c.temperature_setting_threshold,
            duration_threshold_min: c.duration_threshold_min,
        }
    }
}

// ── SafetyCfg ────────────────────────────────────────────────────────────────

impl From<&washer_config::Safety> for SafetyCfg {
    fn from(c: &washer_config::Safety) -> Self {
        Self {
            door_open_light_pct: c.door_open_light_pct,
            overload_threshold: c.overload_threshold,
            debounce_count: c.debounce_count,
        }
    }
}

// ── SensorCfg ────────────────────────────────────────────────────────────────

impl From<&washer_config::Sensors> for SensorCfg {
    fn from(c: &washer_config::Sensors) -> Self {
        Self {
            temperature_scale: c.temperature_scale,
            temperature_calibration: c.temperature_calibration,
        }
    }
}

// ── Alerts ───────────────────────────────────────────────────────────────────

impl From<washer_config::ToneCfg> for Tone {
    fn from(c: washer_config::ToneCfg) -> Self {
        Tone::new(c.frequency_hz, c.duration_ms)
    }
}

impl From<&washer_config::Alerts> for AlertCfg {
    fn from(c: &washer_config::Alerts) -> Self {
        Self {
            power: c.power.into(),
            start: c.start.into(),
            door_warning: c.door_warning.into(),
            overload: c.overload.into(),
            overload_cleared: c.overload_cleared.into(),
            denied: c.denied.into(),
            already_running: c.already_running.into(),
            complete: c.complete.into(),
            complete_repeats: c.complete_repeats,
            complete_gap_ms: c.complete_gap_ms,
        }
    }
}

impl From<washer_config::PowerOffPolicy> for PowerOffPolicy {
    fn from(p: washer_config::PowerOffPolicy) -> Self {
        match p {
            washer_config::PowerOffPolicy::Abort => PowerOffPolicy::Abort,
            washer_config::PowerOffPolicy::Ignore => PowerOffPolicy::Ignore,
        }
    }
}

// ── Whole file ───────────────────────────────────────────────────────────────

impl From<&washer_config::Config> for WasherCfg {
    fn from(c: &washer_config::Config) -> Self {
        Self {
            timing: (&c.timing).into(),
            reporting: (&c.reporting).into(),
            safety: (&c.safety).into(),
            sensors: (&c.sensors).into(),
            alerts: (&c.alerts).into(),
            power_off_while_running: c.cycle.power_off_while_running.into(),
        }
    }
}
