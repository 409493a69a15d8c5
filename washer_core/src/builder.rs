//! Type-state builder for `Washer` and generic `build_washer` constructor.
//!
//! The builder enforces at compile time that a panel and an output stage are
//! provided before `build()` is available. `try_build()` is always available
//! for dynamic checks.

use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use washer_traits::{Clock, MonotonicClock, OutputStage, Panel};

use crate::config::*;
use crate::controller::WasherController;
use crate::cycle::SystemState;
use crate::error::{BuildError, Result};
use crate::load::LoadLevel;
use crate::runner::RunSummary;
use crate::safety::SafetyFlags;
use crate::status::WasherEvent;

// ── Public dynamic-dispatch wrapper ──────────────────────────────────────────

/// Boxed washer controller for callers that do not care about the concrete
/// panel or output types.
pub struct Washer {
    pub(crate) inner: WasherController<Box<dyn Panel>, Box<dyn OutputStage>>,
}

impl core::fmt::Debug for Washer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.inner, f)
    }
}

impl Washer {
    /// Start building a Washer.
    pub fn builder() -> WasherBuilder<Missing, Missing> {
        WasherBuilder::default()
    }

    /// One iteration of the control loop.
    pub fn tick(&mut self) -> Vec<WasherEvent> {
        self.inner.tick()
    }

    pub fn poll_interval(&self) -> std::time::Duration {
        self.inner.poll_interval()
    }

    pub fn state(&self) -> SystemState {
        self.inner.state()
    }

    pub fn flags(&self) -> SafetyFlags {
        self.inner.flags()
    }

    pub fn countdown_remaining(&self) -> Option<u32> {
        self.inner.countdown_remaining()
    }

    pub fn load_level(&self) -> Option<LoadLevel> {
        self.inner.load_level()
    }

    pub fn cycles_completed(&self) -> u32 {
        self.inner.cycles_completed()
    }

    pub fn now_ms(&self) -> u64 {
        self.inner.now_ms()
    }

    /// Drive the loop on the washer's clock; see [`crate::runner::run_loop`].
    pub fn run_until<B, E>(
        &mut self,
        shutdown: &AtomicBool,
        until_ms: Option<u64>,
        before_tick: B,
        on_events: E,
    ) -> Result<RunSummary>
    where
        B: FnMut(u64) -> Result<()>,
        E: FnMut(u64, &[WasherEvent]) -> Result<()>,
    {
        crate::runner::run_loop(&mut self.inner, shutdown, until_ms, before_tick, on_events)
    }
}

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Builder for `Washer`. All fields are validated on `build()`.
pub struct WasherBuilder<P, O> {
    panel: Option<Box<dyn Panel>>,
    outputs: Option<Box<dyn OutputStage>>,
    timing: Option<TimingCfg>,
    reporting: Option<ReportingCfg>,
    safety: Option<SafetyCfg>,
    sensors: Option<SensorCfg>,
    alerts: Option<AlertCfg>,
    power_off_while_running: Option<PowerOffPolicy>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
    _p: PhantomData<P>,
    _o: PhantomData<O>,
}

impl Default for WasherBuilder<Missing, Missing> {
    fn default() -> Self {
        Self {
            panel: None,
            outputs: None,
            timing: None,
            reporting: None,
            safety: None,
            sensors: None,
            alerts: None,
            power_off_while_running: None,
            clock: None,
            _p: PhantomData,
            _o: PhantomData,
        }
    }
}

fn invalid(msg: &'static str) -> eyre::Report {
    eyre::Report::new(BuildError::InvalidConfig(msg))
}

/// Validate configuration and construct a `WasherController`.
///
/// Shared by `WasherBuilder::try_build()` and `build_washer()`.
fn validate_and_build<P: Panel, O: OutputStage>(
    panel: P,
    outputs: O,
    cfg: WasherCfg,
    clock: Option<Box<dyn Clock + Send + Sync>>,
) -> Result<WasherController<P, O>> {
    // ── Validation ───────────────────────────────────────────────────────────
    let t = &cfg.timing;
    if t.sample_interval_ms == 0 {
        return Err(invalid("sample_interval_ms must be >= 1"));
    }
    if t.samples_per_frame == 0 {
        return Err(invalid("samples_per_frame must be >= 1"));
    }
    if t.off_poll_ms == 0 {
        return Err(invalid("off_poll_ms must be >= 1"));
    }
    if t.countdown_step_ms == 0 {
        return Err(invalid("countdown_step_ms must be >= 1"));
    }
    let s = &cfg.safety;
    if s.debounce_count == 0 {
        return Err(invalid("debounce_count must be >= 1"));
    }
    if !(s.overload_threshold.is_finite() && s.overload_threshold > 0.0) {
        return Err(invalid("overload_threshold must be > 0"));
    }
    if !s.door_open_light_pct.is_finite() {
        return Err(invalid("door_open_light_pct must be finite"));
    }
    let r = &cfg.reporting;
    if r.load_threshold.is_sign_negative()
        || r.light_threshold_pct.is_sign_negative()
        || r.temperature_threshold_c.is_sign_negative()
    {
        return Err(invalid("reporting thresholds must be >= 0"));
    }
    let a = &cfg.alerts;
    for tone in [
        a.power,
        a.start,
        a.door_warning,
        a.overload,
        a.overload_cleared,
        a.denied,
        a.already_running,
        a.complete,
    ] {
        if !(tone.frequency_hz.is_finite() && tone.frequency_hz > 0.0) {
            return Err(invalid("tone frequency must be > 0"));
        }
    }
    if a.complete_repeats == 0 {
        return Err(invalid("complete_repeats must be >= 1"));
    }

    let clock: Arc<dyn Clock + Send + Sync> = match clock {
        Some(b) => Arc::from(b),
        None => Arc::new(MonotonicClock::new()),
    };

    Ok(WasherController::new(panel, outputs, cfg, clock))
}

impl<P, O> WasherBuilder<P, O> {
    /// Fallible build available in any type-state; returns detailed error for missing pieces.
    pub fn try_build(self) -> Result<Washer> {
        let panel = self
            .panel
            .ok_or_else(|| eyre::Report::new(BuildError::MissingPanel))?;
        let outputs = self
            .outputs
            .ok_or_else(|| eyre::Report::new(BuildError::MissingOutputs))?;

        let cfg = WasherCfg {
            timing: self.timing.unwrap_or_default(),
            reporting: self.reporting.unwrap_or_default(),
            safety: self.safety.unwrap_or_default(),
            sensors: self.sensors.unwrap_or_default(),
            alerts: self.alerts.unwrap_or_default(),
            power_off_while_running: self.power_off_while_running.unwrap_or_default(),
        };
        let inner = validate_and_build(panel, outputs, cfg, self.clock)?;
        Ok(Washer { inner })
    }
}

/// Chainable setters that do not affect type-state.
impl<P, O> WasherBuilder<P, O> {
    pub fn with_timing(mut self, timing: TimingCfg) -> Self {
        self.timing = Some(timing);
        self
    }
    pub fn with_reporting(mut self, reporting: ReportingCfg) -> Self {
        self.reporting = Some(reporting);
        self
    }
    pub fn with_safety(mut self, safety: SafetyCfg) -> Self {
        self.safety = Some(safety);
        self
    }
    pub fn with_sensors(mut self, sensors: SensorCfg) -> Self {
        self.sensors = Some(sensors);
        self
    }
    pub fn with_alerts(mut self, alerts: AlertCfg) -> Self {
        self.alerts = Some(alerts);
        self
    }
    pub fn with_power_off_policy(mut self, policy: PowerOffPolicy) -> Self {
        self.power_off_while_running = Some(policy);
        self
    }
    /// Apply every section of a complete runtime config.
    pub fn with_config(self, cfg: WasherCfg) -> Self {
        self.with_timing(cfg.timing)
            .with_reporting(cfg.reporting)
            .with_safety(cfg.safety)
            .with_sensors(cfg.sensors)
            .with_alerts(cfg.alerts)
            .with_power_off_policy(cfg.power_off_while_running)
    }
    /// Provide a custom clock implementation; defaults to `MonotonicClock` when not provided.
    pub fn with_clock(mut self, clock: Box<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }
}

// Setters that advance type-state
impl<O> WasherBuilder<Missing, O> {
    pub fn with_panel(self, panel: impl Panel + 'static) -> WasherBuilder<Set, O> {
        WasherBuilder {
            panel: Some(Box::new(panel)),
            outputs: self.outputs,
            timing: self.timing,
            reporting: self.reporting,
            safety: self.safety,
            sensors: self.sensors,
            alerts: self.alerts,
            power_off_while_running: self.power_off_while_running,
            clock: self.clock,
            _p: PhantomData,
            _o: PhantomData,
        }
    }
}

impl<P> WasherBuilder<P, Missing> {
    pub fn with_outputs(self, outputs: impl OutputStage + 'static) -> WasherBuilder<P, Set> {
        WasherBuilder {
            panel: self.panel,
            outputs: Some(Box::new(outputs)),
            timing: self.timing,
            reporting: self.reporting,
            safety: self.safety,
            sensors: self.sensors,
            alerts: self.alerts,
            power_off_while_running: self.power_off_while_running,
            clock: self.clock,
            _p: PhantomData,
            _o: PhantomData,
        }
    }
}

impl WasherBuilder<Set, Set> {
    /// Validate and build the Washer. Only available when panel and outputs are set.
    pub fn build(self) -> Result<Washer> {
        self.try_build()
    }
}

/// Generic, statically-dispatched alias for the controller.
pub type WasherG<P, O> = WasherController<P, O>;

/// Build a statically-dispatched controller from concrete collaborators.
///
/// Delegates to the shared `validate_and_build`.
pub fn build_washer<P, O>(
    panel: P,
    outputs: O,
    cfg: WasherCfg,
    clock: Option<Box<dyn Clock + Send + Sync>>,
) -> Result<WasherG<P, O>>
where
    P: Panel,
    O: OutputStage,
{
    validate_and_build(panel, outputs, cfg, clock)
}
