//! The washer control loop (`WasherController`).
//!
//! One non-blocking `tick()` services both buttons, advances the countdown,
//! feeds the signal conditioner and, whenever a frame completes, runs the
//! reporting gates, the safety monitor and the indicator updates. Tones are
//! scheduled on the alert queue and flushed at the end of the tick.

use std::sync::Arc;
use std::time::{Duration, Instant};

use washer_traits::{
    AnalogChannel, ButtonId, Clock, DeviceError, OutputStage, Panel, Rgb,
};

use crate::alerts::{AlertKind, AlertQueue};
use crate::change_gate::GateGroup;
use crate::conditioner::{Conditioner, Frame};
use crate::config::{PowerOffPolicy, WasherCfg};
use crate::cycle::{Countdown, SystemState};
use crate::debounce::{Edge, EdgeDetector};
use crate::hw_error::{Seam, map_hw_error};
use crate::load::{LoadLevel, classify};
use crate::safety::{SafetyEdge, SafetyFlags, SafetyMonitor};
use crate::settings::CycleSettings;
use crate::status::{SensorReport, WasherEvent};

/// Single owner of all controller state.
pub struct WasherController<P: Panel, O: OutputStage> {
    pub(crate) panel: P,
    pub(crate) outputs: O,
    pub(crate) cfg: WasherCfg,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) epoch: Instant,

    pub(crate) state: SystemState,
    pub(crate) power: EdgeDetector,
    pub(crate) start: EdgeDetector,
    pub(crate) conditioner: Conditioner,
    pub(crate) safety: SafetyMonitor,
    pub(crate) settings_gate: GateGroup<3>,
    pub(crate) sensor_gate: GateGroup<3>,
    pub(crate) countdown: Option<Countdown>,
    pub(crate) alerts: AlertQueue,
    pub(crate) last_frame: Option<Frame>,
    pub(crate) load_level: Option<LoadLevel>,
    pub(crate) cycles_completed: u32,
}

impl<P: Panel, O: OutputStage> core::fmt::Debug for WasherController<P, O> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WasherController")
            .field("state", &self.state)
            .field("flags", &self.safety.flags())
            .field("countdown", &self.countdown_remaining())
            .field("load_level", &self.load_level)
            .finish()
    }
}

impl<P: Panel, O: OutputStage> WasherController<P, O> {
    pub(crate) fn new(
        panel: P,
        outputs: O,
        cfg: WasherCfg,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        let epoch = clock.now();
        let r = &cfg.reporting;
        let settings_gate = GateGroup::new([
            r.rpm_threshold as f32,
            r.temperature_setting_threshold as f32,
            r.duration_threshold_min as f32,
        ]);
        let sensor_gate = GateGroup::new([
            r.load_threshold,
            r.temperature_threshold_c,
            r.light_threshold_pct,
        ]);
        Self {
            conditioner: Conditioner::new(&cfg.timing),
            safety: SafetyMonitor::new(&cfg.safety),
            panel,
            outputs,
            clock,
            epoch,
            state: SystemState::Off,
            power: EdgeDetector::default(),
            start: EdgeDetector::default(),
            settings_gate,
            sensor_gate,
            countdown: None,
            alerts: AlertQueue::new(),
            last_frame: None,
            load_level: None,
            cycles_completed: 0,
            cfg,
        }
    }

    pub fn state(&self) -> SystemState {
        self.state
    }

    pub fn flags(&self) -> SafetyFlags {
        self.safety.flags()
    }

    /// Ten-minute steps left, `None` unless a cycle is running.
    pub fn countdown_remaining(&self) -> Option<u32> {
        self.countdown.as_ref().map(Countdown::remaining)
    }

    pub fn load_level(&self) -> Option<LoadLevel> {
        self.load_level
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }

    pub fn cycles_completed(&self) -> u32 {
        self.cycles_completed
    }

    pub fn cfg(&self) -> &WasherCfg {
        &self.cfg
    }

    pub fn clock(&self) -> &Arc<dyn Clock + Send + Sync> {
        &self.clock
    }

    /// Milliseconds since the controller was built.
    pub fn now_ms(&self) -> u64 {
        self.clock.ms_since(self.epoch)
    }

    /// How long the loop should wait before the next tick.
    pub fn poll_interval(&self) -> Duration {
        let ms = match self.state {
            SystemState::Off => self.cfg.timing.off_poll_ms,
            SystemState::Idle | SystemState::Running => self.cfg.timing.sample_interval_ms,
        };
        Duration::from_millis(ms)
    }

    /// One iteration of the control loop.
    pub fn tick(&mut self) -> Vec<WasherEvent> {
        let now = self.now_ms();
        let mut events = Vec::new();

        // Both detectors latch every tick.
        let power = self.poll_button(ButtonId::Power);
        let start = self.poll_button(ButtonId::Start);
        if power == Edge::Falling {
            self.on_power_press(now, &mut events);
        }
        if start == Edge::Falling {
            self.on_start_press(now, &mut events);
        }

        if self.state == SystemState::Running {
            self.advance_countdown(now, &mut events);
        }

        if self.state != SystemState::Off
            && let Some(frame) = self.conditioner.poll(&mut self.panel, now)
        {
            self.process_frame(frame, now, &mut events);
        }

        self.flush_tones(now, &mut events);
        events
    }

    // ── Buttons ─────────────────────────────────────────────────────────────

    fn poll_button(&mut self, id: ButtonId) -> Edge {
        match self.panel.read_level(id) {
            Ok(level) => match id {
                ButtonId::Power => self.power.update(level),
                ButtonId::Start => self.start.update(level),
            },
            Err(e) => {
                tracing::warn!(
                    button = id.name(),
                    error = %map_hw_error(e.as_ref(), Seam::Input),
                    "button read failed"
                );
                Edge::None
            }
        }
    }

    fn on_power_press(&mut self, now: u64, events: &mut Vec<WasherEvent>) {
        match self.state {
            SystemState::Off => self.power_on(now, events),
            SystemState::Idle => self.power_off(now, false, events),
            SystemState::Running => match self.cfg.power_off_while_running {
                PowerOffPolicy::Abort => {
                    tracing::warn!(
                        remaining_min = self.countdown_remaining().unwrap_or(0) * 10,
                        "power pressed during cycle; aborting"
                    );
                    self.power_off(now, true, events);
                }
                PowerOffPolicy::Ignore => {
                    tracing::info!("power pressed during cycle; ignored");
                    events.push(WasherEvent::PowerIgnored);
                }
            },
        }
    }

    fn power_on(&mut self, now: u64, events: &mut Vec<WasherEvent>) {
        self.state = SystemState::Idle;
        self.safety.reset();
        self.settings_gate.reset();
        self.sensor_gate.reset();
        self.conditioner.restart(now);
        self.load_level = None;
        self.set_outputs_neutral();
        self.show_digit(0);
        self.alerts.push(AlertKind::Power, now, &self.cfg.alerts);
        tracing::info!(state = %self.state, "system on");
        events.push(WasherEvent::PoweredOn);
    }

    fn power_off(&mut self, now: u64, aborted_cycle: bool, events: &mut Vec<WasherEvent>) {
        self.state = SystemState::Off;
        self.countdown = None;
        self.alerts.clear();
        self.safety.reset();
        self.load_level = None;
        self.set_outputs_neutral();
        let r = self.outputs.blank();
        self.check_output("display", r);
        self.alerts.push(AlertKind::Power, now, &self.cfg.alerts);
        tracing::info!(state = %self.state, aborted_cycle, "system off");
        events.push(WasherEvent::PoweredOff { aborted_cycle });
    }

    fn on_start_press(&mut self, now: u64, events: &mut Vec<WasherEvent>) {
        match self.state {
            SystemState::Off => {
                tracing::debug!("start pressed while off; ignored");
            }
            SystemState::Running => {
                tracing::info!("cycle already in progress");
                self.alerts.push(AlertKind::AlreadyRunning, now, &self.cfg.alerts);
                events.push(WasherEvent::AlreadyRunning);
            }
            SystemState::Idle => {
                if let Some(reason) = self.safety.start_denial() {
                    tracing::warn!(reason = reason.name(), "cannot start cycle");
                    self.alerts.push(AlertKind::Denied, now, &self.cfg.alerts);
                    events.push(WasherEvent::StartDenied(reason));
                    return;
                }
                let settings = self.read_settings();
                let steps = settings.steps();
                tracing::info!(
                    rpm = settings.rpm,
                    temp_c = settings.temperature_c,
                    duration_min = settings.duration_min,
                    "starting wash cycle"
                );
                self.state = SystemState::Running;
                self.countdown = Some(Countdown::new(
                    steps,
                    self.cfg.timing.countdown_step_ms,
                    now,
                ));
                self.alerts.push(AlertKind::Start, now, &self.cfg.alerts);
                self.show_digit(steps);
                events.push(WasherEvent::CycleStarted(settings));
                events.push(WasherEvent::CountdownStep { remaining: steps });
            }
        }
    }

    /// Knobs read directly at the moment of the press; a failed read falls
    /// back to the last frame.
    fn read_settings(&mut self) -> CycleSettings {
        let rpm = self.read_knob(AnalogChannel::RpmKnob);
        let temp = self.read_knob(AnalogChannel::TemperatureKnob);
        let duration = self.read_knob(AnalogChannel::DurationKnob);
        CycleSettings::from_knobs(rpm, temp, duration)
    }

    fn read_knob(&mut self, channel: AnalogChannel) -> f32 {
        match self.panel.read_normalized(channel) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(
                    channel = channel.name(),
                    error = %map_hw_error(e.as_ref(), Seam::Input),
                    "knob read failed; using last frame"
                );
                self.last_frame
                    .and_then(|f| f.get(channel))
                    .unwrap_or(0.0)
            }
        }
    }

    // ── Countdown ───────────────────────────────────────────────────────────

    fn advance_countdown(&mut self, now: u64, events: &mut Vec<WasherEvent>) {
        let Some(cd) = self.countdown.as_mut() else {
            return;
        };
        let shown = cd.advance(now);
        let finished = cd.is_finished();

        for remaining in shown {
            self.show_digit(remaining);
            tracing::info!(remaining_min = remaining * 10, "cycle countdown");
            events.push(WasherEvent::CountdownStep { remaining });
        }

        if finished {
            self.countdown = None;
            self.state = SystemState::Idle;
            self.cycles_completed = self.cycles_completed.saturating_add(1);
            self.alerts.push(AlertKind::Complete, now, &self.cfg.alerts);
            tracing::info!(cycles = self.cycles_completed, "cycle complete");
            events.push(WasherEvent::CycleComplete);
        }
    }

    // ── Frames ──────────────────────────────────────────────────────────────

    fn process_frame(&mut self, frame: Frame, now: u64, events: &mut Vec<WasherEvent>) {
        self.last_frame = Some(frame);

        let settings = match (
            frame.get(AnalogChannel::RpmKnob),
            frame.get(AnalogChannel::TemperatureKnob),
            frame.get(AnalogChannel::DurationKnob),
        ) {
            (Some(r), Some(t), Some(d)) => Some(CycleSettings::from_knobs(r, t, d)),
            _ => None,
        };
        if let Some(s) = settings
            && self.settings_gate.observe([
                Some(s.rpm as f32),
                Some(s.temperature_c as f32),
                Some(s.duration_min as f32),
            ])
        {
            tracing::info!(
                rpm = s.rpm,
                temp_set_c = s.temperature_c,
                duration_min = s.duration_min,
                "settings"
            );
            events.push(WasherEvent::SettingsChanged(s));
        }

        let load = frame.get(AnalogChannel::Load);
        let light_pct = frame.get(AnalogChannel::Light).map(|v| v * 100.0);
        let water_temp_c = frame
            .get(AnalogChannel::WaterTemperature)
            .map(|v| self.cfg.sensors.water_temperature_c(v));

        if self.sensor_gate.observe([load, water_temp_c, light_pct]) {
            let door_reads_open = light_pct.is_some_and(|p| self.safety.door_reads_open(p));
            tracing::info!(
                load,
                water_temp_c = water_temp_c.map(f32::round),
                light_pct,
                door = if door_reads_open { "open" } else { "closed" },
                "sensors"
            );
            events.push(WasherEvent::SensorsChanged(SensorReport {
                load,
                water_temp_c,
                light_pct,
                door_reads_open,
            }));
        }

        for edge in self.safety.update(light_pct, load) {
            self.on_safety_edge(edge, now, events);
        }

        if self.state == SystemState::Idle {
            let r = self.outputs.set_door_lamp(self.safety.flags().door_open);
            self.check_output("door lamp", r);
        }

        if let Some(load) = load {
            let level = classify(load);
            let r = self.outputs.set_color(level.color());
            self.check_output("rgb indicator", r);
            if self.load_level != Some(level) {
                self.load_level = Some(level);
                tracing::debug!(level = level.name(), load, "load level");
                events.push(WasherEvent::LoadLevelChanged(level));
            }
        }

        if self.state == SystemState::Idle
            && let Some(s) = settings
        {
            self.show_digit(s.steps());
        }
    }

    fn on_safety_edge(&mut self, edge: SafetyEdge, now: u64, events: &mut Vec<WasherEvent>) {
        match edge {
            SafetyEdge::DoorOpened => {
                if self.state == SystemState::Idle {
                    tracing::warn!("door open");
                    self.alerts.push(AlertKind::DoorWarning, now, &self.cfg.alerts);
                } else {
                    tracing::info!(state = %self.state, "door opened");
                }
            }
            SafetyEdge::DoorClosed => tracing::info!("door closed"),
            SafetyEdge::OverloadDetected => {
                tracing::warn!("washer overloaded");
                self.alerts.push(AlertKind::Overload, now, &self.cfg.alerts);
            }
            SafetyEdge::OverloadCleared => {
                tracing::info!("load level acceptable");
                self.alerts
                    .push(AlertKind::OverloadCleared, now, &self.cfg.alerts);
            }
        }
        events.push(WasherEvent::Safety(edge));
    }

    // ── Outputs ─────────────────────────────────────────────────────────────

    fn flush_tones(&mut self, now: u64, events: &mut Vec<WasherEvent>) {
        for t in self.alerts.drain_due(now) {
            let r = self.outputs.tone(t.tone.frequency_hz, t.tone.duration_ms);
            if r.is_ok() {
                events.push(WasherEvent::Tone {
                    kind: t.kind,
                    tone: t.tone,
                });
            }
            self.check_output("buzzer", r);
        }
    }

    fn set_outputs_neutral(&mut self) {
        let r = self.outputs.set_color(Rgb::OFF);
        self.check_output("rgb indicator", r);
        let r = self.outputs.set_door_lamp(false);
        self.check_output("door lamp", r);
    }

    fn show_digit(&mut self, value: u32) {
        // Single digit: the display takes `value % 10`.
        let digit = (value % 10) as u8;
        let r = self.outputs.render_digit(digit);
        self.check_output("display", r);
    }

    fn check_output(&self, what: &'static str, r: Result<(), DeviceError>) {
        if let Err(e) = r {
            tracing::warn!(
                output = what,
                error = %map_hw_error(e.as_ref(), Seam::Output),
                "output failed; skipped"
            );
        }
    }
}
